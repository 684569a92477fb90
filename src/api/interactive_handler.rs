//! Handler for Slack interactive components.
//!
//! The release dialog is a fixed graph:
//!
//! ```text
//! shortcut ─> input modal ─> confirmation modal ─> task dispatched (clear)
//!                  └──────────────┴─> view_closed (no-op)
//! ```
//!
//! No state is kept between steps: the choice made in the input modal travels
//! to the confirmation step in the view's `private_metadata`.

use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::helpers::{err_response, no_content, ok_json, open_modal_with_timeout};
use super::parsing::{get_header_value, parse_interaction};
use super::signature::verify_slack_request;
use crate::bot::ReleaseBot;
use crate::core::models::{Destination, ReleaseAction, ReleaseTask, TargetEnvironment};
use crate::slack::interaction::{DialogStep, Interaction, ResponseUrl};
use crate::slack::modal_builder::{
    DEPLOY_RELEASE_SHORTCUT, PUBLISH_RELEASE_SHORTCUT, build_deployment_confirmation_modal,
    build_publication_confirmation_modal, build_release_tag_modal, build_release_type_modal,
    build_status_warning, config_drift_warning,
};
use crate::slack::response_builder::{create_clear_payload, create_push_payload};

const OPEN_MODAL_TIMEOUT_MS: u64 = 2000;

/// UI directive answered synchronously to Slack.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogResponse {
    /// 204, empty body.
    Acknowledge,
    /// 200 `{response_action: "push", view}`.
    Push(Value),
    /// 200 `{response_action: "clear"}`.
    Clear,
}

impl DialogResponse {
    #[must_use]
    pub fn into_response(self) -> Value {
        match self {
            DialogResponse::Acknowledge => no_content(),
            DialogResponse::Push(view) => ok_json(&create_push_payload(&view)),
            DialogResponse::Clear => ok_json(&create_clear_payload()),
        }
    }
}

// ============================================================================
// Shortcut Handlers
// ============================================================================

async fn handle_shortcut(bot: &ReleaseBot, callback_id: &str, trigger_id: &str) -> DialogResponse {
    let view = match callback_id {
        PUBLISH_RELEASE_SHORTCUT => build_release_type_modal(),
        DEPLOY_RELEASE_SHORTCUT => build_release_tag_modal(),
        other => {
            info!("Unhandled shortcut: {}", other);
            return DialogResponse::Acknowledge;
        }
    };

    open_modal_with_timeout(&bot.platforms.chat, trigger_id, &view, OPEN_MODAL_TIMEOUT_MS).await;
    DialogResponse::Acknowledge
}

// ============================================================================
// Confirmation Builders
// ============================================================================

/// Drift lookups only decide whether a warning is shown; a failed lookup
/// shows none.
async fn config_drift_warnings(bot: &ReleaseBot, target: TargetEnvironment) -> Vec<String> {
    let orchestrator = bot.orchestrator();
    match orchestrator
        .has_config_file_changed_since_latest_release(&bot.config.github_repository)
        .await
    {
        Ok(true) => vec![config_drift_warning(orchestrator.config_file_path(), target)],
        Ok(false) => Vec::new(),
        Err(e) => {
            warn!(
                repository = %bot.config.github_repository,
                "Config drift check failed: {}", e
            );
            Vec::new()
        }
    }
}

async fn build_status_warnings(bot: &ReleaseBot, tag: &str) -> Vec<String> {
    match bot
        .platforms
        .source_control
        .is_build_status_ok(&bot.config.github_repository, tag)
        .await
    {
        Ok(true) => Vec::new(),
        Ok(false) => vec![build_status_warning(&bot.config.github_ci_check_name, tag)],
        Err(e) => {
            warn!(tag = %tag, "Build status check failed: {}", e);
            Vec::new()
        }
    }
}

// ============================================================================
// Task Dispatch
// ============================================================================

async fn dispatch_release(
    bot: &ReleaseBot,
    action: ReleaseAction,
    requested_by: &str,
    destination: Destination,
) -> DialogResponse {
    let task = ReleaseTask {
        correlation_id: Uuid::new_v4().to_string(),
        repository: bot.config.github_repository.clone(),
        action,
        destination,
        requested_by: Some(requested_by.to_string()).filter(|u| !u.is_empty()),
    };
    let correlation_id = task.correlation_id.clone();
    let destination = task.destination.clone();
    let environment = task.target_environment();

    if let Err(e) = bot.dispatcher.dispatch(task).await {
        error!(correlation_id = %correlation_id, "Failed to dispatch release task: {}", e);
        let text = format!(
            "Could not start the {environment} release of {} (ref: {}). Please try again.",
            bot.config.github_repository,
            correlation_id.get(..8).unwrap_or(&correlation_id)
        );
        // The acknowledgment must not wait on Slack.
        drop(bot.notifier().notify_detached(destination, text));
    } else {
        info!(correlation_id = %correlation_id, "Release task dispatched");
    }

    DialogResponse::Clear
}

/// Outcome messages go to the submission's `response_url` when Slack supplied
/// one, and to the release channel otherwise.
fn release_destination(bot: &ReleaseBot, response_urls: &[ResponseUrl]) -> Destination {
    response_urls.first().map_or_else(
        || Destination::Channel(bot.config.slack_release_channel.clone()),
        |url| Destination::ResponseUrl(url.response_url.clone()),
    )
}

// ============================================================================
// View Submission Handlers
// ============================================================================

async fn handle_dialog_step(
    bot: &ReleaseBot,
    step: DialogStep,
    user_id: &str,
    destination: Destination,
) -> DialogResponse {
    match step {
        DialogStep::ReleaseTypeSelection(release_type) => {
            let warnings = config_drift_warnings(bot, TargetEnvironment::Staging).await;
            DialogResponse::Push(build_publication_confirmation_modal(release_type, &warnings))
        }
        DialogStep::ReleaseTagSelection(tag) => {
            let mut warnings = config_drift_warnings(bot, TargetEnvironment::Production).await;
            warnings.extend(build_status_warnings(bot, &tag).await);
            DialogResponse::Push(build_deployment_confirmation_modal(&tag, &warnings))
        }
        DialogStep::PublicationConfirmation(release_type) => {
            let action = ReleaseAction::PublishAndDeploy { release_type };
            dispatch_release(bot, action, user_id, destination).await
        }
        DialogStep::DeploymentConfirmation(tag) => {
            dispatch_release(bot, ReleaseAction::DeployTag { tag }, user_id, destination).await
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Advance the release dialog by one step.
pub async fn handle_interaction(bot: &ReleaseBot, interaction: &Interaction) -> DialogResponse {
    match interaction {
        Interaction::ViewClosed => DialogResponse::Acknowledge,
        Interaction::Shortcut {
            callback_id,
            trigger_id,
            ..
        } => handle_shortcut(bot, callback_id, trigger_id).await,
        Interaction::ViewSubmission {
            view,
            user,
            response_urls,
        } => match view.dialog_step() {
            Some(step) => {
                info!(callback_id = %view.callback_id, "view_submission received");
                let destination = release_destination(bot, response_urls);
                handle_dialog_step(bot, step, &user.id, destination).await
            }
            None => {
                info!("Unhandled view callback_id: {}", view.callback_id);
                DialogResponse::Acknowledge
            }
        },
        Interaction::Unsupported => {
            info!("Unhandled interactive type");
            DialogResponse::Acknowledge
        }
    }
}

/// Entry point for `/slack/interactive-endpoint`: verify, parse, then advance
/// the dialog.
pub async fn handle_slack_request(bot: &ReleaseBot, headers: &Value, body: &str) -> Value {
    if let Err(e) = verify_slack_request(
        &bot.config.slack_signing_secret,
        body,
        get_header_value(headers, "X-Slack-Request-Timestamp"),
        get_header_value(headers, "X-Slack-Signature"),
    ) {
        error!("Slack signature verification failed: {}", e);
        return err_response(e.status_code(), &e.to_string());
    }

    let interaction = match parse_interaction(body) {
        Ok(interaction) => interaction,
        Err(e) => {
            error!("Interactive payload parse error: {}", e);
            return err_response(400, &format!("Parse Error: {e}"));
        }
    };

    handle_interaction(bot, &interaction).await.into_response()
}
