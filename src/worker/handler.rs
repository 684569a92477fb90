#![allow(clippy::missing_errors_doc)]

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{error, info};

use super::notify::Notifier;
use crate::bot::ReleaseBot;
use crate::core::config::AppConfig;
use crate::core::models::{ReleaseAction, ReleaseTask};
use crate::errors::BotError;
use crate::features::release::{ReleaseOrchestrator, ReleaseOutcome};

pub use self::function_handler as handler;

/// Text posted before a release task starts.
#[must_use]
pub fn start_message(task: &ReleaseTask) -> String {
    let requester = task
        .requested_by
        .as_deref()
        .filter(|u| !u.is_empty())
        .map(|u| format!(" (requested by <@{u}>)"))
        .unwrap_or_default();

    match &task.action {
        ReleaseAction::PublishAndDeploy { release_type } => format!(
            "Publishing a {release_type} release of {} and deploying it to staging{requester}…",
            task.repository
        ),
        ReleaseAction::DeployTag { tag } => format!(
            "Deploying release '{tag}' of {} to production{requester}…",
            task.repository
        ),
    }
}

/// Run one release task to completion, reporting progress and the outcome
/// through the notifier.
pub async fn run_task(
    orchestrator: &ReleaseOrchestrator,
    notifier: &Notifier,
    task: &ReleaseTask,
) -> ReleaseOutcome {
    info!(
        correlation_id = %task.correlation_id,
        repository = %task.repository,
        action = ?task.action,
        "Running release task"
    );
    notifier.notify(&task.destination, &start_message(task)).await;

    let outcome = match &task.action {
        ReleaseAction::PublishAndDeploy { release_type } => {
            orchestrator
                .publish_and_deploy(&task.repository, *release_type)
                .await
        }
        ReleaseAction::DeployTag { tag } => orchestrator.deploy_by_tag(&task.repository, tag).await,
    };

    info!(
        correlation_id = %task.correlation_id,
        success = outcome.is_success(),
        "Release task finished"
    );
    notifier.notify(&task.destination, &outcome.message()).await;
    outcome
}

/// Decode every `ReleaseTask` carried by an SQS event.
pub fn parse_sqs_tasks(payload: &Value) -> Result<Vec<ReleaseTask>, BotError> {
    let records = payload
        .get("Records")
        .and_then(Value::as_array)
        .ok_or_else(|| BotError::ParseError("SQS event without Records".to_string()))?;

    records
        .iter()
        .map(|record| {
            let body = record
                .get("body")
                .and_then(Value::as_str)
                .ok_or_else(|| BotError::ParseError("SQS record without body".to_string()))?;
            serde_json::from_str::<ReleaseTask>(body).map_err(|e| {
                BotError::ParseError(format!("Failed to parse SQS body into ReleaseTask: {e}"))
            })
        })
        .collect()
}

static BOT: OnceCell<ReleaseBot> = OnceCell::const_new();

#[tracing::instrument(level = "info", skip(event))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<(), Error> {
    let bot = BOT
        .get_or_try_init(|| async {
            AppConfig::from_env().map(ReleaseBot::new).map_err(|e| {
                error!("Config error: {}", e);
                Error::from(e)
            })
        })
        .await?;

    let tasks = parse_sqs_tasks(&event.payload).map_err(|e| {
        error!("Invalid SQS event: {}", e);
        Error::from(e.to_string())
    })?;

    let orchestrator = bot.orchestrator();
    let notifier = bot.notifier();
    for task in &tasks {
        run_task(&orchestrator, &notifier, task).await;
    }

    Ok(())
}
