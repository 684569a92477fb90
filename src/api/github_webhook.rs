//! Handler for `/github/webhook`.

use serde_json::Value;
use tracing::{error, info, warn};

use super::helpers::{err_response, ok_text};
use super::parsing::get_header_value;
use super::signature::verify_github_signature;
use crate::bot::ReleaseBot;
use crate::errors::BotError;
use crate::features::review_apps::parse_pull_request_event;

const PULL_REQUEST_EVENT: &str = "pull_request";

/// Verify the webhook signature and drive review apps for `pull_request`
/// events. Every other event is acknowledged and ignored.
pub async fn handle_github_webhook(bot: &ReleaseBot, headers: &Value, body: &str) -> Value {
    if let Err(e) = verify_github_signature(
        &bot.config.github_webhook_secret,
        body.as_bytes(),
        get_header_value(headers, "X-Hub-Signature-256"),
    ) {
        error!("GitHub signature verification failed: {}", e);
        return err_response(e.status_code(), &e.to_string());
    }

    let event_type = get_header_value(headers, "X-GitHub-Event").unwrap_or_default();
    if event_type != PULL_REQUEST_EVENT {
        info!(event = %event_type, "Ignoring GitHub event");
        return ok_text(&format!("Ignoring {event_type} event"));
    }

    let event = match serde_json::from_str::<Value>(body)
        .map_err(BotError::from)
        .and_then(|payload| parse_pull_request_event(&payload))
    {
        Ok(event) => event,
        Err(e) => {
            error!("Invalid pull_request payload: {}", e);
            return err_response(400, &format!("Parse Error: {e}"));
        }
    };

    info!(
        repository = %event.repository_name,
        pull_request = event.pull_request_id,
        action = ?event.action,
        "pull_request event received"
    );

    match bot.review_app_binder().on_pull_request_event(&event).await {
        Ok(outcome) => {
            info!(repository = %event.repository_name, "{}", outcome);
            ok_text(&outcome.to_string())
        }
        Err(e) if e.is_upstream() => {
            warn!(
                repository = %event.repository_name,
                pull_request = event.pull_request_id,
                "Review app platform call failed: {}", e
            );
            err_response(e.status_code(), &e.to_string())
        }
        Err(e) => {
            error!(
                repository = %event.repository_name,
                pull_request = event.pull_request_id,
                "Review app operation failed: {}", e
            );
            err_response(e.status_code(), &e.to_string())
        }
    }
}
