//! API Lambda handler - thin router that delegates to specialized handlers.
//!
//! This module handles:
//! - GitHub webhooks (delegated to `github_webhook` module)
//! - Slack interactive components (delegated to `interactive_handler` module)

use super::{github_webhook, helpers, interactive_handler, parsing};
use crate::bot::ReleaseBot;
use crate::core::config::AppConfig;
use lambda_runtime::{Error, LambdaEvent};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{error, info};

pub use self::function_handler as handler;

pub const GITHUB_WEBHOOK_PATH: &str = "/github/webhook";
pub const SLACK_INTERACTIVE_PATH: &str = "/slack/interactive-endpoint";

static BOT: OnceCell<ReleaseBot> = OnceCell::const_new();

/// Route one API Gateway request to its handler and return the response
/// payload. Never fails: every error becomes a status code.
pub async fn handle_request(bot: &ReleaseBot, payload: &Value) -> Value {
    let Some(path) = parsing::request_path(payload) else {
        error!("Request missing path");
        return helpers::err_response(400, "Missing path");
    };
    info!(raw_path = %path, "Request path");

    let empty_headers = Value::Null;
    let headers = payload.get("headers").unwrap_or(&empty_headers);

    let route_known = path.ends_with(GITHUB_WEBHOOK_PATH) || path.ends_with(SLACK_INTERACTIVE_PATH);
    if !route_known {
        return helpers::err_response(404, "Not Found");
    }

    let body = match parsing::extract_body(payload) {
        Ok(b) => b,
        Err(e) => {
            error!("Invalid request body: {}", e);
            return helpers::err_response(400, &e.to_string());
        }
    };

    if path.ends_with(GITHUB_WEBHOOK_PATH) {
        github_webhook::handle_github_webhook(bot, headers, &body).await
    } else {
        interactive_handler::handle_slack_request(bot, headers, &body).await
    }
}

/// Lambda handler for the API entrypoint.
///
/// The bot is built on the first request and reused for the lifetime of the
/// execution environment.
///
/// # Errors
///
/// Returns an error only when the configuration cannot be loaded; request
/// level failures are reported through the response status code.
#[tracing::instrument(level = "info", skip(event))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<impl Serialize, Error> {
    let bot = BOT
        .get_or_try_init(|| async {
            AppConfig::from_env()
                .map(ReleaseBot::new)
                .map_err(|e| {
                    error!("Config error: {}", e);
                    Error::from(e)
                })
        })
        .await?;

    info!(request_id = %event.context.request_id, "API Lambda received request");
    Ok(handle_request(bot, &event.payload).await)
}
