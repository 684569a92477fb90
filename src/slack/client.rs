//! Slack API client module
//!
//! Encapsulates the Slack Web API calls the bot makes: opening modals, posting
//! messages and answering through one-shot `response_url`s.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use super::response_builder::create_ephemeral_payload;
use crate::clients::HTTP_CLIENT;
use crate::errors::BotError;

const SLACK_API_URL: &str = "https://slack.com/api";

/// Chat-platform operations used by the dialog and the notifier.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Opens a modal using Slack's `views.open` API.
    async fn open_modal(&self, trigger_id: &str, view: &Value) -> Result<(), BotError>;

    async fn post_message(&self, channel: &str, text: &str) -> Result<(), BotError>;

    async fn post_to_response_url(&self, response_url: &str, text: &str) -> Result<(), BotError>;
}

pub struct SlackClient {
    token: String,
}

impl SlackClient {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self { token }
    }

    async fn call_api(&self, method: &str, payload: &Value) -> Result<(), BotError> {
        debug!(method = %method, "Slack API call");
        let resp = HTTP_CLIENT
            .post(format!("{SLACK_API_URL}/{method}"))
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await
            .map_err(|e| BotError::SlackApiError(format!("{method}: {e}")))?;

        if !resp.status().is_success() {
            return Err(BotError::SlackApiError(format!(
                "{method} HTTP {}",
                resp.status()
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| BotError::SlackApiError(format!("{method} JSON parse error: {e}")))?;
        check_ok(method, &json)
    }
}

/// Slack answers HTTP 200 with `{"ok": false, "error": ...}` on application errors.
///
/// # Errors
///
/// Returns `SlackApiError` carrying Slack's error code when `ok` is not true.
pub fn check_ok(method: &str, body: &Value) -> Result<(), BotError> {
    if body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
        Ok(())
    } else {
        Err(BotError::SlackApiError(format!(
            "{method} error: {}",
            body.get("error").and_then(Value::as_str).unwrap_or("unknown")
        )))
    }
}

#[async_trait]
impl ChatPlatform for SlackClient {
    async fn open_modal(&self, trigger_id: &str, view: &Value) -> Result<(), BotError> {
        self.call_api(
            "views.open",
            &json!({
                "trigger_id": trigger_id,
                "view": view
            }),
        )
        .await
    }

    async fn post_message(&self, channel: &str, text: &str) -> Result<(), BotError> {
        self.call_api(
            "chat.postMessage",
            &json!({
                "channel": channel,
                "text": text
            }),
        )
        .await
    }

    async fn post_to_response_url(&self, response_url: &str, text: &str) -> Result<(), BotError> {
        let resp = HTTP_CLIENT
            .post(response_url)
            .json(&create_ephemeral_payload(text))
            .send()
            .await
            .map_err(|e| BotError::SlackApiError(format!("response_url POST: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            return Err(BotError::SlackApiError(format!(
                "response_url POST HTTP {status}: {body}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_ok_accepts_ok_true() {
        assert!(check_ok("chat.postMessage", &json!({ "ok": true })).is_ok());
    }

    #[test]
    fn check_ok_reports_slack_error_code() {
        let err = check_ok(
            "chat.postMessage",
            &json!({ "ok": false, "error": "channel_not_found" }),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to access Slack API: chat.postMessage error: channel_not_found"
        );
    }

    #[test]
    fn check_ok_treats_missing_flag_as_failure() {
        assert!(check_ok("views.open", &json!({})).is_err());
    }
}
