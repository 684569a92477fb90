//! Common helper functions for API handlers.
//!
//! This module provides response builders and shared async operations
//! to reduce duplication across handlers.

use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

use crate::slack::ChatPlatform;

// ============================================================================
// Response Builders
// ============================================================================

/// Returns a 204 No Content response.
#[must_use]
pub fn no_content() -> Value {
    json!({ "statusCode": 204, "body": "" })
}

/// Returns a 200 OK response with a plain-text body.
#[must_use]
pub fn ok_text(text: &str) -> Value {
    json!({
        "statusCode": 200,
        "headers": { "Content-Type": "text/plain; charset=utf-8" },
        "body": text
    })
}

/// Returns a 200 OK response with a JSON body.
#[must_use]
pub fn ok_json(body: &Value) -> Value {
    json!({
        "statusCode": 200,
        "headers": { "Content-Type": "application/json" },
        "body": body.to_string()
    })
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json!({
        "statusCode": status_code,
        "headers": { "Content-Type": "application/json" },
        "body": json!({ "error": message }).to_string()
    })
}

// ============================================================================
// Modal Operations
// ============================================================================

/// Opens a modal with a timeout to avoid blocking the Slack ack.
///
/// This spawns an async task to open the modal and waits up to `timeout_ms`
/// for it to complete. If the timeout fires, the modal open continues in
/// the background.
pub async fn open_modal_with_timeout(
    chat: &Arc<dyn ChatPlatform>,
    trigger_id: &str,
    view: &Value,
    timeout_ms: u64,
) {
    let chat = Arc::clone(chat);
    let trigger_id = trigger_id.to_string();
    let view = view.clone();

    let modal_handle = tokio::spawn(async move {
        if let Err(e) = chat.open_modal(&trigger_id, &view).await {
            error!("Failed to open modal: {}", e);
        }
    });

    if tokio::time::timeout(Duration::from_millis(timeout_ms), modal_handle)
        .await
        .is_err()
    {
        warn!("views.open still pending after {} ms", timeout_ms);
    }
}
