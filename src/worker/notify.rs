//! Best-effort delivery of progress and result messages.
//!
//! Nothing in this module returns an error: failures are logged with the
//! destination and the payload, then dropped.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::core::models::Destination;
use crate::slack::ChatPlatform;

#[derive(Clone)]
pub struct Notifier {
    chat: Arc<dyn ChatPlatform>,
}

impl Notifier {
    #[must_use]
    pub fn new(chat: Arc<dyn ChatPlatform>) -> Self {
        Self { chat }
    }

    /// Deliver `text` and wait for the attempt to finish.
    pub async fn notify(&self, destination: &Destination, text: &str) {
        let result = match destination {
            Destination::Channel(channel) => self.chat.post_message(channel, text).await,
            Destination::ResponseUrl(url) => self.chat.post_to_response_url(url, text).await,
        };

        match result {
            Ok(()) => info!(destination = %destination, "Notification delivered"),
            Err(e) => error!(
                destination = %destination,
                payload = %text,
                "Notification failed: {}", e
            ),
        }
    }

    /// Launch delivery in the background. The handle resolves once the attempt
    /// is over and never carries a failure.
    pub fn notify_detached(&self, destination: Destination, text: String) -> JoinHandle<()> {
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.notify(&destination, &text).await;
        })
    }
}
