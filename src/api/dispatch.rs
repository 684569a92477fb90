//! Hand-off of confirmed release tasks to the worker.

use async_trait::async_trait;
use aws_sdk_sqs::Client as SqsClient;
use tracing::{error, info};

use crate::core::models::ReleaseTask;
use crate::errors::BotError;
use crate::features::release::ReleaseOrchestrator;
use crate::worker::{Notifier, run_task};

/// Starts a release task without waiting for it to finish.
#[async_trait]
pub trait TaskDispatcher: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the task could not be handed off. Failures of the
    /// task itself are never reported here.
    async fn dispatch(&self, task: ReleaseTask) -> Result<(), BotError>;
}

/// Queues tasks for the worker Lambda.
pub struct SqsDispatcher {
    queue_url: String,
}

impl SqsDispatcher {
    #[must_use]
    pub fn new(queue_url: String) -> Self {
        Self { queue_url }
    }
}

#[async_trait]
impl TaskDispatcher for SqsDispatcher {
    async fn dispatch(&self, task: ReleaseTask) -> Result<(), BotError> {
        let shared_config = aws_config::from_env().load().await;
        let client = SqsClient::new(&shared_config);
        let message_body = serde_json::to_string(&task)
            .map_err(|e| BotError::ParseError(format!("Failed to serialize task: {e}")))?;

        client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(message_body)
            .send()
            .await
            .map_err(|e| BotError::AwsError(format!("Failed to send message to SQS: {e}")))?;

        info!(correlation_id = %task.correlation_id, "Release task queued");
        Ok(())
    }
}

/// Runs tasks on the current tokio runtime, for deployments without a queue.
pub struct SpawnDispatcher {
    orchestrator: ReleaseOrchestrator,
    notifier: Notifier,
}

impl SpawnDispatcher {
    #[must_use]
    pub fn new(orchestrator: ReleaseOrchestrator, notifier: Notifier) -> Self {
        Self {
            orchestrator,
            notifier,
        }
    }
}

#[async_trait]
impl TaskDispatcher for SpawnDispatcher {
    async fn dispatch(&self, task: ReleaseTask) -> Result<(), BotError> {
        let orchestrator = self.orchestrator.clone();
        let notifier = self.notifier.clone();
        let handle = tokio::spawn(async move {
            run_task(&orchestrator, &notifier, &task).await;
        });

        // Observe the task so a panic inside it is logged rather than lost.
        tokio::spawn(async move {
            if let Err(e) = handle.await {
                error!("Release task aborted: {}", e);
            }
        });
        Ok(())
    }
}
