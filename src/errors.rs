//! Error type shared by the handlers, clients and worker.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Failed to parse request: {0}")]
    ParseError(String),

    #[error("Failed to access Slack API: {0}")]
    SlackApiError(String),

    #[error("GitHub API error: {0}")]
    GitHubError(String),

    #[error("Scalingo API error: {0}")]
    ScalingoError(String),

    #[error("Build service error: {0}")]
    BuildError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to interact with AWS services: {0}")]
    AwsError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl BotError {
    /// True for failures of the source-control, deployment or build platforms.
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            BotError::GitHubError(_)
                | BotError::ScalingoError(_)
                | BotError::BuildError(_)
                | BotError::HttpError(_)
        )
    }

    /// HTTP status used when the error escapes a request handler.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            BotError::Unauthorized(_) => 401,
            BotError::ParseError(_) => 400,
            BotError::SlackApiError(_)
            | BotError::GitHubError(_)
            | BotError::ScalingoError(_)
            | BotError::BuildError(_)
            | BotError::HttpError(_) => 502,
            BotError::AwsError(_) | BotError::ConfigError(_) => 500,
        }
    }
}

impl From<reqwest::Error> for BotError {
    fn from(error: reqwest::Error) -> Self {
        BotError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for BotError {
    fn from(error: serde_json::Error) -> Self {
        BotError::ParseError(error.to_string())
    }
}

impl<E> From<aws_sdk_sqs::error::SdkError<E>> for BotError
where
    E: std::fmt::Display,
{
    fn from(error: aws_sdk_sqs::error::SdkError<E>) -> Self {
        BotError::AwsError(error.to_string())
    }
}
