use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic-versioning increment requested for a new release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Patch,
    #[default]
    Minor,
    Major,
}

impl ReleaseType {
    /// Parse a user-supplied release type. Anything unrecognized, including
    /// an empty string, falls back to `Minor`.
    #[must_use]
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "patch" => ReleaseType::Patch,
            "major" => ReleaseType::Major,
            _ => ReleaseType::Minor,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReleaseType::Patch => "patch",
            ReleaseType::Minor => "minor",
            ReleaseType::Major => "major",
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetEnvironment {
    Staging,
    Production,
}

impl fmt::Display for TargetEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetEnvironment::Staging => f.write_str("staging"),
            TargetEnvironment::Production => f.write_str("production"),
        }
    }
}

/// Where a progress or result message should go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum Destination {
    Channel(String),
    ResponseUrl(String),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Channel(channel) => write!(f, "channel {channel}"),
            Destination::ResponseUrl(url) => write!(f, "response_url {url}"),
        }
    }
}

/// What a confirmed dialog asks the worker to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReleaseAction {
    PublishAndDeploy { release_type: ReleaseType },
    DeployTag { tag: String },
}

/// Queue message consumed exactly once by the release worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseTask {
    pub correlation_id: String,
    pub repository: String,
    #[serde(flatten)]
    pub action: ReleaseAction,
    pub destination: Destination,
    pub requested_by: Option<String>,
}

impl ReleaseTask {
    #[must_use]
    pub fn target_environment(&self) -> TargetEnvironment {
        match self.action {
            ReleaseAction::PublishAndDeploy { .. } => TargetEnvironment::Staging,
            ReleaseAction::DeployTag { .. } => TargetEnvironment::Production,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestAction {
    Opened,
    Synchronize,
    Other(String),
}

impl PullRequestAction {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "opened" => PullRequestAction::Opened,
            "synchronize" => PullRequestAction::Synchronize,
            other => PullRequestAction::Other(other.to_string()),
        }
    }
}

/// The parts of a GitHub `pull_request` event the review-app binder needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestEvent {
    pub repository_name: String,
    pub pull_request_id: u64,
    pub head_ref: String,
    pub is_fork: bool,
    pub labels: Vec<String>,
    pub action: PullRequestAction,
}

impl PullRequestEvent {
    #[must_use]
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|label| label == name)
    }
}
