//! Outbound platform clients.
//!
//! Each platform sits behind a trait so the request handlers and the worker can
//! be exercised without network access.

pub mod build;
pub mod github;
pub mod scalingo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::time::Duration;

use crate::core::models::ReleaseType;
use crate::errors::BotError;

pub use build::BuildClient;
pub use github::GitHubClient;
pub use scalingo::ScalingoClient;

pub(crate) static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// A tag as listed by the source-control platform, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
    pub name: String,
    pub commit_sha: String,
}

/// Source-control operations (GitHub).
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Most recent tag of `repository`.
    async fn latest_release_tag(&self, repository: &str) -> Result<ReleaseTag, BotError>;

    /// Committer date of a commit.
    async fn commit_date(&self, repository: &str, sha: &str) -> Result<DateTime<Utc>, BotError>;

    /// SHAs of the commits touching `path` since `since`.
    async fn commits_touching_path_since(
        &self,
        repository: &str,
        path: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<String>, BotError>;

    async fn comment_pull_request(
        &self,
        repository: &str,
        pull_request_id: u64,
        comment: &str,
    ) -> Result<(), BotError>;

    /// Whether the CI check runs for `tag` all completed successfully.
    async fn is_build_status_ok(&self, repository: &str, tag: &str) -> Result<bool, BotError>;
}

/// Deployment platform operations (Scalingo).
#[async_trait]
pub trait DeployPlatform: Send + Sync {
    /// Create the review app `{app}-pr{pull_request_id}` from the parent app.
    async fn deploy_review_app(&self, app: &str, pull_request_id: u64) -> Result<(), BotError>;

    /// Redeploy `app` from a branch or other source reference.
    async fn deploy_using_scm(&self, app: &str, reference: &str) -> Result<(), BotError>;

    /// Deploy a release tag to `app`.
    async fn deploy_tag(&self, app: &str, tag: &str) -> Result<(), BotError>;
}

/// Build-side release publication.
#[async_trait]
pub trait BuildPlatform: Send + Sync {
    /// Cut a new version of `repository`. The new tag becomes the latest tag.
    async fn publish(&self, repository: &str, release_type: ReleaseType) -> Result<(), BotError>;
}
