//! Pull request -> review app lifecycle.
//!
//! Opening a pull request creates one review app per bound environment and
//! comments the links on the pull request; pushing to it redeploys them.
//! Calls are made in binding order and the first failure aborts the rest.
//! Review apps created before a failure are left in place.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::{info, warn};

use super::templates::{MessageTemplates, render_message};
use crate::clients::scalingo::review_app_name;
use crate::clients::{DeployPlatform, SourceControl};
use crate::core::config::ReviewAppBindings;
use crate::core::models::{PullRequestAction, PullRequestEvent};
use crate::errors::BotError;

pub const NO_REVIEW_APP_LABEL: &str = "no-review-app";

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    action: String,
    number: u64,
    pull_request: PullRequestBody,
}

#[derive(Debug, Deserialize)]
struct PullRequestBody {
    head: PullRequestHead,
    #[serde(default)]
    labels: Vec<PullRequestLabel>,
}

#[derive(Debug, Deserialize)]
struct PullRequestHead {
    #[serde(rename = "ref")]
    git_ref: String,
    repo: Option<HeadRepository>,
}

#[derive(Debug, Deserialize)]
struct HeadRepository {
    name: String,
    #[serde(default)]
    fork: bool,
}

#[derive(Debug, Deserialize)]
struct PullRequestLabel {
    name: String,
}

/// Extract a [`PullRequestEvent`] from a GitHub `pull_request` webhook payload.
///
/// A head repository that no longer exists (deleted fork) is reported as a fork.
///
/// # Errors
///
/// Returns `ParseError` when required fields are missing.
pub fn parse_pull_request_event(payload: &Value) -> Result<PullRequestEvent, BotError> {
    let parsed = PullRequestPayload::deserialize(payload)
        .map_err(|e| BotError::ParseError(format!("pull_request payload: {e}")))?;

    let (repository_name, is_fork) = match parsed.pull_request.head.repo {
        Some(repo) => (repo.name, repo.fork),
        None => (String::new(), true),
    };

    Ok(PullRequestEvent {
        repository_name,
        pull_request_id: parsed.number,
        head_ref: parsed.pull_request.head.git_ref,
        is_fork,
        labels: parsed
            .pull_request
            .labels
            .into_iter()
            .map(|l| l.name)
            .collect(),
        action: PullRequestAction::parse(&parsed.action),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAppOutcome {
    NoReviewAppForFork,
    NotConfigured,
    DisabledByLabel,
    Created {
        environments: Vec<String>,
        pull_request_id: u64,
    },
    Redeployed {
        environments: Vec<String>,
        pull_request_id: u64,
    },
    Ignored(String),
}

impl fmt::Display for ReviewAppOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewAppOutcome::NoReviewAppForFork => f.write_str("No RA for a fork"),
            ReviewAppOutcome::NotConfigured => f.write_str("No RA configured for this repository"),
            ReviewAppOutcome::DisabledByLabel => f.write_str("RA disabled for this PR"),
            ReviewAppOutcome::Created {
                environments,
                pull_request_id,
            } => write!(
                f,
                "Created RA on app {} with pr {pull_request_id}",
                environments.join(", ")
            ),
            ReviewAppOutcome::Redeployed {
                environments,
                pull_request_id,
            } => write!(
                f,
                "Triggered deployment of RA on app {} with pr {pull_request_id}",
                environments.join(", ")
            ),
            ReviewAppOutcome::Ignored(action) => write!(f, "Ignoring {action} action"),
        }
    }
}

/// Links advertised in the pull-request comment.
#[derive(Debug, Clone)]
pub struct ReviewAppUrls {
    pub region: String,
    pub domain: String,
}

impl ReviewAppUrls {
    #[must_use]
    pub fn dashboard_url(&self, environment: &str, pull_request_id: u64) -> String {
        format!(
            "https://dashboard.scalingo.com/apps/{}/{}/environment",
            self.region,
            review_app_name(environment, pull_request_id)
        )
    }

    #[must_use]
    pub fn web_url(&self, environment: &str, pull_request_id: u64) -> String {
        format!(
            "https://{}.{}",
            review_app_name(environment, pull_request_id),
            self.domain
        )
    }
}

pub struct ReviewAppBinder<'a> {
    pub deploy: &'a dyn DeployPlatform,
    pub source_control: &'a dyn SourceControl,
    pub bindings: &'a ReviewAppBindings,
    pub templates: &'a MessageTemplates,
    pub urls: &'a ReviewAppUrls,
}

impl ReviewAppBinder<'_> {
    /// # Errors
    ///
    /// Returns the first failing deployment or comment call. Earlier calls are
    /// not undone.
    pub async fn on_pull_request_event(
        &self,
        event: &PullRequestEvent,
    ) -> Result<ReviewAppOutcome, BotError> {
        let opened = match &event.action {
            PullRequestAction::Opened => true,
            PullRequestAction::Synchronize => false,
            PullRequestAction::Other(action) => {
                return Ok(ReviewAppOutcome::Ignored(action.clone()));
            }
        };
        if event.is_fork {
            return Ok(ReviewAppOutcome::NoReviewAppForFork);
        }
        let Some(environments) = self.bindings.environments_for(&event.repository_name) else {
            return Ok(ReviewAppOutcome::NotConfigured);
        };
        let Some(first_environment) = environments.first() else {
            return Ok(ReviewAppOutcome::NotConfigured);
        };
        if event.has_label(NO_REVIEW_APP_LABEL) {
            return Ok(ReviewAppOutcome::DisabledByLabel);
        }

        if opened {
            self.create_review_apps(event, environments, first_environment)
                .await
        } else {
            self.redeploy_review_apps(event, environments).await
        }
    }

    async fn create_review_apps(
        &self,
        event: &PullRequestEvent,
        environments: &[String],
        first_environment: &str,
    ) -> Result<ReviewAppOutcome, BotError> {
        for environment in environments {
            if let Err(e) = self
                .deploy
                .deploy_review_app(environment, event.pull_request_id)
                .await
            {
                warn!(
                    repository = %event.repository_name,
                    environment = %environment,
                    pull_request_id = event.pull_request_id,
                    "Review app creation failed: {}", e
                );
                return Err(e);
            }
        }

        let comment = self.comment_for(event, first_environment);
        self.source_control
            .comment_pull_request(&event.repository_name, event.pull_request_id, &comment)
            .await?;

        info!(
            repository = %event.repository_name,
            pull_request_id = event.pull_request_id,
            "Review apps created"
        );
        Ok(ReviewAppOutcome::Created {
            environments: environments.to_vec(),
            pull_request_id: event.pull_request_id,
        })
    }

    async fn redeploy_review_apps(
        &self,
        event: &PullRequestEvent,
        environments: &[String],
    ) -> Result<ReviewAppOutcome, BotError> {
        for environment in environments {
            let app = review_app_name(environment, event.pull_request_id);
            if let Err(e) = self.deploy.deploy_using_scm(&app, &event.head_ref).await {
                warn!(
                    repository = %event.repository_name,
                    review_app = %app,
                    "Review app redeploy failed: {}", e
                );
                return Err(e);
            }
        }

        Ok(ReviewAppOutcome::Redeployed {
            environments: environments.to_vec(),
            pull_request_id: event.pull_request_id,
        })
    }

    fn comment_for(&self, event: &PullRequestEvent, first_environment: &str) -> String {
        render_message(
            self.templates.template_for(&event.repository_name),
            event.pull_request_id,
            &self.urls.web_url(first_environment, event.pull_request_id),
            &self.urls.dashboard_url(first_environment, event.pull_request_id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_pull_request_payload() {
        let payload = json!({
            "action": "opened",
            "number": 42,
            "pull_request": {
                "head": { "ref": "feature/x", "repo": { "name": "site", "fork": false } },
                "labels": [{ "name": "no-review-app" }, { "name": "team-a" }]
            }
        });
        let event = parse_pull_request_event(&payload).unwrap();
        assert_eq!(event.repository_name, "site");
        assert_eq!(event.pull_request_id, 42);
        assert_eq!(event.head_ref, "feature/x");
        assert!(!event.is_fork);
        assert!(event.has_label(NO_REVIEW_APP_LABEL));
        assert_eq!(event.action, PullRequestAction::Opened);
    }

    #[test]
    fn deleted_head_repository_counts_as_fork() {
        let payload = json!({
            "action": "synchronize",
            "number": 1,
            "pull_request": { "head": { "ref": "main", "repo": null } }
        });
        let event = parse_pull_request_event(&payload).unwrap();
        assert!(event.is_fork);
        assert!(event.labels.is_empty());
    }

    #[test]
    fn malformed_payload_is_a_parse_error() {
        let err = parse_pull_request_event(&json!({ "action": "opened" })).unwrap_err();
        assert!(matches!(err, BotError::ParseError(_)));
    }

    #[test]
    fn urls_derive_from_environment_and_pull_request() {
        let urls = ReviewAppUrls {
            region: "osc-fr1".into(),
            domain: "review.example.org".into(),
        };
        assert_eq!(
            urls.dashboard_url("site-review", 12),
            "https://dashboard.scalingo.com/apps/osc-fr1/site-review-pr12/environment"
        );
        assert_eq!(
            urls.web_url("site-review", 12),
            "https://site-review-pr12.review.example.org"
        );
    }

    #[test]
    fn outcome_messages() {
        let created = ReviewAppOutcome::Created {
            environments: vec!["front-review".into(), "api-review".into()],
            pull_request_id: 3,
        };
        assert_eq!(
            created.to_string(),
            "Created RA on app front-review, api-review with pr 3"
        );
        assert_eq!(
            ReviewAppOutcome::Ignored("closed".into()).to_string(),
            "Ignoring closed action"
        );
    }
}
