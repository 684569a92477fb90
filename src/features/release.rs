//! Release orchestration: publish a new version and deploy it, or deploy an
//! existing tag, to the applications bound to a target environment.

use std::sync::Arc;
use tracing::{error, info};

use crate::clients::{BuildPlatform, DeployPlatform, SourceControl};
use crate::core::config::ReleaseTargets;
use crate::core::models::{ReleaseType, TargetEnvironment};
use crate::errors::BotError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Succeeded {
        repository: String,
        tag: String,
        environment: TargetEnvironment,
        apps: Vec<String>,
    },
    Failed {
        repository: String,
        environment: TargetEnvironment,
        apps: Vec<String>,
        reason: String,
    },
    NotConfigured {
        repository: String,
        environment: TargetEnvironment,
    },
}

impl ReleaseOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ReleaseOutcome::Succeeded { .. })
    }

    /// User-facing text. Failure reasons stay in the logs.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            ReleaseOutcome::Succeeded {
                repository,
                tag,
                environment,
                apps,
            } => format!(
                "The deployment of release '{tag}' of {repository} to {} in {environment} succeeded. \
                 Waiting for the applications to start on Scalingo…",
                apps.join(", ")
            ),
            ReleaseOutcome::Failed {
                repository,
                environment,
                apps,
                ..
            } => format!(
                "Error while deploying {repository} to {} in {environment}.",
                apps.join(", ")
            ),
            ReleaseOutcome::NotConfigured {
                repository,
                environment,
            } => format!(
                "No Scalingo application is configured for {repository} in {environment}; nothing was deployed."
            ),
        }
    }
}

#[derive(Clone)]
pub struct ReleaseOrchestrator {
    source_control: Arc<dyn SourceControl>,
    build: Arc<dyn BuildPlatform>,
    deploy: Arc<dyn DeployPlatform>,
    targets: ReleaseTargets,
    config_file_path: String,
}

impl ReleaseOrchestrator {
    #[must_use]
    pub fn new(
        source_control: Arc<dyn SourceControl>,
        build: Arc<dyn BuildPlatform>,
        deploy: Arc<dyn DeployPlatform>,
        targets: ReleaseTargets,
        config_file_path: String,
    ) -> Self {
        Self {
            source_control,
            build,
            deploy,
            targets,
            config_file_path,
        }
    }

    fn apps_for(&self, environment: TargetEnvironment) -> &[String] {
        match environment {
            TargetEnvironment::Staging => &self.targets.staging,
            TargetEnvironment::Production => &self.targets.production,
        }
    }

    /// Cut a new `release_type` version of `repository`, then deploy the
    /// resulting latest tag to every staging application.
    pub async fn publish_and_deploy(
        &self,
        repository: &str,
        release_type: ReleaseType,
    ) -> ReleaseOutcome {
        let environment = TargetEnvironment::Staging;
        let apps = self.apps_for(environment);
        if apps.is_empty() {
            return ReleaseOutcome::NotConfigured {
                repository: repository.to_string(),
                environment,
            };
        }

        let result = async {
            self.build.publish(repository, release_type).await?;
            let tag = self.source_control.latest_release_tag(repository).await?;
            info!(repository = %repository, tag = %tag.name, "Resolved published tag");
            self.deploy_to(apps, &tag.name).await?;
            Ok::<_, BotError>(tag.name)
        }
        .await;

        self.outcome(repository, environment, result)
    }

    /// Deploy an existing tag to every production application.
    pub async fn deploy_by_tag(&self, repository: &str, tag: &str) -> ReleaseOutcome {
        let environment = TargetEnvironment::Production;
        let apps = self.apps_for(environment);
        if apps.is_empty() {
            return ReleaseOutcome::NotConfigured {
                repository: repository.to_string(),
                environment,
            };
        }

        let result = self.deploy_to(apps, tag).await.map(|()| tag.to_string());
        self.outcome(repository, environment, result)
    }

    async fn deploy_to(&self, apps: &[String], tag: &str) -> Result<(), BotError> {
        for app in apps {
            self.deploy.deploy_tag(app, tag).await?;
            info!(app = %app, tag = %tag, "Deployment triggered");
        }
        Ok(())
    }

    fn outcome(
        &self,
        repository: &str,
        environment: TargetEnvironment,
        result: Result<String, BotError>,
    ) -> ReleaseOutcome {
        let apps = self.apps_for(environment).to_vec();
        match result {
            Ok(tag) => ReleaseOutcome::Succeeded {
                repository: repository.to_string(),
                tag,
                environment,
                apps,
            },
            Err(e) => {
                error!(
                    repository = %repository,
                    environment = %environment,
                    "Release failed: {}", e
                );
                ReleaseOutcome::Failed {
                    repository: repository.to_string(),
                    environment,
                    apps,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// True when the designated configuration file has commits newer than the
    /// latest release tag.
    ///
    /// # Errors
    ///
    /// Returns the first failing GitHub call.
    pub async fn has_config_file_changed_since_latest_release(
        &self,
        repository: &str,
    ) -> Result<bool, BotError> {
        let latest = self.source_control.latest_release_tag(repository).await?;
        let released_at = self
            .source_control
            .commit_date(repository, &latest.commit_sha)
            .await?;
        let commits = self
            .source_control
            .commits_touching_path_since(repository, &self.config_file_path, released_at)
            .await?;
        Ok(!commits.is_empty())
    }

    #[must_use]
    pub fn config_file_path(&self) -> &str {
        &self.config_file_path
    }
}
