//! Wiring of the platform clients, templates and task dispatcher.

use std::path::Path;
use std::sync::Arc;

use crate::api::dispatch::{SpawnDispatcher, SqsDispatcher, TaskDispatcher};
use crate::clients::{
    BuildClient, BuildPlatform, DeployPlatform, GitHubClient, ScalingoClient, SourceControl,
};
use crate::core::config::AppConfig;
use crate::features::release::ReleaseOrchestrator;
use crate::features::review_apps::{ReviewAppBinder, ReviewAppUrls};
use crate::features::templates::MessageTemplates;
use crate::slack::{ChatPlatform, SlackClient};
use crate::worker::Notifier;

/// The platform clients the bot talks to.
#[derive(Clone)]
pub struct Platforms {
    pub chat: Arc<dyn ChatPlatform>,
    pub source_control: Arc<dyn SourceControl>,
    pub deploy: Arc<dyn DeployPlatform>,
    pub build: Arc<dyn BuildPlatform>,
}

impl Platforms {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            chat: Arc::new(SlackClient::new(config.slack_bot_token.clone())),
            source_control: Arc::new(GitHubClient::new(
                config.github_token.clone(),
                config.github_owner.clone(),
                config.github_ci_check_name.clone(),
            )),
            deploy: Arc::new(ScalingoClient::new(
                config.scalingo_token.clone(),
                &config.scalingo_region,
            )),
            build: Arc::new(BuildClient::new(
                config.build_service_url.clone(),
                config.build_service_token.clone(),
            )),
        }
    }
}

/// Everything a request needs, built once per cold start and read-only afterwards.
pub struct ReleaseBot {
    pub config: AppConfig,
    pub platforms: Platforms,
    pub templates: MessageTemplates,
    pub review_app_urls: ReviewAppUrls,
    pub dispatcher: Arc<dyn TaskDispatcher>,
}

impl ReleaseBot {
    /// Construct the bot with the real Slack, GitHub, Scalingo and build clients.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let templates = config
            .review_app_template_dir
            .as_deref()
            .map_or_else(MessageTemplates::default, |dir| {
                MessageTemplates::load_from_dir(Path::new(dir))
            });
        let platforms = Platforms::from_config(&config);
        Self::from_parts(config, platforms, templates)
    }

    /// Construct the bot from explicit platform clients. Tasks go to SQS when
    /// `RELEASE_QUEUE_URL` is configured and run in-process otherwise.
    #[must_use]
    pub fn from_parts(config: AppConfig, platforms: Platforms, templates: MessageTemplates) -> Self {
        let review_app_urls = ReviewAppUrls {
            region: config.scalingo_region.clone(),
            domain: config.review_app_domain.clone(),
        };

        let dispatcher: Arc<dyn TaskDispatcher> = match &config.release_queue_url {
            Some(queue_url) => Arc::new(SqsDispatcher::new(queue_url.clone())),
            None => Arc::new(SpawnDispatcher::new(
                orchestrator_for(&config, &platforms),
                Notifier::new(Arc::clone(&platforms.chat)),
            )),
        };

        Self {
            config,
            platforms,
            templates,
            review_app_urls,
            dispatcher,
        }
    }

    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn TaskDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    #[must_use]
    pub fn orchestrator(&self) -> ReleaseOrchestrator {
        orchestrator_for(&self.config, &self.platforms)
    }

    #[must_use]
    pub fn notifier(&self) -> Notifier {
        Notifier::new(Arc::clone(&self.platforms.chat))
    }

    #[must_use]
    pub fn review_app_binder(&self) -> ReviewAppBinder<'_> {
        ReviewAppBinder {
            deploy: self.platforms.deploy.as_ref(),
            source_control: self.platforms.source_control.as_ref(),
            bindings: &self.config.review_apps,
            templates: &self.templates,
            urls: &self.review_app_urls,
        }
    }
}

fn orchestrator_for(config: &AppConfig, platforms: &Platforms) -> ReleaseOrchestrator {
    ReleaseOrchestrator::new(
        Arc::clone(&platforms.source_control),
        Arc::clone(&platforms.build),
        Arc::clone(&platforms.deploy),
        config.release_targets.clone(),
        config.config_file_path.clone(),
    )
}
