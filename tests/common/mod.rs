//! Recording fakes for the platform traits and a test configuration.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use releasebot::api::dispatch::TaskDispatcher;
use releasebot::clients::{BuildPlatform, DeployPlatform, ReleaseTag, SourceControl};
use releasebot::core::config::{AppConfig, ReleaseTargets, ReviewAppBindings};
use releasebot::core::models::{ReleaseTask, ReleaseType};
use releasebot::errors::BotError;
use releasebot::features::release::ReleaseOrchestrator;
use releasebot::features::templates::MessageTemplates;
use releasebot::slack::ChatPlatform;
use releasebot::worker::{Notifier, run_task};
use releasebot::{Platforms, ReleaseBot};

pub const SIGNING_SECRET: &str = "slack-signing-secret";
pub const WEBHOOK_SECRET: &str = "github-webhook-secret";
pub const REPOSITORY: &str = "pix";

pub fn test_config() -> AppConfig {
    AppConfig {
        slack_signing_secret: SIGNING_SECRET.to_string(),
        slack_bot_token: "xoxb-test".to_string(),
        slack_release_channel: "#tech-releases".to_string(),
        github_token: None,
        github_webhook_secret: WEBHOOK_SECRET.to_string(),
        github_owner: "1024pix".to_string(),
        github_repository: REPOSITORY.to_string(),
        config_file_path: "api/lib/config.js".to_string(),
        github_ci_check_name: "build-test-and-deploy".to_string(),
        scalingo_token: "tk-us-test".to_string(),
        scalingo_region: "osc-fr1".to_string(),
        review_app_domain: "review.pix.fr".to_string(),
        review_apps: ReviewAppBindings::new(HashMap::from([(
            "pix-site".to_string(),
            vec!["pix-site-review".to_string(), "pix-pro-review".to_string()],
        )])),
        review_app_template_dir: None,
        release_targets: ReleaseTargets {
            staging: vec!["pix-api-integration".to_string(), "pix-app-integration".to_string()],
            production: vec!["pix-api-production".to_string()],
        },
        build_service_url: "https://build.example.test".to_string(),
        build_service_token: None,
        release_queue_url: None,
    }
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Default)]
pub struct FakeChat {
    pub fail: bool,
    pub delay: Option<Duration>,
    pub modals: Mutex<Vec<(String, Value)>>,
    pub messages: Mutex<Vec<(String, String)>>,
}

impl FakeChat {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Records each message at once, then answers only after `delay`.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn modals(&self) -> Vec<(String, Value)> {
        self.modals.lock().unwrap().clone()
    }

    fn result(&self) -> Result<(), BotError> {
        if self.fail {
            Err(BotError::SlackApiError("chat.postMessage error: channel_not_found".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChatPlatform for FakeChat {
    async fn open_modal(&self, trigger_id: &str, view: &Value) -> Result<(), BotError> {
        self.modals
            .lock()
            .unwrap()
            .push((trigger_id.to_string(), view.clone()));
        self.result()
    }

    async fn post_message(&self, channel: &str, text: &str) -> Result<(), BotError> {
        self.messages
            .lock()
            .unwrap()
            .push((channel.to_string(), text.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result()
    }

    async fn post_to_response_url(&self, url: &str, text: &str) -> Result<(), BotError> {
        self.messages
            .lock()
            .unwrap()
            .push((url.to_string(), text.to_string()));
        self.result()
    }
}

// ============================================================================
// Source control
// ============================================================================

pub struct FakeSourceControl {
    pub latest_tag: String,
    pub config_changed: bool,
    pub build_green: bool,
    pub fail_lookups: bool,
    pub comments: Mutex<Vec<(String, u64, String)>>,
}

impl Default for FakeSourceControl {
    fn default() -> Self {
        Self {
            latest_tag: "v4.2.0".to_string(),
            config_changed: false,
            build_green: true,
            fail_lookups: false,
            comments: Mutex::new(Vec::new()),
        }
    }
}

impl FakeSourceControl {
    pub fn comments(&self) -> Vec<(String, u64, String)> {
        self.comments.lock().unwrap().clone()
    }

    fn lookup(&self) -> Result<(), BotError> {
        if self.fail_lookups {
            Err(BotError::GitHubError("503 Service Unavailable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SourceControl for FakeSourceControl {
    async fn latest_release_tag(&self, _repository: &str) -> Result<ReleaseTag, BotError> {
        self.lookup()?;
        Ok(ReleaseTag {
            name: self.latest_tag.clone(),
            commit_sha: "abc123".to_string(),
        })
    }

    async fn commit_date(&self, _repository: &str, _sha: &str) -> Result<DateTime<Utc>, BotError> {
        self.lookup()?;
        Ok(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap())
    }

    async fn commits_touching_path_since(
        &self,
        _repository: &str,
        _path: &str,
        _since: DateTime<Utc>,
    ) -> Result<Vec<String>, BotError> {
        self.lookup()?;
        Ok(if self.config_changed {
            vec!["def456".to_string()]
        } else {
            Vec::new()
        })
    }

    async fn comment_pull_request(
        &self,
        repository: &str,
        pull_request_id: u64,
        comment: &str,
    ) -> Result<(), BotError> {
        self.comments.lock().unwrap().push((
            repository.to_string(),
            pull_request_id,
            comment.to_string(),
        ));
        Ok(())
    }

    async fn is_build_status_ok(&self, _repository: &str, _tag: &str) -> Result<bool, BotError> {
        self.lookup()?;
        Ok(self.build_green)
    }
}

// ============================================================================
// Deployment
// ============================================================================

#[derive(Default)]
pub struct FakeDeploy {
    pub failing_app: Option<String>,
    pub failing_tag: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeDeploy {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String, app: &str) -> Result<(), BotError> {
        self.calls.lock().unwrap().push(call);
        if self.failing_app.as_deref() == Some(app) {
            return Err(BotError::ScalingoError(format!("{app}: 422 Unprocessable")));
        }
        Ok(())
    }
}

#[async_trait]
impl DeployPlatform for FakeDeploy {
    async fn deploy_review_app(&self, app: &str, pull_request_id: u64) -> Result<(), BotError> {
        self.record(format!("review_app {app} {pull_request_id}"), app)
    }

    async fn deploy_using_scm(&self, app: &str, reference: &str) -> Result<(), BotError> {
        self.record(format!("scm {app} {reference}"), app)
    }

    async fn deploy_tag(&self, app: &str, tag: &str) -> Result<(), BotError> {
        if self.failing_tag.as_deref() == Some(tag) {
            self.calls.lock().unwrap().push(format!("tag {app} {tag}"));
            return Err(BotError::ScalingoError(format!("unknown tag {tag}")));
        }
        self.record(format!("tag {app} {tag}"), app)
    }
}

// ============================================================================
// Build
// ============================================================================

#[derive(Default)]
pub struct FakeBuild {
    pub fail: bool,
    pub published: Mutex<Vec<(String, ReleaseType)>>,
}

impl FakeBuild {
    pub fn published(&self) -> Vec<(String, ReleaseType)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl BuildPlatform for FakeBuild {
    async fn publish(&self, repository: &str, release_type: ReleaseType) -> Result<(), BotError> {
        self.published
            .lock()
            .unwrap()
            .push((repository.to_string(), release_type));
        if self.fail {
            return Err(BotError::BuildError("500 Internal Server Error".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Runs the task to completion before returning, so tests can assert on
/// its effects deterministically.
pub struct InlineDispatcher {
    pub orchestrator: ReleaseOrchestrator,
    pub notifier: Notifier,
    pub tasks: Mutex<Vec<ReleaseTask>>,
}

#[async_trait]
impl TaskDispatcher for InlineDispatcher {
    async fn dispatch(&self, task: ReleaseTask) -> Result<(), BotError> {
        self.tasks.lock().unwrap().push(task.clone());
        run_task(&self.orchestrator, &self.notifier, &task).await;
        Ok(())
    }
}

pub struct FailingDispatcher;

#[async_trait]
impl TaskDispatcher for FailingDispatcher {
    async fn dispatch(&self, _task: ReleaseTask) -> Result<(), BotError> {
        Err(BotError::AwsError("queue unavailable".into()))
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub chat: Arc<FakeChat>,
    pub source_control: Arc<FakeSourceControl>,
    pub deploy: Arc<FakeDeploy>,
    pub build: Arc<FakeBuild>,
    pub dispatcher: Arc<InlineDispatcher>,
    pub bot: ReleaseBot,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(FakeSourceControl::default(), FakeDeploy::default(), FakeBuild::default())
    }

    pub fn with(source_control: FakeSourceControl, deploy: FakeDeploy, build: FakeBuild) -> Self {
        Self::with_chat(FakeChat::default(), source_control, deploy, build)
    }

    pub fn with_chat(
        chat: FakeChat,
        source_control: FakeSourceControl,
        deploy: FakeDeploy,
        build: FakeBuild,
    ) -> Self {
        let chat = Arc::new(chat);
        let source_control = Arc::new(source_control);
        let deploy = Arc::new(deploy);
        let build = Arc::new(build);
        let platforms = Platforms {
            chat: chat.clone(),
            source_control: source_control.clone(),
            deploy: deploy.clone(),
            build: build.clone(),
        };
        let bot = ReleaseBot::from_parts(test_config(), platforms, MessageTemplates::default());
        let dispatcher = Arc::new(InlineDispatcher {
            orchestrator: bot.orchestrator(),
            notifier: bot.notifier(),
            tasks: Mutex::new(Vec::new()),
        });
        let bot = bot.with_dispatcher(dispatcher.clone());

        Self {
            chat,
            source_control,
            deploy,
            build,
            dispatcher,
            bot,
        }
    }

    pub fn tasks(&self) -> Vec<ReleaseTask> {
        self.dispatcher.tasks.lock().unwrap().clone()
    }
}
