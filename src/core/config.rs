use std::collections::HashMap;
use std::env;

const DEFAULT_RELEASE_CHANNEL: &str = "#tech-releases";
const DEFAULT_CONFIG_FILE_PATH: &str = "api/lib/config.js";
const DEFAULT_CI_CHECK_NAME: &str = "build-test-and-deploy";
const DEFAULT_SCALINGO_REGION: &str = "osc-fr1";

/// Repository name -> review environments, in deployment order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewAppBindings {
    by_repository: HashMap<String, Vec<String>>,
}

impl ReviewAppBindings {
    #[must_use]
    pub fn new(by_repository: HashMap<String, Vec<String>>) -> Self {
        // A repository bound to an empty list is the same as an unbound one.
        let by_repository = by_repository
            .into_iter()
            .filter(|(_, environments)| !environments.is_empty())
            .collect();
        Self { by_repository }
    }

    /// Parse the JSON object form used by `REVIEW_APP_BINDINGS`,
    /// e.g. `{"my-site": ["my-site-review", "my-pro-review"]}`.
    ///
    /// # Errors
    ///
    /// Returns a message when the value is not an object of string arrays.
    pub fn from_json(raw: &str) -> Result<Self, String> {
        let parsed: HashMap<String, Vec<String>> =
            serde_json::from_str(raw).map_err(|e| format!("REVIEW_APP_BINDINGS: {e}"))?;
        Ok(Self::new(parsed))
    }

    #[must_use]
    pub fn environments_for(&self, repository: &str) -> Option<&[String]> {
        self.by_repository.get(repository).map(Vec::as_slice)
    }
}

/// Scalingo applications that receive a release, per target environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseTargets {
    pub staging: Vec<String>,
    pub production: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub slack_signing_secret: String,
    pub slack_bot_token: String,
    pub slack_release_channel: String,
    pub github_token: Option<String>,
    pub github_webhook_secret: String,
    pub github_owner: String,
    pub github_repository: String,
    pub config_file_path: String,
    pub github_ci_check_name: String,
    pub scalingo_token: String,
    pub scalingo_region: String,
    pub review_app_domain: String,
    pub review_apps: ReviewAppBindings,
    pub review_app_template_dir: Option<String>,
    pub release_targets: ReleaseTargets,
    pub build_service_url: String,
    pub build_service_token: Option<String>,
    pub release_queue_url: Option<String>,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns the name of the first missing or malformed variable.
    pub fn from_env() -> Result<Self, String> {
        let review_apps = match env::var("REVIEW_APP_BINDINGS") {
            Ok(raw) if !raw.trim().is_empty() => ReviewAppBindings::from_json(&raw)?,
            _ => ReviewAppBindings::default(),
        };

        Ok(Self {
            slack_signing_secret: required("SLACK_SIGNING_SECRET")?,
            slack_bot_token: required("SLACK_BOT_TOKEN")?,
            slack_release_channel: or_default("SLACK_RELEASE_CHANNEL", DEFAULT_RELEASE_CHANNEL),
            github_token: env::var("GITHUB_TOKEN").ok(),
            github_webhook_secret: required("GITHUB_WEBHOOK_SECRET")?,
            github_owner: required("GITHUB_OWNER")?,
            github_repository: required("GITHUB_REPOSITORY")?,
            config_file_path: or_default("CONFIG_FILE_PATH", DEFAULT_CONFIG_FILE_PATH),
            github_ci_check_name: or_default("GITHUB_CI_CHECK_NAME", DEFAULT_CI_CHECK_NAME),
            scalingo_token: required("SCALINGO_TOKEN")?,
            scalingo_region: or_default("SCALINGO_REGION", DEFAULT_SCALINGO_REGION),
            review_app_domain: required("REVIEW_APP_DOMAIN")?,
            review_apps,
            review_app_template_dir: env::var("REVIEW_APP_TEMPLATE_DIR").ok(),
            release_targets: ReleaseTargets {
                staging: split_list(&env::var("RELEASE_STAGING_APPS").unwrap_or_default()),
                production: split_list(&env::var("RELEASE_PRODUCTION_APPS").unwrap_or_default()),
            },
            build_service_url: required("BUILD_SERVICE_URL")?,
            build_service_token: env::var("BUILD_SERVICE_TOKEN").ok(),
            release_queue_url: env::var("RELEASE_QUEUE_URL").ok(),
        })
    }
}

fn required(name: &str) -> Result<String, String> {
    env::var(name).map_err(|e| format!("{name}: {e}"))
}

fn or_default(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Split a comma-separated list, dropping blanks.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
