//! Pull-request comment templates for review apps.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

const DEFAULT_TEMPLATE: &str = include_str!("../../templates/pull-request-messages/default.md");

/// Default template plus optional per-repository overrides, loaded once at startup.
#[derive(Debug, Clone)]
pub struct MessageTemplates {
    default: String,
    by_repository: HashMap<String, String>,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            default: DEFAULT_TEMPLATE.to_string(),
            by_repository: HashMap::new(),
        }
    }
}

impl MessageTemplates {
    #[must_use]
    pub fn with_repository(mut self, repository: &str, template: &str) -> Self {
        self.by_repository
            .insert(repository.to_string(), template.to_string());
        self
    }

    /// Load `{repository}.md` files from `dir`. A `default.md` in the directory
    /// replaces the embedded default. Unreadable entries are skipped.
    #[must_use]
    pub fn load_from_dir(dir: &Path) -> Self {
        let mut templates = Self::default();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), "Cannot read template directory: {}", e);
                return templates;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match fs::read_to_string(&path) {
                Ok(content) if stem == "default" => templates.default = content,
                Ok(content) => {
                    templates.by_repository.insert(stem.to_string(), content);
                }
                Err(e) => warn!(path = %path.display(), "Skipping template: {}", e),
            }
        }

        info!(
            dir = %dir.display(),
            repositories = templates.by_repository.len(),
            "Loaded pull-request templates"
        );
        templates
    }

    #[must_use]
    pub fn template_for(&self, repository: &str) -> &str {
        self.by_repository
            .get(repository)
            .map_or(self.default.as_str(), String::as_str)
    }
}

/// Literal placeholder substitution; unknown placeholders are left as-is.
#[must_use]
pub fn render_message(
    template: &str,
    pull_request_id: u64,
    web_application_url: &str,
    scalingo_dashboard_url: &str,
) -> String {
    template
        .replace("{{pullRequestId}}", &pull_request_id.to_string())
        .replace("{{webApplicationUrl}}", web_application_url)
        .replace("{{scalingoDashboardUrl}}", scalingo_dashboard_url)
}
