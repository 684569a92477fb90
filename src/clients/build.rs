//! Client for the build service that cuts new release tags.

use async_trait::async_trait;
use serde_json::json;
use tracing::info;
use url::Url;

use super::{BuildPlatform, HTTP_CLIENT};
use crate::core::models::ReleaseType;
use crate::errors::BotError;

pub struct BuildClient {
    base_url: String,
    token: Option<String>,
}

impl BuildClient {
    #[must_use]
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self { base_url, token }
    }

    /// `POST {base}/releases`, tolerating a base URL with or without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured base URL is not a valid URL.
    pub fn releases_url(&self) -> Result<Url, BotError> {
        let base = if self.base_url.ends_with('/') {
            self.base_url.clone()
        } else {
            format!("{}/", self.base_url)
        };
        Url::parse(&base)
            .and_then(|u| u.join("releases"))
            .map_err(|e| BotError::ConfigError(format!("BUILD_SERVICE_URL: {e}")))
    }
}

#[async_trait]
impl BuildPlatform for BuildClient {
    async fn publish(&self, repository: &str, release_type: ReleaseType) -> Result<(), BotError> {
        let url = self.releases_url()?;
        let mut request = HTTP_CLIENT.post(url).json(&json!({
            "repository": repository,
            "release_type": release_type,
        }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| BotError::BuildError(format!("publish {repository}: {e}")))?;

        if !resp.status().is_success() {
            return Err(BotError::BuildError(format!(
                "publish {repository} HTTP {}",
                resp.status()
            )));
        }
        info!(repository = %repository, release_type = %release_type, "Release published");
        Ok(())
    }
}
