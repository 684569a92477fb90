//! Scalingo API client
//!
//! Scalingo API tokens are exchanged for a short-lived bearer token on first use;
//! the bearer is then reused for the lifetime of the client.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::OnceCell;
use tracing::info;

use super::{DeployPlatform, HTTP_CLIENT};
use crate::errors::BotError;

const SCALINGO_AUTH_URL: &str = "https://auth.scalingo.com/v1/tokens/exchange";

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    token: String,
}

/// Name of the review app Scalingo creates for a pull request of `app`.
#[must_use]
pub fn review_app_name(app: &str, pull_request_id: u64) -> String {
    format!("{app}-pr{pull_request_id}")
}

pub struct ScalingoClient {
    api_token: String,
    api_url: String,
    bearer: OnceCell<String>,
}

impl ScalingoClient {
    #[must_use]
    pub fn new(api_token: String, region: &str) -> Self {
        Self {
            api_token,
            api_url: format!("https://api.{region}.scalingo.com/v1"),
            bearer: OnceCell::new(),
        }
    }

    async fn bearer_token(&self) -> Result<&str, BotError> {
        let token = self
            .bearer
            .get_or_try_init(|| async {
                let resp = HTTP_CLIENT
                    .post(SCALINGO_AUTH_URL)
                    .basic_auth("", Some(&self.api_token))
                    .header(ACCEPT, "application/json")
                    .send()
                    .await
                    .map_err(|e| BotError::ScalingoError(format!("token exchange: {e}")))?;

                if !resp.status().is_success() {
                    return Err(BotError::ScalingoError(format!(
                        "token exchange HTTP {}",
                        resp.status()
                    )));
                }

                let body: TokenExchangeResponse = resp.json().await.map_err(|e| {
                    BotError::ScalingoError(format!("token exchange JSON parse error: {e}"))
                })?;
                Ok(body.token)
            })
            .await?;
        Ok(token.as_str())
    }

    async fn post(&self, path: &str, body: &Value) -> Result<(), BotError> {
        let bearer = self.bearer_token().await?;
        let resp = HTTP_CLIENT
            .post(format!("{}{path}", self.api_url))
            .bearer_auth(bearer)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| BotError::ScalingoError(format!("POST {path}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            return Err(BotError::ScalingoError(format!(
                "POST {path} HTTP {status}: {text}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DeployPlatform for ScalingoClient {
    async fn deploy_review_app(&self, app: &str, pull_request_id: u64) -> Result<(), BotError> {
        self.post(
            &format!("/apps/{app}/scm_repo_link/manual_review_app"),
            &json!({ "pull_request_id": pull_request_id }),
        )
        .await?;
        info!(
            app = %app,
            review_app = %review_app_name(app, pull_request_id),
            "Review app deployment requested"
        );
        Ok(())
    }

    async fn deploy_using_scm(&self, app: &str, reference: &str) -> Result<(), BotError> {
        self.post(
            &format!("/apps/{app}/scm_repo_link/manual_deploy"),
            &json!({ "branch": reference }),
        )
        .await?;
        info!(app = %app, reference = %reference, "Deployment from SCM requested");
        Ok(())
    }

    async fn deploy_tag(&self, app: &str, tag: &str) -> Result<(), BotError> {
        // Scalingo resolves tags through the same linked-repository deploy as branches.
        self.deploy_using_scm(app, tag).await
    }
}
