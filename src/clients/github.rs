//! GitHub REST API client

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};

use super::{HTTP_CLIENT, ReleaseTag, SourceControl};
use crate::errors::BotError;

const GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct GitHubTag {
    name: String,
    commit: GitHubTagCommit,
}

#[derive(Debug, Deserialize)]
struct GitHubTagCommit {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitHubCommit {
    commit: GitHubCommitDetail,
}

#[derive(Debug, Deserialize)]
struct GitHubCommitDetail {
    committer: GitHubSignature,
}

#[derive(Debug, Deserialize)]
struct GitHubSignature {
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct GitHubCommitRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct CheckRunsResponse {
    check_runs: Vec<CheckRun>,
}

/// One entry of `GET /repos/{owner}/{repo}/commits/{ref}/check-runs`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRun {
    pub name: String,
    pub status: String,
    pub conclusion: Option<String>,
}

/// A build is green when at least one run carries `check_name` and every such
/// run completed successfully.
#[must_use]
pub fn is_build_green(runs: &[CheckRun], check_name: &str) -> bool {
    let mut ci_runs = runs.iter().filter(|run| run.name == check_name).peekable();
    if ci_runs.peek().is_none() {
        return false;
    }
    ci_runs.all(|run| run.status == "completed" && run.conclusion.as_deref() == Some("success"))
}

pub struct GitHubClient {
    token: Option<String>,
    owner: String,
    ci_check_name: String,
}

impl GitHubClient {
    #[must_use]
    pub fn new(token: Option<String>, owner: String, ci_check_name: String) -> Self {
        Self {
            token,
            owner,
            ci_check_name,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = HTTP_CLIENT
            .request(method, format!("{GITHUB_API_URL}{path}"))
            .header(USER_AGENT, "releasebot")
            .header(ACCEPT, "application/vnd.github+json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BotError> {
        debug!(path = %path, "GitHub GET");
        let resp = self
            .request(Method::GET, path)
            .query(query)
            .send()
            .await
            .map_err(|e| BotError::GitHubError(format!("GET {path}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            return Err(BotError::GitHubError(format!(
                "GET {path} HTTP {status}: {body}"
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| BotError::GitHubError(format!("GET {path} JSON parse error: {e}")))
    }

    async fn list_tags(&self, repository: &str) -> Result<Vec<GitHubTag>, BotError> {
        self.get_json(&format!("/repos/{}/{repository}/tags", self.owner), &[])
            .await
    }
}

#[async_trait]
impl SourceControl for GitHubClient {
    async fn latest_release_tag(&self, repository: &str) -> Result<ReleaseTag, BotError> {
        let tags = self.list_tags(repository).await?;
        let latest = tags.into_iter().next().ok_or_else(|| {
            BotError::GitHubError(format!("No tag found on {}/{repository}", self.owner))
        })?;
        Ok(ReleaseTag {
            name: latest.name,
            commit_sha: latest.commit.sha,
        })
    }

    async fn commit_date(&self, repository: &str, sha: &str) -> Result<DateTime<Utc>, BotError> {
        let commit: GitHubCommit = self
            .get_json(&format!("/repos/{}/{repository}/commits/{sha}", self.owner), &[])
            .await?;
        Ok(commit.commit.committer.date)
    }

    async fn commits_touching_path_since(
        &self,
        repository: &str,
        path: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<String>, BotError> {
        let commits: Vec<GitHubCommitRef> = self
            .get_json(
                &format!("/repos/{}/{repository}/commits", self.owner),
                &[
                    ("since", since.to_rfc3339_opts(SecondsFormat::Secs, true)),
                    ("path", path.to_string()),
                ],
            )
            .await?;
        Ok(commits.into_iter().map(|c| c.sha).collect())
    }

    async fn comment_pull_request(
        &self,
        repository: &str,
        pull_request_id: u64,
        comment: &str,
    ) -> Result<(), BotError> {
        let path = format!(
            "/repos/{}/{repository}/issues/{pull_request_id}/comments",
            self.owner
        );
        let resp = self
            .request(Method::POST, &path)
            .json(&json!({ "body": comment }))
            .send()
            .await
            .map_err(|e| BotError::GitHubError(format!("POST {path}: {e}")))?;

        if !resp.status().is_success() {
            return Err(BotError::GitHubError(format!(
                "POST {path} HTTP {}",
                resp.status()
            )));
        }
        info!(repository = %repository, pull_request_id, "Commented pull request");
        Ok(())
    }

    async fn is_build_status_ok(&self, repository: &str, tag: &str) -> Result<bool, BotError> {
        let tags = self.list_tags(repository).await?;
        let Some(found) = tags.into_iter().find(|t| t.name == tag) else {
            return Err(BotError::GitHubError(format!(
                "Could not find the tag {tag} on {}/{repository}",
                self.owner
            )));
        };

        let runs: CheckRunsResponse = self
            .get_json(
                &format!(
                    "/repos/{}/{repository}/commits/{}/check-runs",
                    self.owner, found.commit.sha
                ),
                &[],
            )
            .await?;
        Ok(is_build_green(&runs.check_runs, &self.ci_check_name))
    }
}
