//! GitHub REST API implementation of [`ReleaseHost`]

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::{GitHubSettings, USER_AGENT};
use crate::release::error::HostError;
use crate::release::host::{NewRelease, ReleaseHost, ReleaseSummary};

const API_VERSION: &str = "2022-11-28";

/// Error body returned by the GitHub API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Client for the releases and git refs endpoints of one repository
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    owner: String,
    repo: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(settings: &GitHubSettings) -> Result<Self, HostError> {
        Ok(Self {
            client: reqwest::Client::builder().user_agent(USER_AGENT).build()?,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            owner: settings.owner.clone(),
            repo: settings.repo.clone(),
            token: settings.token.clone(),
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_url, self.owner, self.repo, path
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request_accepting(method, path, "application/vnd.github+json")
    }

    fn request_accepting(&self, method: Method, path: &str, accept: &str) -> RequestBuilder {
        let url = self.repo_url(path);
        debug!("GitHub {} {}", method, url);

        let request = self
            .client
            .request(method, url)
            .header("Accept", accept)
            .header("X-GitHub-Api-Version", API_VERSION);

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Turn non-success statuses into [`HostError::Api`], keeping GitHub's message
    async fn check(response: Response) -> Result<Response, HostError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or(body);

        warn!("GitHub API returned status {}: {}", status, url);
        Err(HostError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait::async_trait]
impl ReleaseHost for GitHubClient {
    async fn list_releases(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<ReleaseSummary>, HostError> {
        let path = format!("releases?per_page={}&page={}", per_page, page);
        let response = Self::check(self.request(Method::GET, &path).send().await?).await?;

        response
            .json()
            .await
            .map_err(|e| HostError::InvalidResponse(e.to_string()))
    }

    async fn delete_release(&self, release_id: u64) -> Result<(), HostError> {
        let path = format!("releases/{}", release_id);
        Self::check(self.request(Method::DELETE, &path).send().await?).await?;
        Ok(())
    }

    async fn tag_exists(&self, tag: &str) -> Result<bool, HostError> {
        let path = format!("git/ref/tags/{}", tag);
        let response = self.request(Method::GET, &path).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        Self::check(response).await?;
        Ok(true)
    }

    async fn create_tag(&self, tag: &str, sha: &str) -> Result<(), HostError> {
        let body = json!({
            "ref": format!("refs/tags/{}", tag),
            "sha": sha,
        });
        Self::check(
            self.request(Method::POST, "git/refs")
                .json(&body)
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    async fn delete_tag(&self, tag: &str) -> Result<(), HostError> {
        let path = format!("git/refs/tags/{}", tag);
        Self::check(self.request(Method::DELETE, &path).send().await?).await?;
        Ok(())
    }

    async fn create_release(&self, release: &NewRelease) -> Result<ReleaseSummary, HostError> {
        let response = Self::check(
            self.request(Method::POST, "releases")
                .json(release)
                .send()
                .await?,
        )
        .await?;

        response
            .json()
            .await
            .map_err(|e| HostError::InvalidResponse(e.to_string()))
    }

    async fn head_commit_sha(&self) -> Result<String, HostError> {
        let response = Self::check(
            self.request_accepting(Method::GET, "commits/HEAD", "application/vnd.github.sha")
                .send()
                .await?,
        )
        .await?;

        let sha = response.text().await?.trim().to_string();
        if sha.is_empty() {
            return Err(HostError::InvalidResponse("empty commit SHA".to_string()));
        }
        Ok(sha)
    }
}
