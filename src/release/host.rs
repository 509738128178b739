//! Hosting platform trait for tag and release operations

#[cfg(test)]
use mockall::automock;

use serde::{Deserialize, Serialize};

use crate::release::error::HostError;

/// A release as listed by the hosting platform
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseSummary {
    pub id: u64,
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Payload for a new release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    pub tag_name: String,
    pub name: String,
    pub body: String,
    pub target_commitish: String,
}

/// Remote tag/release state of one repository
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseHost: Send + Sync {
    /// One page of releases, newest first. `page` is 1-based.
    async fn list_releases(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<ReleaseSummary>, HostError>;

    async fn delete_release(&self, release_id: u64) -> Result<(), HostError>;

    /// Whether `refs/tags/<tag>` exists
    async fn tag_exists(&self, tag: &str) -> Result<bool, HostError>;

    /// Create `refs/tags/<tag>` pointing at `sha`
    async fn create_tag(&self, tag: &str, sha: &str) -> Result<(), HostError>;

    async fn delete_tag(&self, tag: &str) -> Result<(), HostError>;

    async fn create_release(&self, release: &NewRelease) -> Result<ReleaseSummary, HostError>;

    /// SHA of the repository's HEAD commit
    async fn head_commit_sha(&self) -> Result<String, HostError>;
}
