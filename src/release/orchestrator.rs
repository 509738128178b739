//! Idempotent tag + release replacement for one `(language, version)`

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::RELEASES_PER_PAGE;
use crate::error::ReleaseError;
use crate::release::error::HostError;
use crate::release::host::{NewRelease, ReleaseHost, ReleaseSummary};
use crate::version::semver::ReleaseVersion;
use crate::version::types::Language;

/// The tag + release pair published for one language version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    pub language: Language,
    pub version: ReleaseVersion,
    pub tag_name: String,
    pub title: String,
    pub body: String,
    pub commit_sha: String,
    /// `None` for dry runs
    pub release_id: Option<u64>,
    pub html_url: Option<String>,
}

/// Canonical tag name, e.g. `python@1.2.4`
pub fn tag_name(language: Language, version: &ReleaseVersion) -> String {
    format!("{}@{}", language, version)
}

fn release_body(language: Language, version: &ReleaseVersion) -> String {
    format!(
        "This release updates the {} package to {}.",
        language, version
    )
}

fn vcs_error(operation: &'static str, target: &str) -> impl FnOnce(HostError) -> ReleaseError {
    let target = target.to_string();
    move |source| ReleaseError::VcsOperationFailed {
        operation,
        target,
        source,
    }
}

/// Replaces releases on the hosting platform
pub struct ReleaseOrchestrator {
    host: Arc<dyn ReleaseHost>,
    dry_run: bool,
}

impl ReleaseOrchestrator {
    pub fn new(host: Arc<dyn ReleaseHost>, dry_run: bool) -> Self {
        Self { host, dry_run }
    }

    /// Delete any release and tag named `<language>@<version>`, then create both afresh.
    ///
    /// The tag is created before the release. If release creation fails, the new tag is
    /// removed again so the next run starts from a clean state.
    pub async fn release(
        &self,
        language: Language,
        version: &ReleaseVersion,
        commit_sha: &str,
    ) -> Result<ReleaseRecord, ReleaseError> {
        let tag = tag_name(language, version);
        let mut record = ReleaseRecord {
            language,
            version: version.clone(),
            tag_name: tag.clone(),
            title: tag.clone(),
            body: release_body(language, version),
            commit_sha: commit_sha.to_string(),
            release_id: None,
            html_url: None,
        };

        if self.dry_run {
            info!(
                "[dry run] Would replace any existing release {} and create it at {}: {:?}",
                tag, commit_sha, record.body
            );
            return Ok(record);
        }

        self.remove_existing(&tag).await?;

        info!("Creating tag {} at {}", tag, commit_sha);
        self.host
            .create_tag(&tag, commit_sha)
            .await
            .map_err(vcs_error("create tag", &tag))?;

        let new_release = NewRelease {
            tag_name: tag.clone(),
            name: record.title.clone(),
            body: record.body.clone(),
            target_commitish: commit_sha.to_string(),
        };

        let created = match self.host.create_release(&new_release).await {
            Ok(created) => created,
            Err(source) => {
                warn!("Creating release {} failed; removing the new tag", tag);
                if let Err(e) = self.host.delete_tag(&tag).await {
                    warn!("Failed to remove tag {} after release failure: {}", tag, e);
                }
                return Err(vcs_error("create release", &tag)(source));
            }
        };

        info!("Created release {} (id {})", tag, created.id);
        record.release_id = Some(created.id);
        record.html_url = created.html_url;
        Ok(record)
    }

    /// Walk every page of releases looking for one tagged `tag`
    pub async fn find_release(&self, tag: &str) -> Result<Option<ReleaseSummary>, ReleaseError> {
        let mut page = 1;
        loop {
            let releases = self
                .host
                .list_releases(page, RELEASES_PER_PAGE)
                .await
                .map_err(vcs_error("list releases", tag))?;
            let count = releases.len();

            if let Some(release) = releases.into_iter().find(|r| r.tag_name == tag) {
                return Ok(Some(release));
            }
            if count < RELEASES_PER_PAGE {
                return Ok(None);
            }
            page += 1;
        }
    }

    /// A tag without a release (left behind by an interrupted run) is deleted as well
    async fn remove_existing(&self, tag: &str) -> Result<(), ReleaseError> {
        if let Some(existing) = self.find_release(tag).await? {
            info!("Deleting existing release {} (id {})", tag, existing.id);
            self.host
                .delete_release(existing.id)
                .await
                .map_err(vcs_error("delete release", tag))?;
            return self.delete_tag_if_present(tag).await;
        }

        let orphaned = self
            .host
            .tag_exists(tag)
            .await
            .map_err(vcs_error("look up tag", tag))?;
        if orphaned {
            warn!("Deleting tag {} which has no release", tag);
            self.host
                .delete_tag(tag)
                .await
                .map_err(vcs_error("delete tag", tag))?;
        }
        Ok(())
    }

    /// Releases can exist without their tag (e.g. tag deleted by hand); a 404 is fine here
    async fn delete_tag_if_present(&self, tag: &str) -> Result<(), ReleaseError> {
        match self.host.delete_tag(tag).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                warn!("Tag {} was already gone", tag);
                Ok(())
            }
            Err(e) => Err(vcs_error("delete tag", tag)(e)),
        }
    }
}
