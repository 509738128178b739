//! Deleting the most recent releases, e.g. after a botched release run

use futures::future::join_all;
use tracing::{error, info};

use crate::config::MAX_PRUNE_COUNT;
use crate::error::ReleaseError;
use crate::release::error::HostError;
use crate::release::host::{ReleaseHost, ReleaseSummary};

/// Delete the `count` newest releases together with their tags.
///
/// `count` must be between 1 and [`MAX_PRUNE_COUNT`]. Deletions run concurrently and
/// all of them are attempted; the first failure is returned after every deletion settled.
pub async fn prune_recent_releases(
    host: &dyn ReleaseHost,
    count: usize,
    dry_run: bool,
) -> Result<Vec<ReleaseSummary>, ReleaseError> {
    if count == 0 {
        return Err(ReleaseError::InvalidInvocation(
            "N_VERSIONS must be greater than 0".to_string(),
        ));
    }
    if count > MAX_PRUNE_COUNT {
        return Err(ReleaseError::InvalidInvocation(format!(
            "N_VERSIONS must be at most {} to avoid deleting too many releases",
            MAX_PRUNE_COUNT
        )));
    }

    let releases = host
        .list_releases(1, count)
        .await
        .map_err(|source| ReleaseError::VcsOperationFailed {
            operation: "list releases",
            target: "latest releases".to_string(),
            source,
        })?;
    let to_delete: Vec<ReleaseSummary> = releases.into_iter().take(count).collect();

    if dry_run {
        for release in &to_delete {
            info!("[dry run] Would delete release {} (id {})", release.tag_name, release.id);
        }
        return Ok(to_delete);
    }

    let results = join_all(to_delete.iter().map(|release| delete_release_and_tag(host, release))).await;

    let mut first_error = None;
    for (release, result) in to_delete.iter().zip(results) {
        match result {
            Ok(()) => info!("Deleted release {} (id {})", release.tag_name, release.id),
            Err(e) => {
                error!("Failed to delete release {}: {}", release.tag_name, e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(to_delete),
    }
}

async fn delete_release_and_tag(
    host: &dyn ReleaseHost,
    release: &ReleaseSummary,
) -> Result<(), ReleaseError> {
    let vcs_error = |operation: &'static str| {
        let target = release.tag_name.clone();
        move |source: HostError| ReleaseError::VcsOperationFailed {
            operation,
            target,
            source,
        }
    };

    host.delete_release(release.id)
        .await
        .map_err(vcs_error("delete release"))?;
    host.delete_tag(&release.tag_name)
        .await
        .map_err(vcs_error("delete tag"))
}
