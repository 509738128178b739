//! Per-language release pipelines: resolve → bump → release → generate

use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info};

use crate::config::RunMode;
use crate::error::ReleaseError;
use crate::release::generator::Generator;
use crate::release::host::ReleaseHost;
use crate::release::orchestrator::{ReleaseOrchestrator, ReleaseRecord};
use crate::version::error::{EndpointFailure, RegistryError, RegistryUnavailable};
use crate::version::fetcher::VersionFetcher;
use crate::version::semver::ReleaseVersion;
use crate::version::types::{BumpType, Language};

/// Commit reference used for dry runs when no SHA was supplied
const DRY_RUN_COMMIT: &str = "HEAD";

/// The published version has a component at `u64::MAX`, so no higher version exists
fn unbumpable(language: Language, latest: &ReleaseVersion, bump: BumpType) -> RegistryUnavailable {
    RegistryUnavailable {
        language,
        failures: vec![EndpointFailure {
            endpoint: format!("{} bump", bump),
            attempt: 1,
            error: RegistryError::InvalidVersion(latest.to_string()),
        }],
    }
}

/// Version a language is about to be released at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRelease {
    pub language: Language,
    /// Latest published version; `None` when the version was given explicitly
    pub previous: Option<ReleaseVersion>,
    pub next: ReleaseVersion,
}

/// Result of the release stage: what was published and which languages failed
#[derive(Debug)]
pub struct RunOutcome {
    pub records: Vec<ReleaseRecord>,
    pub failures: Vec<(Language, ReleaseError)>,
}

impl RunOutcome {
    /// One failure is returned as-is, several as `PipelinesFailed`
    pub fn into_result(mut self) -> Result<Vec<ReleaseRecord>, ReleaseError> {
        match self.failures.len() {
            0 => Ok(self.records),
            1 => Err(self.failures.remove(0).1),
            _ => Err(ReleaseError::PipelinesFailed {
                failures: self.failures,
            }),
        }
    }
}

pub struct Pipeline {
    fetcher: VersionFetcher,
    host: Arc<dyn ReleaseHost>,
    orchestrator: ReleaseOrchestrator,
    generator: Arc<dyn Generator>,
    commit_sha: Option<String>,
    dry_run: bool,
}

impl Pipeline {
    pub fn new(
        fetcher: VersionFetcher,
        host: Arc<dyn ReleaseHost>,
        generator: Arc<dyn Generator>,
        commit_sha: Option<String>,
        dry_run: bool,
    ) -> Self {
        Self {
            fetcher,
            orchestrator: ReleaseOrchestrator::new(Arc::clone(&host), dry_run),
            host,
            generator,
            commit_sha,
            dry_run,
        }
    }

    /// Execute a run, failing if any language failed.
    ///
    /// Records of languages that did publish are dropped on failure; use
    /// [`Pipeline::run_all`] to keep them.
    pub async fn run(&self, mode: &RunMode) -> Result<Vec<ReleaseRecord>, ReleaseError> {
        self.run_all(mode).await?.into_result()
    }

    /// Execute a run and report every language's result.
    ///
    /// Every version is resolved before any release is touched, so a resolution failure
    /// leaves the hosting platform unchanged and is returned as `Err`. Language pipelines
    /// then run concurrently and are never cancelled by a sibling's failure.
    pub async fn run_all(&self, mode: &RunMode) -> Result<RunOutcome, ReleaseError> {
        let plans = self.plan(mode).await?;
        let commit_sha = self.target_commit().await?;

        let results = join_all(
            plans
                .iter()
                .map(|plan| self.release_language(plan, &commit_sha)),
        )
        .await;

        let mut records = Vec::new();
        let mut failures = Vec::new();
        for (plan, result) in plans.iter().zip(results) {
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    error!("{}: release of {} failed: {}", plan.language, plan.next, e);
                    failures.push((plan.language, e));
                }
            }
        }

        Ok(RunOutcome { records, failures })
    }

    /// Work out which version each targeted language is released at
    pub async fn plan(&self, mode: &RunMode) -> Result<Vec<PlannedRelease>, ReleaseError> {
        match mode {
            RunMode::ExplicitVersion { language, version } => Ok(vec![PlannedRelease {
                language: *language,
                previous: None,
                next: version.clone(),
            }]),
            RunMode::Bump { bump, selection } => {
                self.resolve_next_versions(*bump, &selection.languages())
                    .await
            }
        }
    }

    /// Fetch the latest version of every language concurrently and bump each one.
    ///
    /// Fails with `VersionResolutionFailed` if any language could not be resolved.
    pub async fn resolve_next_versions(
        &self,
        bump: BumpType,
        languages: &[Language],
    ) -> Result<Vec<PlannedRelease>, ReleaseError> {
        let results = join_all(
            languages
                .iter()
                .map(|language| self.fetcher.fetch_latest_version(*language)),
        )
        .await;

        let mut plans = Vec::new();
        let mut failures = Vec::new();
        for (language, result) in languages.iter().zip(results) {
            match result {
                Ok(latest) => {
                    let Some(next) = latest.bump(bump) else {
                        let e = unbumpable(*language, &latest, bump);
                        error!("{}", e);
                        failures.push(e);
                        continue;
                    };
                    info!("{}: {} -> {} ({} bump)", language, latest, next, bump);
                    plans.push(PlannedRelease {
                        language: *language,
                        previous: Some(latest),
                        next,
                    });
                }
                Err(e) => {
                    error!("{}", e);
                    failures.push(e);
                }
            }
        }

        if !failures.is_empty() {
            return Err(ReleaseError::VersionResolutionFailed { failures });
        }
        Ok(plans)
    }

    async fn target_commit(&self) -> Result<String, ReleaseError> {
        if let Some(sha) = &self.commit_sha {
            return Ok(sha.clone());
        }
        if self.dry_run {
            return Ok(DRY_RUN_COMMIT.to_string());
        }

        let sha = self
            .host
            .head_commit_sha()
            .await
            .map_err(|source| ReleaseError::VcsOperationFailed {
                operation: "resolve commit",
                target: "HEAD".to_string(),
                source,
            })?;
        info!("Tagging HEAD commit {}", sha);
        Ok(sha)
    }

    async fn release_language(
        &self,
        plan: &PlannedRelease,
        commit_sha: &str,
    ) -> Result<ReleaseRecord, ReleaseError> {
        let record = self
            .orchestrator
            .release(plan.language, &plan.next, commit_sha)
            .await?;
        self.generator
            .generate(plan.language, &plan.next, self.dry_run)
            .await?;
        Ok(record)
    }
}
