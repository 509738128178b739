//! Latest-version resolution with bounded retries and ordered endpoint fallback

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::{
    DEFAULT_FETCH_ATTEMPTS, DEFAULT_FETCH_BACKOFF_MS, DEFAULT_FETCH_TIMEOUT_MS,
    MAX_RETRY_AFTER_SECS,
};
use crate::version::endpoint::Endpoint;
use crate::version::error::{EndpointFailure, RegistryError, RegistryUnavailable};
use crate::version::semver::ReleaseVersion;
use crate::version::types::Language;

/// Retry and timeout settings applied to every endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Attempts per endpoint, including the first one
    pub max_attempts: u32,
    /// Base delay; attempt `n` waits `backoff * n` before attempt `n + 1`
    pub backoff: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_FETCH_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_FETCH_BACKOFF_MS),
            timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
        }
    }
}

/// Errors that know whether (and after how long) an operation is worth retrying
pub trait Retryable {
    /// Delay before the next attempt, or `None` when retrying cannot help
    fn retry_delay(&self, attempt: u32, backoff: Duration) -> Option<Duration>;
}

impl Retryable for RegistryError {
    fn retry_delay(&self, attempt: u32, backoff: Duration) -> Option<Duration> {
        match self {
            _ if !self.is_transient() => None,
            RegistryError::RateLimited {
                retry_after_secs: Some(secs),
            } => Some(Duration::from_secs((*secs).min(MAX_RETRY_AFTER_SECS))),
            _ => Some(backoff * attempt),
        }
    }
}

/// Run `op` up to `policy.max_attempts` times.
///
/// `op` receives the 1-based attempt number. Returns the first success, or every error
/// in attempt order once attempts run out or an error reports it is not retryable.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: &FetchPolicy, mut op: F) -> Result<T, Vec<E>>
where
    E: Retryable,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut errors = Vec::new();

    for attempt in 1..=policy.max_attempts.max(1) {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => {
                let delay = error.retry_delay(attempt, policy.backoff);
                errors.push(error);

                match delay {
                    Some(delay) if attempt < policy.max_attempts => sleep(delay).await,
                    _ => break,
                }
            }
        }
    }

    Err(errors)
}

/// Resolves the latest published version of each language's package
pub struct VersionFetcher {
    endpoints: IndexMap<Language, Vec<Arc<dyn Endpoint>>>,
    policy: FetchPolicy,
}

impl VersionFetcher {
    pub fn new(policy: FetchPolicy) -> Self {
        Self {
            endpoints: IndexMap::new(),
            policy,
        }
    }

    /// Register the ordered endpoints for a language, replacing any previous list
    pub fn with_endpoints(mut self, language: Language, endpoints: Vec<Arc<dyn Endpoint>>) -> Self {
        self.endpoints.insert(language, endpoints);
        self
    }

    /// Ask each endpoint in order until one yields a well-formed version.
    ///
    /// Later endpoints are never contacted once an earlier one succeeds.
    pub async fn fetch_latest_version(
        &self,
        language: Language,
    ) -> Result<ReleaseVersion, RegistryUnavailable> {
        let mut failures = Vec::new();
        let endpoints = self.endpoints.get(&language).map(Vec::as_slice).unwrap_or(&[]);

        for endpoint in endpoints {
            let name = endpoint.name();

            let result = retry_with_backoff(&self.policy, |attempt| {
                let endpoint = Arc::clone(endpoint);
                let name = name.clone();
                let request_timeout = self.policy.timeout;
                async move {
                    debug!("{}: attempt {} via {}", language, attempt, name);
                    let candidate = match timeout(request_timeout, endpoint.fetch_candidate()).await
                    {
                        Ok(result) => result?,
                        Err(_) => {
                            return Err(RegistryError::Timeout(
                                request_timeout.as_millis() as u64,
                            ));
                        }
                    };
                    ReleaseVersion::parse(&candidate)
                        .ok_or_else(|| RegistryError::InvalidVersion(candidate))
                }
            })
            .await;

            match result {
                Ok(version) => {
                    info!("{}: latest published version is {} ({})", language, version, name);
                    return Ok(version);
                }
                Err(errors) => {
                    warn!(
                        "{}: endpoint {} failed after {} attempt(s)",
                        language,
                        name,
                        errors.len()
                    );
                    failures.extend(errors.into_iter().enumerate().map(|(i, error)| {
                        EndpointFailure {
                            endpoint: name.clone(),
                            attempt: i as u32 + 1,
                            error,
                        }
                    }));
                }
            }
        }

        Err(RegistryUnavailable { language, failures })
    }
}
