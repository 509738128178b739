use std::fmt;

use thiserror::Error;

use crate::version::types::Language;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid version: {0:?}")]
    InvalidVersion(String),
}

impl RegistryError {
    /// Whether another attempt against the same endpoint may succeed
    pub fn is_transient(&self) -> bool {
        !matches!(self, RegistryError::NotFound(_))
    }
}

/// One failed attempt against one endpoint
#[derive(Debug)]
pub struct EndpointFailure {
    pub endpoint: String,
    pub attempt: u32,
    pub error: RegistryError,
}

impl fmt::Display for EndpointFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (attempt {}): {}",
            self.endpoint, self.attempt, self.error
        )
    }
}

/// Every endpoint configured for a language was exhausted
#[derive(Debug, Error)]
#[error("No registry could resolve the latest {language} version: {}", summarize(.failures))]
pub struct RegistryUnavailable {
    pub language: Language,
    pub failures: Vec<EndpointFailure>,
}

fn summarize(failures: &[EndpointFailure]) -> String {
    if failures.is_empty() {
        return "no endpoints configured".to_string();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_unavailable_lists_every_failure() {
        let error = RegistryUnavailable {
            language: Language::Java,
            failures: vec![
                EndpointFailure {
                    endpoint: "maven-search".to_string(),
                    attempt: 1,
                    error: RegistryError::Timeout(10_000),
                },
                EndpointFailure {
                    endpoint: "maven-metadata".to_string(),
                    attempt: 1,
                    error: RegistryError::NotFound("com.cohere:cohere-java".to_string()),
                },
            ],
        };

        assert_eq!(
            error.to_string(),
            "No registry could resolve the latest java version: \
             maven-search (attempt 1): Request timed out after 10000 ms; \
             maven-metadata (attempt 1): Package not found: com.cohere:cohere-java"
        );
    }

    #[test]
    fn registry_unavailable_without_endpoints() {
        let error = RegistryUnavailable {
            language: Language::Go,
            failures: vec![],
        };

        assert!(error.to_string().ends_with("no endpoints configured"));
    }

    #[test]
    fn only_not_found_is_permanent() {
        assert!(!RegistryError::NotFound("x".to_string()).is_transient());
        assert!(RegistryError::Timeout(1).is_transient());
        assert!(RegistryError::InvalidVersion(String::new()).is_transient());
    }
}
