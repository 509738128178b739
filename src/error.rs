use thiserror::Error;

use crate::config::ConfigError;
use crate::release::error::HostError;
use crate::version::error::RegistryUnavailable;
use crate::version::types::Language;

/// Failures surfaced by a release run
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// Bad parameter combination; nothing was attempted
    #[error("Invalid invocation: {0}")]
    InvalidInvocation(String),

    #[error(transparent)]
    RegistryUnavailable(#[from] RegistryUnavailable),

    /// At least one language's next version could not be computed in bump mode
    #[error("Version resolution failed for {}: {}", languages(.failures), details(.failures))]
    VersionResolutionFailed { failures: Vec<RegistryUnavailable> },

    #[error("GitHub operation '{operation}' failed for {target}: {source}")]
    VcsOperationFailed {
        operation: &'static str,
        target: String,
        source: HostError,
    },

    #[error("Generator failed for {language}@{version} ({status}): {}", .stderr.trim())]
    GenerationFailed {
        language: Language,
        version: String,
        status: String,
        stdout: String,
        stderr: String,
    },

    /// Several language pipelines failed during the release stage
    #[error("{} language pipelines failed: {}", .failures.len(), pipeline_details(.failures))]
    PipelinesFailed {
        failures: Vec<(Language, ReleaseError)>,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn languages(failures: &[RegistryUnavailable]) -> String {
    failures
        .iter()
        .map(|f| f.language.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn details(failures: &[RegistryUnavailable]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}

fn pipeline_details(failures: &[(Language, ReleaseError)]) -> String {
    failures
        .iter()
        .map(|(language, error)| format!("{language}: {error}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_resolution_failed_names_each_language() {
        let error = ReleaseError::VersionResolutionFailed {
            failures: vec![
                RegistryUnavailable {
                    language: Language::Go,
                    failures: vec![],
                },
                RegistryUnavailable {
                    language: Language::Java,
                    failures: vec![],
                },
            ],
        };

        assert!(
            error
                .to_string()
                .starts_with("Version resolution failed for go, java: ")
        );
    }

    #[test]
    fn generation_failed_surfaces_stderr() {
        let error = ReleaseError::GenerationFailed {
            language: Language::Python,
            version: "1.2.4".to_string(),
            status: "exit status: 2".to_string(),
            stdout: String::new(),
            stderr: "group python not found\n".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Generator failed for python@1.2.4 (exit status: 2): group python not found"
        );
    }

    #[test]
    fn pipelines_failed_lists_languages() {
        let error = ReleaseError::PipelinesFailed {
            failures: vec![
                (
                    Language::Python,
                    ReleaseError::InvalidInvocation("a".to_string()),
                ),
                (Language::Go, ReleaseError::InvalidInvocation("b".to_string())),
            ],
        };

        assert_eq!(
            error.to_string(),
            "2 language pipelines failed: python: Invalid invocation: a | go: Invalid invocation: b"
        );
    }
}
