use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::error::ReleaseError;
use crate::version::fetcher::FetchPolicy;
use crate::version::semver::ReleaseVersion;
use crate::version::types::{BumpType, Language, LanguageSelection};

// =============================================================================
// Registry fetch constants
// =============================================================================

/// Attempts per registry endpoint before falling back to the next one
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 3;

/// Base backoff between attempts in milliseconds; grows linearly per attempt
pub const DEFAULT_FETCH_BACKOFF_MS: u64 = 1_000;

/// Timeout for a single registry request in milliseconds (10 seconds)
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Upper bound on a server-provided `retry-after`
pub const MAX_RETRY_AFTER_SECS: u64 = 30;

// =============================================================================
// Hosting platform constants
// =============================================================================

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Page size used when listing releases
pub const RELEASES_PER_PAGE: usize = 100;

/// Upper bound for `prune`, so a typo cannot wipe the release history
pub const MAX_PRUNE_COUNT: usize = 4;

pub const USER_AGENT: &str = "autorelease";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Optional JSON configuration file
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoreleaseConfig {
    pub fetch: FetchConfig,
    pub registries: RegistriesConfig,
    pub generator: GeneratorConfig,
}

impl AutoreleaseConfig {
    /// Load the config file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Retry and timeout settings for registry lookups
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FetchConfig {
    pub max_attempts: u32,
    pub backoff_ms: u64,
    pub timeout_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_FETCH_ATTEMPTS,
            backoff_ms: DEFAULT_FETCH_BACKOFF_MS,
            timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
        }
    }
}

impl FetchConfig {
    pub fn policy(&self) -> FetchPolicy {
        FetchPolicy {
            max_attempts: self.max_attempts.max(1),
            backoff: Duration::from_millis(self.backoff_ms),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

/// Per-language registry overrides
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RegistriesConfig {
    pub pypi: RegistryConfig,
    pub npm: RegistryConfig,
    #[serde(rename = "goProxy")]
    pub go_proxy: RegistryConfig,
    pub maven: RegistryConfig,
}

impl RegistriesConfig {
    pub fn for_language(&self, language: Language) -> &RegistryConfig {
        match language {
            Language::Python => &self.pypi,
            Language::TypeScript => &self.npm,
            Language::Go => &self.go_proxy,
            Language::Java => &self.maven,
        }
    }
}

/// Individual registry override; unset fields fall back to the public registry
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Base URL of the primary endpoint
    pub base_url: Option<String>,
    /// Base URL of the fallback endpoint; defaults to `base_url` when that is set
    pub fallback_base_url: Option<String>,
    /// Package, module or `group:artifact` coordinates
    pub package: Option<String>,
    /// Sent as a bearer token
    pub api_key: Option<String>,
}

/// External code generator invocation
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    pub command: String,
    pub args: Vec<String>,
    pub log_level: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: "fern".to_string(),
            args: vec!["generate".to_string()],
            log_level: "info".to_string(),
        }
    }
}

/// Coordinates and credentials for the hosting platform
#[derive(Debug, Clone, PartialEq)]
pub struct GitHubSettings {
    pub api_url: String,
    pub token: Option<String>,
    pub owner: String,
    pub repo: String,
    /// Commit new tags point at; `None` means the repository HEAD
    pub commit_sha: Option<String>,
}

impl GitHubSettings {
    /// Real runs need a token and a repository; dry runs never talk to the host
    pub fn validate(&self, dry_run: bool) -> Result<(), ReleaseError> {
        if dry_run {
            return Ok(());
        }

        let mut missing = Vec::new();
        if self.token.as_deref().is_none_or(str::is_empty) {
            missing.push("GITHUB_TOKEN");
        }
        if self.owner.is_empty() {
            missing.push("GITHUB_OWNER");
        }
        if self.repo.is_empty() {
            missing.push("GITHUB_REPO");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ReleaseError::InvalidInvocation(format!(
                "missing required settings: {}",
                missing.join(", ")
            )))
        }
    }
}

/// What one invocation should do, validated once at startup
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    /// Release a caller-supplied version of exactly one language
    ExplicitVersion {
        language: Language,
        version: ReleaseVersion,
    },
    /// Resolve the latest published version and bump it for each selected language
    Bump {
        bump: BumpType,
        selection: LanguageSelection,
    },
}

impl RunMode {
    /// Build the run mode from raw parameters.
    ///
    /// A supplied version takes precedence over a bump type. Anything that is neither
    /// an explicit-version nor a bump invocation is rejected as `InvalidInvocation`.
    pub fn from_params(
        bump: Option<BumpType>,
        language: Option<LanguageSelection>,
        version: Option<&str>,
    ) -> Result<Self, ReleaseError> {
        let version = version.map(str::trim).filter(|v| !v.is_empty());

        if let Some(raw) = version {
            let language = match language {
                Some(LanguageSelection::One(language)) => language,
                Some(LanguageSelection::All) => {
                    return Err(ReleaseError::InvalidInvocation(
                        "VERSION requires a single LANGUAGE, not \"all\"".to_string(),
                    ));
                }
                None => {
                    return Err(ReleaseError::InvalidInvocation(
                        "VERSION requires LANGUAGE to be set".to_string(),
                    ));
                }
            };

            let version = ReleaseVersion::parse(raw).ok_or_else(|| {
                ReleaseError::InvalidInvocation(format!(
                    "VERSION {raw:?} does not match MAJOR.MINOR.PATCH[-SUFFIX]"
                ))
            })?;

            if let Some(bump) = bump {
                warn!("Ignoring BUMP_TYPE={} because VERSION is set", bump);
            }

            return Ok(RunMode::ExplicitVersion { language, version });
        }

        match bump {
            Some(bump) => Ok(RunMode::Bump {
                bump,
                selection: language.unwrap_or(LanguageSelection::All),
            }),
            None => Err(ReleaseError::InvalidInvocation(
                "either VERSION or BUMP_TYPE must be set".to_string(),
            )),
        }
    }

    pub fn languages(&self) -> Vec<Language> {
        match self {
            RunMode::ExplicitVersion { language, .. } => vec![*language],
            RunMode::Bump { selection, .. } => selection.languages(),
        }
    }
}
