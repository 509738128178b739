//! Shared fixtures for end-to-end release tests

#![allow(dead_code)]

mod generator;

pub use generator::RecordingGenerator;

use autorelease::config::{
    AutoreleaseConfig, FetchConfig, GitHubSettings, RegistriesConfig, RegistryConfig,
};

/// Config pointing every registry at `registry_url`, with a single fast attempt per endpoint
pub fn config_for(registry_url: &str) -> AutoreleaseConfig {
    let registry = RegistryConfig {
        base_url: Some(registry_url.to_string()),
        ..Default::default()
    };

    AutoreleaseConfig {
        fetch: FetchConfig {
            max_attempts: 1,
            backoff_ms: 0,
            timeout_ms: 2_000,
        },
        registries: RegistriesConfig {
            pypi: registry.clone(),
            npm: registry.clone(),
            go_proxy: registry.clone(),
            maven: registry,
        },
        ..Default::default()
    }
}

pub fn github_settings(api_url: &str) -> GitHubSettings {
    GitHubSettings {
        api_url: api_url.to_string(),
        token: Some("test-token".to_string()),
        owner: "cohere-ai".to_string(),
        repo: "sdks".to_string(),
        commit_sha: Some("abc123".to_string()),
    }
}
