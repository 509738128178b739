//! Registry endpoint sets, one module per language ecosystem

pub mod go_proxy;
pub mod maven;
pub mod npm;
pub mod pypi;

use std::sync::Arc;

use crate::config::{AutoreleaseConfig, RegistriesConfig, USER_AGENT};
use crate::version::endpoint::Endpoint;
use crate::version::fetcher::VersionFetcher;
use crate::version::types::Language;

/// Shared HTTP client for registry lookups; timeouts are applied per request by the fetcher
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}

/// Ordered endpoints (primary first) for one language
pub fn endpoints_for(
    language: Language,
    client: &reqwest::Client,
    registries: &RegistriesConfig,
) -> Vec<Arc<dyn Endpoint>> {
    let config = registries.for_language(language);
    match language {
        Language::Python => pypi::endpoints(client, config),
        Language::TypeScript => npm::endpoints(client, config),
        Language::Go => go_proxy::endpoints(client, config),
        Language::Java => maven::endpoints(client, config),
    }
}

/// Build a fetcher wired to every language's registries
pub fn build_fetcher(config: &AutoreleaseConfig) -> Result<VersionFetcher, reqwest::Error> {
    let client = http_client()?;

    Ok(Language::ALL
        .into_iter()
        .fold(VersionFetcher::new(config.fetch.policy()), |fetcher, language| {
            fetcher.with_endpoints(
                language,
                endpoints_for(language, &client, &config.registries),
            )
        }))
}
