//! PyPI endpoints for the Python SDK

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::RegistryConfig;
use crate::version::endpoint::{Endpoint, HttpEndpoint, json_string_at};
use crate::version::error::RegistryError;
use crate::version::semver::latest_of;

const DEFAULT_PYPI_REGISTRY: &str = "https://pypi.org";
const DEFAULT_PACKAGE: &str = "cohere";

/// File names in the simple index embed the version, e.g. `cohere-5.11.4-py3-none-any.whl`
static SIMPLE_INDEX_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v?(\d+\.\d+\.\d+)").expect("simple index pattern is valid"));

/// JSON API first, then the simple index which is served from a different cache tier
pub fn endpoints(client: &reqwest::Client, config: &RegistryConfig) -> Vec<Arc<dyn Endpoint>> {
    let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_PYPI_REGISTRY);
    let fallback_url = config.fallback_base_url.as_deref().unwrap_or(base_url);
    let package = config.package.as_deref().unwrap_or(DEFAULT_PACKAGE);

    vec![
        Arc::new(
            HttpEndpoint::new(
                client.clone(),
                "pypi-json",
                format!("{}/pypi/{}/json", base_url, package),
                extract_json_api,
            )
            .with_api_key(config.api_key.clone()),
        ),
        Arc::new(
            HttpEndpoint::new(
                client.clone(),
                "pypi-simple",
                format!("{}/simple/{}/", fallback_url, package),
                extract_simple_index,
            )
            .with_api_key(config.api_key.clone()),
        ),
    ]
}

fn extract_json_api(body: &str) -> Result<String, RegistryError> {
    json_string_at(body, "/info/version")
}

fn extract_simple_index(body: &str) -> Result<String, RegistryError> {
    let candidates = SIMPLE_INDEX_VERSION
        .captures_iter(body)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str());

    latest_of(candidates)
        .map(|v| v.to_string())
        .ok_or_else(|| RegistryError::InvalidResponse("no versions in simple index".to_string()))
}
