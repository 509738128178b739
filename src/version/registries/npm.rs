//! npm registry endpoints for the TypeScript SDK

use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::version::endpoint::{Endpoint, HttpEndpoint, json_string_at};
use crate::version::error::RegistryError;

/// Default base URL for npm registry
const DEFAULT_BASE_URL: &str = "https://registry.npmjs.org";
const DEFAULT_PACKAGE: &str = "cohere-ai";

/// dist-tags document first, then the full packument
pub fn endpoints(client: &reqwest::Client, config: &RegistryConfig) -> Vec<Arc<dyn Endpoint>> {
    let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let fallback_url = config.fallback_base_url.as_deref().unwrap_or(base_url);
    let encoded_name = encode_package_name(config.package.as_deref().unwrap_or(DEFAULT_PACKAGE));

    vec![
        Arc::new(
            HttpEndpoint::new(
                client.clone(),
                "npm-dist-tags",
                format!("{}/-/package/{}/dist-tags", base_url, encoded_name),
                extract_dist_tags,
            )
            .with_api_key(config.api_key.clone()),
        ),
        Arc::new(
            HttpEndpoint::new(
                client.clone(),
                "npm-packument",
                format!("{}/{}", fallback_url, encoded_name),
                extract_packument,
            )
            .with_api_key(config.api_key.clone()),
        ),
    ]
}

fn extract_dist_tags(body: &str) -> Result<String, RegistryError> {
    json_string_at(body, "/latest")
}

fn extract_packument(body: &str) -> Result<String, RegistryError> {
    json_string_at(body, "/dist-tags/latest")
}

/// Encode package name for URL (handles scoped packages)
fn encode_package_name(package_name: &str) -> String {
    if package_name.starts_with('@') {
        // Scoped package: @scope/name -> @scope%2Fname
        package_name.replace('/', "%2F")
    } else {
        package_name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn config_for(server: &Server, package: Option<&str>) -> RegistryConfig {
        RegistryConfig {
            base_url: Some(server.url()),
            package: package.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn dist_tags_endpoint_returns_latest_tag() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/-/package/cohere-ai/dist-tags")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"latest": "7.14.0", "beta": "7.15.0-beta.1"}"#)
            .create_async()
            .await;

        let endpoints = endpoints(&reqwest::Client::new(), &config_for(&server, None));
        let result = endpoints[0].fetch_candidate().await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, "7.14.0");
    }

    #[tokio::test]
    async fn packument_endpoint_reads_nested_dist_tag() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/cohere-ai")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "name": "cohere-ai",
                    "dist-tags": {"latest": "7.13.2"},
                    "versions": {"7.13.1": {}, "7.13.2": {}}
                }"#,
            )
            .create_async()
            .await;

        let endpoints = endpoints(&reqwest::Client::new(), &config_for(&server, None));
        let result = endpoints[1].fetch_candidate().await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, "7.13.2");
    }

    #[tokio::test]
    async fn handles_scoped_package() {
        let mut server = Server::new_async().await;

        // Scoped packages use URL encoding: @types/node -> @types%2Fnode
        let mock = server
            .mock("GET", "/-/package/@types%2Fnode/dist-tags")
            .with_status(200)
            .with_body(r#"{"latest": "20.0.0"}"#)
            .create_async()
            .await;

        let endpoints = endpoints(
            &reqwest::Client::new(),
            &config_for(&server, Some("@types/node")),
        );
        let result = endpoints[0].fetch_candidate().await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, "20.0.0");
    }

    #[test]
    fn missing_latest_tag_is_invalid() {
        let result = extract_dist_tags(r#"{"next": "8.0.0"}"#);
        assert!(matches!(result, Err(RegistryError::InvalidResponse(_))));
    }
}
