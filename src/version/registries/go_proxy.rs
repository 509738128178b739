//! Go proxy endpoints for the Go SDK

use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::version::endpoint::{Endpoint, HttpEndpoint, json_string_at};
use crate::version::error::RegistryError;
use crate::version::semver::latest_of;

/// Default base URL for Go proxy
const DEFAULT_BASE_URL: &str = "https://proxy.golang.org";
const DEFAULT_MODULE: &str = "github.com/cohere-ai/cohere-go/v2";

/// `@latest` first, then the plain `@v/list` listing
pub fn endpoints(client: &reqwest::Client, config: &RegistryConfig) -> Vec<Arc<dyn Endpoint>> {
    let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let fallback_url = config.fallback_base_url.as_deref().unwrap_or(base_url);
    let module = encode_module_path(config.package.as_deref().unwrap_or(DEFAULT_MODULE));

    vec![
        Arc::new(
            HttpEndpoint::new(
                client.clone(),
                "go-proxy-latest",
                format!("{}/{}/@latest", base_url, module),
                extract_latest_info,
            )
            .with_api_key(config.api_key.clone()),
        ),
        Arc::new(
            HttpEndpoint::new(
                client.clone(),
                "go-proxy-list",
                format!("{}/{}/@v/list", fallback_url, module),
                extract_version_list,
            )
            .with_api_key(config.api_key.clone()),
        ),
    ]
}

fn extract_latest_info(body: &str) -> Result<String, RegistryError> {
    json_string_at(body, "/Version")
}

/// Go proxy returns versions one per line
fn extract_version_list(body: &str) -> Result<String, RegistryError> {
    latest_of(body.lines().map(str::trim).filter(|line| !line.is_empty()))
        .map(|v| v.to_string())
        .ok_or_else(|| RegistryError::InvalidResponse("empty version list".to_string()))
}

/// Encodes a Go module path for use in proxy URLs.
/// Uppercase letters are escaped as !{lowercase}.
fn encode_module_path(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            result.push('!');
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn config_for(server: &Server, module: Option<&str>) -> RegistryConfig {
        RegistryConfig {
            base_url: Some(server.url()),
            package: module.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn latest_endpoint_returns_version_field() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/github.com/cohere-ai/cohere-go/v2/@latest")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"Version": "v2.12.0", "Time": "2024-10-01T00:00:00Z"}"#)
            .create_async()
            .await;

        let endpoints = endpoints(&reqwest::Client::new(), &config_for(&server, None));
        let result = endpoints[0].fetch_candidate().await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, "v2.12.0");
    }

    #[tokio::test]
    async fn list_endpoint_returns_highest_version() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/golang.org/x/text/@v/list")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("v0.14.0\nv0.9.0\nv0.13.0\n\n")
            .create_async()
            .await;

        let endpoints = endpoints(
            &reqwest::Client::new(),
            &config_for(&server, Some("golang.org/x/text")),
        );
        let result = endpoints[1].fetch_candidate().await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, "0.14.0");
    }

    #[tokio::test]
    async fn gone_module_is_not_found() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/deprecated/module/@latest")
            .with_status(410)
            .with_body("gone")
            .create_async()
            .await;

        let endpoints = endpoints(
            &reqwest::Client::new(),
            &config_for(&server, Some("deprecated/module")),
        );
        let result = endpoints[0].fetch_candidate().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(RegistryError::NotFound(_))));
    }

    #[tokio::test]
    async fn handles_uppercase_module_path() {
        let mut server = Server::new_async().await;

        // Go proxy encodes uppercase as !{lowercase}
        let mock = server
            .mock("GET", "/github.com/!azure/azure-sdk-for-go/@latest")
            .with_status(200)
            .with_body(r#"{"Version": "v1.0.0"}"#)
            .create_async()
            .await;

        let endpoints = endpoints(
            &reqwest::Client::new(),
            &config_for(&server, Some("github.com/Azure/azure-sdk-for-go")),
        );
        let result = endpoints[0].fetch_candidate().await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, "v1.0.0");
    }

    #[test]
    fn empty_version_list_is_invalid() {
        let result = extract_version_list("\n");
        assert!(matches!(result, Err(RegistryError::InvalidResponse(_))));
    }

    #[test]
    fn encode_module_path_escapes_uppercase_letters() {
        assert_eq!(encode_module_path("github.com/Azure"), "github.com/!azure");
        assert_eq!(
            encode_module_path("github.com/Azure/AzureSDK"),
            "github.com/!azure/!azure!s!d!k"
        );
        assert_eq!(encode_module_path("golang.org/x/text"), "golang.org/x/text");
    }
}
