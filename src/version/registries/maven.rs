//! Maven Central endpoints for the Java SDK
//!
//! The search API is frequently slow or stale, so the repository's
//! `maven-metadata.xml` is kept as a fallback.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::config::RegistryConfig;
use crate::version::endpoint::{Endpoint, HttpEndpoint, json_string_at};
use crate::version::error::RegistryError;

const DEFAULT_SEARCH_URL: &str = "https://search.maven.org";
const DEFAULT_REPOSITORY_URL: &str = "https://repo1.maven.org/maven2";
const DEFAULT_COORDINATES: &str = "com.cohere:cohere-java";

static METADATA_RELEASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(release|latest)>\s*([^<\s]+)\s*</(?:release|latest)>")
        .expect("metadata pattern is valid")
});

/// Search API first, then repository metadata.
///
/// Coordinates must be `group:artifact`; anything else yields no endpoints.
pub fn endpoints(client: &reqwest::Client, config: &RegistryConfig) -> Vec<Arc<dyn Endpoint>> {
    let coordinates = config.package.as_deref().unwrap_or(DEFAULT_COORDINATES);
    let Some((group, artifact)) = split_coordinates(coordinates) else {
        warn!("Invalid Maven coordinates {:?}; expected group:artifact", coordinates);
        return Vec::new();
    };

    let search_url = config.base_url.as_deref().unwrap_or(DEFAULT_SEARCH_URL);
    let repository_url = config
        .fallback_base_url
        .as_deref()
        .or(config.base_url.as_deref())
        .unwrap_or(DEFAULT_REPOSITORY_URL);

    vec![
        Arc::new(
            HttpEndpoint::new(
                client.clone(),
                "maven-search",
                format!(
                    "{}/solrsearch/select?q=g:{}+AND+a:{}&rows=1&wt=json",
                    search_url, group, artifact
                ),
                extract_search_response,
            )
            .with_api_key(config.api_key.clone()),
        ),
        Arc::new(
            HttpEndpoint::new(
                client.clone(),
                "maven-metadata",
                format!(
                    "{}/{}/{}/maven-metadata.xml",
                    repository_url,
                    group.replace('.', "/"),
                    artifact
                ),
                extract_metadata,
            )
            .with_api_key(config.api_key.clone()),
        ),
    ]
}

fn split_coordinates(coordinates: &str) -> Option<(&str, &str)> {
    let (group, artifact) = coordinates.trim().split_once(':')?;
    if group.is_empty() || artifact.is_empty() || artifact.contains(':') {
        return None;
    }
    Some((group, artifact))
}

fn extract_search_response(body: &str) -> Result<String, RegistryError> {
    json_string_at(body, "/response/docs/0/latestVersion")
}

/// Prefers `<release>` over `<latest>`, which may point at a snapshot
fn extract_metadata(body: &str) -> Result<String, RegistryError> {
    let mut latest = None;

    for captures in METADATA_RELEASE.captures_iter(body) {
        let value = captures[2].to_string();
        if &captures[1] == "release" {
            return Ok(value);
        }
        latest.get_or_insert(value);
    }

    latest.ok_or_else(|| RegistryError::InvalidResponse("no <release> in metadata".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn config_for(server: &Server) -> RegistryConfig {
        RegistryConfig {
            base_url: Some(server.url()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn search_endpoint_reads_latest_version() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/solrsearch/select")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("rows".to_string(), "1".to_string()),
                Matcher::UrlEncoded("wt".to_string(), "json".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"response": {"numFound": 1, "docs": [
                    {"g": "com.cohere", "a": "cohere-java", "latestVersion": "1.4.1"}
                ]}}"#,
            )
            .create_async()
            .await;

        let endpoints = endpoints(&reqwest::Client::new(), &config_for(&server));
        let result = endpoints[0].fetch_candidate().await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, "1.4.1");
    }

    #[tokio::test]
    async fn search_endpoint_without_docs_is_invalid() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/solrsearch/select")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"response": {"numFound": 0, "docs": []}}"#)
            .create_async()
            .await;

        let endpoints = endpoints(&reqwest::Client::new(), &config_for(&server));
        let result = endpoints[0].fetch_candidate().await;

        assert!(matches!(result, Err(RegistryError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn metadata_endpoint_reads_release_element() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/com/cohere/cohere-java/maven-metadata.xml")
            .with_status(200)
            .with_header("content-type", "text/xml")
            .with_body(
                r#"<?xml version="1.0" encoding="UTF-8"?>
                <metadata>
                  <groupId>com.cohere</groupId>
                  <artifactId>cohere-java</artifactId>
                  <versioning>
                    <latest>1.5.0-SNAPSHOT</latest>
                    <release>1.4.1</release>
                    <versions><version>1.4.0</version><version>1.4.1</version></versions>
                  </versioning>
                </metadata>"#,
            )
            .create_async()
            .await;

        let endpoints = endpoints(&reqwest::Client::new(), &config_for(&server));
        let result = endpoints[1].fetch_candidate().await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, "1.4.1");
    }

    #[test]
    fn metadata_falls_back_to_latest_element() {
        let body = "<versioning><latest>2.0.0</latest></versioning>";
        assert_eq!(extract_metadata(body).unwrap(), "2.0.0");
    }

    #[test]
    fn metadata_without_versions_is_invalid() {
        let result = extract_metadata("<metadata/>");
        assert!(matches!(result, Err(RegistryError::InvalidResponse(_))));
    }

    #[test]
    fn invalid_coordinates_yield_no_endpoints() {
        let config = RegistryConfig {
            package: Some("cohere-java".to_string()),
            ..Default::default()
        };

        assert!(endpoints(&reqwest::Client::new(), &config).is_empty());
    }

    #[test]
    fn split_coordinates_requires_group_and_artifact() {
        assert_eq!(
            split_coordinates("com.cohere:cohere-java"),
            Some(("com.cohere", "cohere-java"))
        );
        assert_eq!(split_coordinates(":cohere-java"), None);
        assert_eq!(split_coordinates("a:b:c"), None);
    }
}
