//! Registry endpoints: a URL paired with the rule that extracts a version from its body

#[cfg(test)]
use mockall::automock;

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::version::error::RegistryError;

/// Turns a response body into a candidate version string
pub type Extractor = fn(&str) -> Result<String, RegistryError>;

/// A single source able to report the latest published version of one package
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Endpoint: Send + Sync {
    /// Short name used in logs and failure reports (e.g. "npm-dist-tags")
    fn name(&self) -> String;

    /// Fetches the raw candidate version. Validation is left to the caller.
    async fn fetch_candidate(&self) -> Result<String, RegistryError>;
}

/// Endpoint backed by a plain HTTP GET
pub struct HttpEndpoint {
    name: String,
    url: String,
    client: reqwest::Client,
    api_key: Option<String>,
    extractor: Extractor,
}

impl HttpEndpoint {
    pub fn new(
        client: reqwest::Client,
        name: impl Into<String>,
        url: impl Into<String>,
        extractor: Extractor,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            client,
            api_key: None,
            extractor,
        }
    }

    /// Sends the key as a bearer token on every request
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }
}

#[async_trait::async_trait]
impl Endpoint for HttpEndpoint {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn fetch_candidate(&self) -> Result<String, RegistryError> {
        debug!("Fetching {}: {}", self.name, self.url);

        let mut request = self.client.get(&self.url);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }
        let response = request.send().await?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(RegistryError::NotFound(self.url.clone()));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(RegistryError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("{} returned status {}: {}", self.name, status, self.url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let body = response.text().await.map_err(|e| {
            warn!("Failed to read {} response: {}", self.name, e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        (self.extractor)(&body)
    }
}

/// Parses a JSON body and reads the string at `pointer` (RFC 6901)
pub fn json_string_at(body: &str, pointer: &str) -> Result<String, RegistryError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| RegistryError::InvalidResponse(e.to_string()))?;

    value
        .pointer(pointer)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| RegistryError::InvalidResponse(format!("missing string at {pointer}")))
}
