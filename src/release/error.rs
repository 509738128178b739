use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl HostError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, HostError::Api { status: 404, .. })
    }
}
