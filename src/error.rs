use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Upstream Transport Errors
    #[error("HTTP transport error for {source_id}: {message}")]
    Transport {
        source_id: String,
        message: String,
    },

    #[error("Upstream {source_id} returned status {status}")]
    UpstreamStatus {
        source_id: String,
        status: u16,
    },

    // Response Shape Errors
    #[error("Response deserialization failed: {0}")]
    DeserializationError(String),

    #[error("Malformed response from {source_id}: {details}")]
    MalformedResponse {
        source_id: String,
        details: String,
    },

    #[error("GraphQL query failed: {0}")]
    GraphQlError(String),

    // Downstream Errors
    #[error("Balance provider error: {0}")]
    BalanceProviderError(String),

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn malformed(source_id: &str, details: impl Into<String>) -> Self {
        Error::MalformedResponse {
            source_id: source_id.to_string(),
            details: details.into(),
        }
    }

    /// True for failures of the network path rather than of the payload.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::UpstreamStatus { .. })
    }
}
