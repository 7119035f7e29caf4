use thiserror::Error;

/// Failures talking to an external data source.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The API key environment variable is unset.
    #[error("{service} API key is missing; set {env}")]
    MissingApiKey { service: &'static str, env: String },
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("request failed: {0}")]
    Transport(String),
    /// Non-success HTTP status with a preview of the body.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The provider answered but reported an error in its payload.
    #[error("provider error: {0}")]
    Api(String),
    #[error("invalid response: {0}")]
    Decode(String),
    /// The provider has no data for the requested item.
    #[error("no data found for {0}")]
    NotFound(String),
}

impl SourceError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SourceError::Timeout(_))
    }
}
