use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EchoError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("{0}")]
    Other(String),
}

impl EchoError {
    /// Transport failures and unexpected statuses may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EchoError::Network(_) | EchoError::Timeout(_) | EchoError::Http { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EchoError::NotFound(_))
    }
}

impl From<serde_json::Error> for EchoError {
    fn from(e: serde_json::Error) -> Self {
        EchoError::Serialization(e.to_string())
    }
}
