use crate::retry_policy::Retryable;
use thiserror::Error;

/// Errors from the recommendation and lookup services.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl ServiceError {
    /// Transient failures are worth another attempt, malformed or missing data is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Connection(_) | ServiceError::Timeout => true,
            ServiceError::Status { status, .. } => *status == 429 || *status >= 500,
            ServiceError::InvalidResponse(_) | ServiceError::NotFound(_) => false,
        }
    }
}

impl Retryable for ServiceError {
    fn is_retryable(&self) -> bool {
        ServiceError::is_retryable(self)
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout
        } else if err.is_decode() {
            ServiceError::InvalidResponse(err.to_string())
        } else {
            ServiceError::Connection(err.to_string())
        }
    }
}

/// Maps a non-success response to a [`ServiceError`], consuming the body for the message.
pub(super) async fn error_for_status(response: reqwest::Response, what: &str) -> ServiceError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    if status == 404 {
        ServiceError::NotFound(what.to_string())
    } else {
        ServiceError::Status { status, message }
    }
}
