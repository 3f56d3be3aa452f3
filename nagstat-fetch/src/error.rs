//! Transport error types.

use nagstat_core::BackendError;
use thiserror::Error;

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid header name or value.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Client could not be constructed.
    #[error("Client setup failed: {0}")]
    Setup(String),
}

impl From<url::ParseError> for TransportError {
    fn from(err: url::ParseError) -> Self {
        TransportError::InvalidUrl(err.to_string())
    }
}

impl From<TransportError> for BackendError {
    fn from(err: TransportError) -> Self {
        BackendError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_to_backend_transport_error() {
        let err: BackendError = TransportError::Timeout(30).into();
        assert_eq!(
            err,
            BackendError::Transport("Request timed out after 30 seconds".to_string())
        );
        assert!(err.is_transient());
    }
}
