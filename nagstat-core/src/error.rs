//! Core error types for nagstat.

use thiserror::Error;

/// Maximum number of payload characters kept in a [`BackendError::MalformedPayload`].
const FRAGMENT_LIMIT: usize = 200;

/// Error type returned by every backend operation.
///
/// Adapters never let a failure escape as a panic; every network-facing
/// operation reports through this enum instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Network, timeout, or DNS failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Handshake failed or credentials were rejected.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The backend answered with a login page where data was expected.
    #[error("Login failed.")]
    SessionExpired,

    /// The payload could not be parsed or carried an unmapped status code.
    #[error("Malformed payload: {reason} (near: {fragment:?})")]
    MalformedPayload {
        /// What went wrong.
        reason: String,
        /// Leading part of the offending payload, for diagnosis.
        fragment: String,
    },

    /// A command parameter the backend does not support was supplied.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The configured backend type tag is not registered.
    #[error("Unknown backend type: {0}")]
    UnknownBackendType(String),

    /// Invalid backend configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BackendError {
    /// Creates a malformed-payload error, keeping a bounded fragment of `raw`.
    pub fn malformed(reason: impl Into<String>, raw: &str) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
            fragment: raw.chars().take(FRAGMENT_LIMIT).collect(),
        }
    }

    /// Returns true if the next poll cycle may succeed without user action.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::SessionExpired)
    }

    /// Returns true if this error was raised before any network activity.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedOperation(_) | Self::UnknownBackendType(_) | Self::InvalidConfig(_)
        )
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedPayload {
            reason: format!("JSON error: {err}"),
            fragment: String::new(),
        }
    }
}

/// Result alias used across all backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_fragment_is_bounded() {
        let raw = "x".repeat(1000);
        let err = BackendError::malformed("bad", &raw);
        match err {
            BackendError::MalformedPayload { fragment, .. } => {
                assert_eq!(fragment.len(), FRAGMENT_LIMIT);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_session_expired_message() {
        assert_eq!(BackendError::SessionExpired.to_string(), "Login failed.");
    }

    #[test]
    fn test_transient_classification() {
        assert!(BackendError::Transport("timeout".into()).is_transient());
        assert!(BackendError::SessionExpired.is_transient());
        assert!(!BackendError::Auth("rejected".into()).is_transient());
        assert!(BackendError::UnsupportedOperation("x".into()).is_local());
    }
}
