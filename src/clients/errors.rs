//! Normalized error type for Resource Manager calls.
//!
//! Every facade operation returns `Result<T, ArmError>`. Failures are
//! classified into a small set of [`ErrorKind`]s so callers can branch on
//! the class of failure without matching every variant.
//!
//! # Error Handling
//!
//! - Configuration and credential problems are detected before any network
//!   call and surface as [`ArmError::Configuration`] and
//!   [`ArmError::Unauthorized`].
//! - HTTP 404 surfaces as [`ArmError::NotFound`], a distinguished sentinel
//!   for "resource absent".
//! - A JSON body with a top-level `error` field surfaces as
//!   [`ArmError::Application`].
//! - A tracked operation ending in a non-`Succeeded` status surfaces as
//!   [`ArmError::AsyncFailed`] carrying the last payload.
//!
//! # Example
//!
//! ```rust
//! use azure_arm::{ArmError, ErrorKind};
//!
//! let error = ArmError::NotFound {
//!     url: "https://management.azure.com/x".to_string(),
//!     body: String::new(),
//! };
//! assert_eq!(error.kind(), ErrorKind::NotFound);
//! assert!(error.is_not_found());
//! assert_eq!(error.status(), Some(404));
//! ```

use crate::auth::{CredentialError, TokenError};
use crate::error::ConfigError;
use thiserror::Error;

/// Classification of an [`ArmError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The resource does not exist.
    NotFound,
    /// Credentials are malformed or were rejected.
    Unauthorized,
    /// Client configuration or request input is incomplete.
    Configuration,
    /// A long-running operation ended in failure.
    AsyncFailed,
    /// Network or I/O failure.
    Transport,
    /// Malformed JSON, or JSON carrying an explicit error.
    Decode,
    /// The caller abandoned a long-running operation.
    Cancelled,
}

/// Error returned by Resource Manager operations.
#[derive(Debug, Error)]
pub enum ArmError {
    /// The remote system answered 404.
    #[error("Resource not found: {url}")]
    NotFound {
        /// The requested URL.
        url: String,
        /// The response body, kept for diagnostics.
        body: String,
    },

    /// The credential strings are malformed.
    #[error(transparent)]
    Unauthorized(#[from] CredentialError),

    /// The authorizer could not produce a token.
    #[error(transparent)]
    TokenAcquisition(#[from] TokenError),

    /// Configuration or request input is incomplete.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The HTTP exchange failed.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body is not valid JSON.
    #[error("Failed to decode response (status {status}): {message}")]
    Decode {
        /// HTTP status of the response.
        status: u16,
        /// What went wrong.
        message: String,
    },

    /// The response body carries a top-level `error` field.
    #[error("Request failed with status {status}: {payload}")]
    Application {
        /// HTTP status of the response.
        status: u16,
        /// The full decoded payload.
        payload: serde_json::Value,
    },

    /// A long-running operation reached a terminal non-success state.
    #[error("Asynchronous operation failed: {payload}")]
    AsyncFailed {
        /// HTTP status of the last poll response.
        status: u16,
        /// The last poll payload.
        payload: serde_json::Value,
    },

    /// The caller cancelled while an operation was being polled.
    #[error("Cancelled while polling {poll_url}")]
    Cancelled {
        /// The operation's poll URL, usable to resume observation.
        poll_url: String,
    },

    /// The polling deadline elapsed before a terminal state.
    #[error("Deadline exceeded while polling {poll_url}")]
    DeadlineExceeded {
        /// The operation's poll URL, usable to resume observation.
        poll_url: String,
    },
}

impl ArmError {
    /// Returns the classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unauthorized(_) | Self::TokenAcquisition(_) => ErrorKind::Unauthorized,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Decode { .. } | Self::Application { .. } => ErrorKind::Decode,
            Self::AsyncFailed { .. } => ErrorKind::AsyncFailed,
            Self::Cancelled { .. } | Self::DeadlineExceeded { .. } => ErrorKind::Cancelled,
        }
    }

    /// Returns `true` if the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the HTTP status associated with this error, if known.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::TokenAcquisition(e) if e.status != 0 => Some(e.status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Decode { status, .. }
            | Self::Application { status, .. }
            | Self::AsyncFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the vendor error payload, if the error carries one.
    #[must_use]
    pub const fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Application { payload, .. } | Self::AsyncFailed { payload, .. } => {
                Some(payload)
            }
            _ => None,
        }
    }
}

// Verify ArmError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ArmError>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            ArmError::from(CredentialError::MissingSecretSeparator).kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            ArmError::from(ConfigError::MissingSubscription).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            ArmError::Application {
                status: 200,
                payload: json!({"error": {}})
            }
            .kind(),
            ErrorKind::Decode
        );
        assert_eq!(
            ArmError::DeadlineExceeded {
                poll_url: "u".to_string()
            }
            .kind(),
            ErrorKind::Cancelled
        );
    }

    #[test]
    fn test_async_failed_exposes_payload() {
        let error = ArmError::AsyncFailed {
            status: 200,
            payload: json!({"status": "Failed", "detail": "quota exceeded"}),
        };
        assert_eq!(error.kind(), ErrorKind::AsyncFailed);
        assert_eq!(error.status(), Some(200));
        assert_eq!(error.payload().unwrap()["detail"], "quota exceeded");
        assert!(error.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_token_error_keeps_status() {
        let error = ArmError::from(TokenError {
            status: 401,
            message: "invalid_client".to_string(),
        });
        assert_eq!(error.status(), Some(401));
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_configuration_message_is_transparent() {
        let error = ArmError::from(ConfigError::MissingSubscription);
        assert_eq!(error.to_string(), ConfigError::MissingSubscription.to_string());
        assert!(error.payload().is_none());
    }
}
