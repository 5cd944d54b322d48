//! Authorization for Azure Resource Manager requests.
//!
//! Every request carries an `Authorization` header produced by an
//! [`Authorizer`]. The client never inspects the value; it only asks for a
//! fresh one per request, so implementations are free to cache and refresh
//! tokens however they like.
//!
//! # Overview
//!
//! - [`Authorizer`]: The trait the transport consumes
//! - [`StaticTokenAuthorizer`]: A pre-acquired bearer token
//! - [`ClientCredentialsAuthorizer`]: OAuth 2.0 client credentials grant with caching
//! - [`Credential`]: Service principal credentials parsed from delimited strings
//!
//! # Example
//!
//! ```rust
//! use azure_arm::auth::{Authorizer, StaticTokenAuthorizer};
//!
//! # tokio_test::block_on(async {
//! let authorizer = StaticTokenAuthorizer::new("eyJ0eXAi...");
//! assert_eq!(authorizer.authorization().await.unwrap(), "Bearer eyJ0eXAi...");
//! # });
//! ```

mod client_credentials;
mod credential;

pub use client_credentials::ClientCredentialsAuthorizer;
pub use credential::{Credential, CredentialError};

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error returned when an authorizer cannot produce a token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Token acquisition failed (status {status}): {message}")]
pub struct TokenError {
    /// The HTTP status of the token endpoint response, or 0 for network errors.
    pub status: u16,
    /// Error detail from the token endpoint.
    pub message: String,
}

/// Produces the `Authorization` header value for one request.
///
/// Implementations must be safe to call concurrently; the client shares a
/// single authorizer between all clones and in-flight requests.
#[async_trait]
pub trait Authorizer: Send + Sync + fmt::Debug {
    /// Returns the full header value (e.g. `"Bearer <token>"`).
    async fn authorization(&self) -> Result<String, TokenError>;
}

/// An authorizer that always returns the same bearer token.
#[derive(Clone)]
pub struct StaticTokenAuthorizer {
    header: String,
}

impl StaticTokenAuthorizer {
    /// Wraps a pre-acquired access token.
    #[must_use]
    pub fn new(token: impl AsRef<str>) -> Self {
        Self {
            header: format!("Bearer {}", token.as_ref()),
        }
    }
}

impl fmt::Debug for StaticTokenAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticTokenAuthorizer(*****)")
    }
}

#[async_trait]
impl Authorizer for StaticTokenAuthorizer {
    async fn authorization(&self) -> Result<String, TokenError> {
        Ok(self.header.clone())
    }
}

// Verify authorizers are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StaticTokenAuthorizer>();
    assert_send_sync::<ClientCredentialsAuthorizer>();
    assert_send_sync::<TokenError>();
};
