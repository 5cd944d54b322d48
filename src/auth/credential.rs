//! Service principal credentials parsed from delimited strings.
//!
//! Accounts are configured as two strings:
//!
//! - the account: `"<tenant>"` or `"<tenant>/<subscription>"`
//! - the secret: `"<client id>/<client secret>"`
//!
//! Everything after the first `/` of the secret string is the client secret,
//! so secrets that themselves contain `/` survive parsing.

use crate::config::{ClientSecret, SubscriptionId};
use thiserror::Error;

/// Errors raised while parsing a [`Credential`].
///
/// These are detected before any network call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The secret string has no `/` separating client id and secret.
    #[error("Malformed secret: expected '<client id>/<client secret>'.")]
    MissingSecretSeparator,

    /// The account string has an empty tenant segment.
    #[error("Malformed account: the tenant id is empty.")]
    EmptyTenant,

    /// The secret string has an empty client id segment.
    #[error("Malformed secret: the client id is empty.")]
    EmptyClientId,
}

/// A service principal credential.
///
/// # Example
///
/// ```rust
/// use azure_arm::auth::Credential;
///
/// let credential = Credential::parse("tenant-1/sub-1", "client-1/pa/ss").unwrap();
/// assert_eq!(credential.tenant_id(), "tenant-1");
/// assert_eq!(credential.client_id(), "client-1");
/// assert_eq!(credential.client_secret().as_ref(), "pa/ss");
/// assert_eq!(credential.subscription_id().unwrap().as_ref(), "sub-1");
///
/// assert!(Credential::parse("tenant-1", "no-separator").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    tenant_id: String,
    client_id: String,
    client_secret: ClientSecret,
    subscription_id: Option<SubscriptionId>,
}

impl Credential {
    /// Parses an account string and a secret string.
    ///
    /// A subscription is taken only when the account has exactly two
    /// segments. Extra segments are ignored with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the secret has no separator or if the
    /// tenant or client id is empty.
    pub fn parse(account: &str, secret: &str) -> Result<Self, CredentialError> {
        let (client_id, client_secret) = secret
            .split_once('/')
            .ok_or(CredentialError::MissingSecretSeparator)?;
        if client_id.trim().is_empty() {
            return Err(CredentialError::EmptyClientId);
        }

        let segments: Vec<&str> = account.split('/').collect();
        let tenant_id = segments[0].trim();
        if tenant_id.is_empty() {
            return Err(CredentialError::EmptyTenant);
        }

        let subscription_id = match segments.as_slice() {
            [_, subscription] => SubscriptionId::new(*subscription).ok(),
            [_] => None,
            _ => {
                tracing::warn!(
                    segments = segments.len(),
                    "Account string has more than two segments; ignoring the subscription"
                );
                None
            }
        };

        Ok(Self {
            tenant_id: tenant_id.to_string(),
            client_id: client_id.trim().to_string(),
            client_secret: ClientSecret::new(client_secret),
            subscription_id,
        })
    }

    /// Returns the Active Directory tenant id.
    #[must_use]
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Returns the application (client) id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the client secret.
    #[must_use]
    pub const fn client_secret(&self) -> &ClientSecret {
        &self.client_secret
    }

    /// Returns the subscription, if the account string named one.
    #[must_use]
    pub const fn subscription_id(&self) -> Option<&SubscriptionId> {
        self.subscription_id.as_ref()
    }
}
