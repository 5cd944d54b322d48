//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An Azure subscription id.
///
/// Subscription ids scope list, create and name-availability requests.
/// The value is kept as given; Azure treats it case-insensitively.
///
/// # Example
///
/// ```rust
/// use azure_arm::SubscriptionId;
///
/// let id = SubscriptionId::new("00000000-0000-0000-0000-000000000000").unwrap();
/// assert_eq!(id.as_ref(), "00000000-0000-0000-0000-000000000000");
/// assert!(SubscriptionId::new("  ").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    /// Creates a new subscription id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSubscription`] if the id is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(ConfigError::MissingSubscription);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for SubscriptionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A client secret.
///
/// The `Debug` implementation masks the value, displaying only
/// `ClientSecret(*****)`.
///
/// # Example
///
/// ```rust
/// use azure_arm::ClientSecret;
///
/// let secret = ClientSecret::new("s3cr3t/with/slashes");
/// assert_eq!(format!("{:?}", secret), "ClientSecret(*****)");
/// assert_eq!(secret.as_ref(), "s3cr3t/with/slashes");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecret(String);

impl ClientSecret {
    /// Wraps a secret value.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }
}

impl AsRef<str> for ClientSecret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(*****)")
    }
}

/// A validated absolute endpoint URL without a trailing slash.
///
/// # Serialization
///
/// `Endpoint` serializes to and deserializes from the URL string:
///
/// ```rust
/// use azure_arm::Endpoint;
///
/// let endpoint = Endpoint::new("https://management.azure.com/").unwrap();
/// assert_eq!(endpoint.as_ref(), "https://management.azure.com");
///
/// let json = serde_json::to_string(&endpoint).unwrap();
/// assert_eq!(json, r#""https://management.azure.com""#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint(String);

impl Endpoint {
    /// Creates a new validated endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] if the URL has no http(s)
    /// scheme or no host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let trimmed = url.trim().trim_end_matches('/');

        let rest = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"));
        match rest {
            Some(host) if !host.is_empty() && !host.contains(char::is_whitespace) => {
                Ok(Self(trimmed.to_string()))
            }
            _ => Err(ConfigError::InvalidEndpoint { url }),
        }
    }

    /// Wraps a known-good endpoint without validation.
    pub(crate) fn from_static(url: &'static str) -> Self {
        Self(url.to_string())
    }

    /// Joins a path (starting with `/`) onto this endpoint.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.0)
        } else {
            format!("{}/{path}", self.0)
        }
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Endpoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Endpoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_id_rejects_empty() {
        assert!(matches!(
            SubscriptionId::new(""),
            Err(ConfigError::MissingSubscription)
        ));
        assert_eq!(SubscriptionId::new(" sub-1 ").unwrap().as_ref(), "sub-1");
    }

    #[test]
    fn test_client_secret_masks_debug_output() {
        let secret = ClientSecret::new("super-secret");
        let debug = format!("{secret:?}");
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_endpoint_normalizes_trailing_slash() {
        let endpoint = Endpoint::new("https://management.chinacloudapi.cn/").unwrap();
        assert_eq!(endpoint.as_ref(), "https://management.chinacloudapi.cn");
        assert_eq!(
            endpoint.join("/subscriptions"),
            "https://management.chinacloudapi.cn/subscriptions"
        );
        assert_eq!(
            endpoint.join("subscriptions"),
            "https://management.chinacloudapi.cn/subscriptions"
        );
    }

    #[test]
    fn test_endpoint_accepts_http_for_local_servers() {
        assert!(Endpoint::new("http://127.0.0.1:8080").is_ok());
    }

    #[test]
    fn test_endpoint_rejects_invalid() {
        assert!(Endpoint::new("management.azure.com").is_err());
        assert!(Endpoint::new("https://").is_err());
        assert!(Endpoint::new("ftp://example.com").is_err());
        assert!(Endpoint::new("https://bad host").is_err());
    }

    #[test]
    fn test_endpoint_deserialize_validates() {
        let ok: Result<Endpoint, _> = serde_json::from_str(r#""https://management.azure.com""#);
        assert!(ok.is_ok());
        let bad: Result<Endpoint, _> = serde_json::from_str(r#""not a url""#);
        assert!(bad.is_err());
    }
}
