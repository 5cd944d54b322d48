//! OAuth 2.0 Client Credentials Grant against Azure Active Directory.
//!
//! Service principals authenticate server-to-server without user
//! interaction. The token endpoint is
//! `<active directory endpoint><tenant>/oauth2/token` and the requested
//! resource is the Resource Manager audience of the cloud environment.
//!
//! Tokens are cached until shortly before they expire. Concurrent callers
//! share the cache; at most one refresh result is kept.

use crate::auth::{Authorizer, Credential, TokenError};
use crate::config::{ClientSecret, CloudEnvironment};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::fmt;
use tokio::sync::RwLock;

/// Grant type for client credentials.
const CLIENT_CREDENTIALS_GRANT_TYPE: &str = "client_credentials";

/// Tokens are refreshed this long before they actually expire.
const TOKEN_EXPIRY_BUFFER_SECS: i64 = 60;

/// Used when the token endpoint does not report a lifetime.
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Reported lifetimes are clamped to at most one day.
const MAX_TOKEN_TTL_SECS: i64 = 86_400;

/// Active Directory reports `expires_in` as a string; other issuers use a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
    Number(i64),
    Text(String),
}

impl ExpiresIn {
    /// Returns the lifetime in seconds, within `0..=MAX_TOKEN_TTL_SECS`.
    fn seconds(&self) -> i64 {
        let secs = match self {
            Self::Number(secs) => *secs,
            Self::Text(text) => text.trim().parse().unwrap_or(DEFAULT_TOKEN_TTL_SECS),
        };
        secs.clamp(0, MAX_TOKEN_TTL_SECS)
    }
}

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<ExpiresIn>,
}

#[derive(Clone)]
struct CachedToken {
    header: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// An [`Authorizer`] using the OAuth 2.0 client credentials grant.
///
/// # Example
///
/// ```rust
/// use azure_arm::auth::{ClientCredentialsAuthorizer, Credential};
/// use azure_arm::CloudEnvironment;
///
/// let credential = Credential::parse("my-tenant/my-sub", "my-client/my-secret").unwrap();
/// let authorizer = ClientCredentialsAuthorizer::new(&credential, CloudEnvironment::AzureChina);
///
/// assert_eq!(
///     authorizer.token_url(),
///     "https://login.chinacloudapi.cn/my-tenant/oauth2/token"
/// );
/// ```
pub struct ClientCredentialsAuthorizer {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: ClientSecret,
    resource: String,
    cache: RwLock<Option<CachedToken>>,
}

impl ClientCredentialsAuthorizer {
    /// Creates an authorizer for a credential in the given cloud.
    #[must_use]
    pub fn new(credential: &Credential, environment: CloudEnvironment) -> Self {
        let token_url = format!(
            "{}{}/oauth2/token",
            environment.active_directory_endpoint(),
            credential.tenant_id()
        );
        Self {
            client: reqwest::Client::new(),
            token_url,
            client_id: credential.client_id().to_string(),
            client_secret: credential.client_secret().clone(),
            resource: environment.token_resource(),
            cache: RwLock::new(None),
        }
    }

    /// Overrides the token endpoint (proxies, local test servers).
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Returns the token endpoint URL.
    #[must_use]
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Drops the cached token so the next call fetches a new one.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    async fn fetch(&self) -> Result<CachedToken, TokenError> {
        let form = [
            ("grant_type", CLIENT_CREDENTIALS_GRANT_TYPE),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_ref()),
            ("resource", self.resource.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| TokenError {
                status: 0,
                message: format!("Network error: {e}"),
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TokenError { status, message });
        }

        let token: TokenResponse = response.json().await.map_err(|e| TokenError {
            status,
            message: format!("Failed to parse token response: {e}"),
        })?;

        let lifetime = token
            .expires_in
            .as_ref()
            .map_or(DEFAULT_TOKEN_TTL_SECS, ExpiresIn::seconds);
        let expires_at = Utc::now()
            + Duration::seconds(lifetime.saturating_sub(TOKEN_EXPIRY_BUFFER_SECS).max(0));
        let scheme = token.token_type.as_deref().unwrap_or("Bearer");

        tracing::debug!(expires_in = lifetime, "Acquired Resource Manager token");

        Ok(CachedToken {
            header: format!("{scheme} {}", token.access_token),
            expires_at,
        })
    }
}

impl fmt::Debug for ClientCredentialsAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentialsAuthorizer")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret)
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Authorizer for ClientCredentialsAuthorizer {
    async fn authorization(&self) -> Result<String, TokenError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.header.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let mut cache = self.cache.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(cached) = cache.as_ref() {
            if cached.is_valid() {
                return Ok(cached.header.clone());
            }
        }
        let fresh = self.fetch().await?;
        let header = fresh.header.clone();
        *cache = Some(fresh);
        Ok(header)
    }
}
