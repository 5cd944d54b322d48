//! HTTP transport for Resource Manager communication.
//!
//! This module provides the [`HttpClient`] type, which performs exactly one
//! authenticated HTTP round trip per call. It owns no protocol semantics:
//! status handling, polling and decoding are layered on top.

use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::Authorizer;
use crate::clients::errors::ArmError;
use crate::clients::http_request::{HttpMethod, HttpRequest, JSON_CONTENT_TYPE};
use crate::clients::http_response::HttpResponse;
use crate::config::ArmConfig;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP transport for the Resource Manager API.
///
/// The client handles:
/// - Default headers including User-Agent and Accept
/// - The `Authorization` header, requested from the authorizer per request
/// - `Content-Type` for requests carrying a body
/// - `Content-Length: 0` for body-less POST, PUT and DELETE requests
///
/// No retries are performed at this layer.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    authorizer: Arc<dyn Authorizer>,
    default_headers: HashMap<String, String>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new transport.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Transport`] if the TLS backend cannot be initialized.
    pub fn new(config: &ArmConfig, authorizer: Arc<dyn Authorizer>) -> Result<Self, ArmError> {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let user_agent = format!("{user_agent_prefix}azure-arm-client v{SDK_VERSION}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            authorizer,
            default_headers,
        })
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends one request and returns the raw response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::TokenAcquisition`] if the authorizer fails,
    /// [`ArmError::Configuration`] if the request fails validation, and
    /// [`ArmError::Transport`] on network failure.
    pub async fn request(&self, request: &HttpRequest) -> Result<HttpResponse, ArmError> {
        request.verify()?;
        let authorization = self.authorizer.authorization().await?;

        tracing::debug!(method = %request.method, url = %request.url, "Sending request");

        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };

        for (key, value) in &self.default_headers {
            req_builder = req_builder.header(key, value);
        }
        req_builder = req_builder.header("Authorization", authorization);

        match &request.body {
            Some(body) => {
                req_builder = req_builder
                    .header("Content-Type", JSON_CONTENT_TYPE)
                    .body(body.to_string());
            }
            None if request.method != HttpMethod::Get => {
                req_builder = req_builder.header("Content-Length", "0");
            }
            None => {}
        }

        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let headers = Self::parse_response_headers(res.headers());
        let body = res.text().await?;

        tracing::debug!(status = code, url = %request.url, "Received response");

        Ok(HttpResponse::new(code, headers, body))
    }

    /// Sends a body-less GET to an absolute URL.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get(&self, url: &str) -> Result<HttpResponse, ArmError> {
        self.request(&HttpRequest::new(HttpMethod::Get, url)).await
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}
