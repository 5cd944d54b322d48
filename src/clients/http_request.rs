//! HTTP request types for the Resource Manager client.
//!
//! An [`HttpRequest`] is a fully qualified request descriptor: the URL
//! already carries the `api-version` query parameter.

use std::fmt;

use crate::error::ConfigError;

/// HTTP methods used by the Resource Manager API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for actions and name checks.
    Post,
    /// HTTP PUT method for creating and updating resources.
    Put,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// Content type sent with every request body.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A request descriptor: method, absolute URL and optional JSON body.
///
/// # Example
///
/// ```rust
/// use azure_arm::clients::{HttpMethod, HttpRequest};
/// use serde_json::json;
///
/// let request = HttpRequest::new(
///     HttpMethod::Put,
///     "https://management.azure.com/subscriptions/s/resourceGroups/rg/providers/Microsoft.Compute/disks/d1?api-version=2018-06-01",
/// )
/// .with_body(json!({"location": "eastus"}));
///
/// assert!(request.verify().is_ok());
/// assert!(request.body.is_some());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub method: HttpMethod,
    /// The absolute URL, including the version query parameter.
    pub url: String,
    /// The request body, if any.
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    /// Creates a request without a body.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    /// Attaches a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Validates the request before it is sent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] if a PUT has no body.
    pub fn verify(&self) -> Result<(), ConfigError> {
        if self.method == HttpMethod::Put && self.body.is_none() {
            return Err(ConfigError::MissingField { field: "body" });
        }
        Ok(())
    }
}
