//! HTTP response type for the Resource Manager client.
//!
//! The body is kept as raw text: whether it is decoded, polled or reported
//! as an error depends on the status and headers, which the caller inspects
//! first.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Header naming the URL of a long-running operation's status monitor.
pub const AZURE_ASYNC_OPERATION_HEADER: &str = "azure-asyncoperation";

/// Upper bound on any server-requested wait.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);

/// An HTTP response from the Resource Manager API.
///
/// Header names are lower-cased; headers may have multiple values.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers.
    pub headers: HashMap<String, Vec<String>>,
    /// The raw response body.
    pub body: String,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`, lower-casing header names.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: impl Into<String>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Self {
            code,
            headers,
            body: body.into(),
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of a header (name is case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Returns the `Location` header value, if present.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    /// Returns the `Azure-AsyncOperation` header value, if present.
    #[must_use]
    pub fn async_operation(&self) -> Option<&str> {
        self.header(AZURE_ASYNC_OPERATION_HEADER)
    }

    /// Returns the `x-ms-request-id` header value, if present.
    ///
    /// Include this id when reporting problems to Azure support.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-ms-request-id")
    }

    /// Returns the wait requested by the `Retry-After` header.
    ///
    /// Both delta-seconds and HTTP-date forms are understood. Dates in the
    /// past yield a zero wait; waits are capped at [`MAX_RETRY_AFTER`].
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        let value = self.header("retry-after")?.trim();
        if let Ok(secs) = value.parse::<f64>() {
            if secs.is_nan() || secs < 0.0 {
                return None;
            }
            let wait = Duration::try_from_secs_f64(secs).unwrap_or(MAX_RETRY_AFTER);
            return Some(wait.min(MAX_RETRY_AFTER));
        }
        let at = DateTime::parse_from_rfc2822(value).ok()?;
        let wait = at.with_timezone(&Utc) - Utc::now();
        Some(wait.to_std().unwrap_or(Duration::ZERO).min(MAX_RETRY_AFTER))
    }

    /// Returns `true` for statuses worth retrying while polling (429 and 5xx).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        self.code == 429 || self.code >= 500
    }
}
