//! HTTP layer for Azure Resource Manager communication.
//!
//! This module provides the transport, the response decoder and the
//! long-running operation tracker the resource facade is composed of.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`HttpClient`]: The async transport, one round trip per call
//! - [`HttpRequest`]: A fully qualified request descriptor
//! - [`HttpResponse`]: A raw response with lower-cased headers
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, DELETE)
//! - [`AsyncOperationTracker`] and [`PollMachine`]: Long-running operation tracking
//! - [`PollControl`] and [`CancelToken`]: Caller-supplied deadline and cancellation
//! - [`ArmError`] and [`ErrorKind`]: The normalized error type and its classification
//!
//! # Retry Behavior
//!
//! The transport never retries. While polling a long-running operation,
//! transient failures (network errors, 429, 5xx) are retried up to
//! [`ArmConfig::poll_transport_retries`](crate::ArmConfig::poll_transport_retries)
//! consecutive times, honoring `Retry-After` when present.

mod decode;
mod errors;
mod http_client;
mod http_request;
mod http_response;
mod polling;

pub use decode::{decode_response, has_error_field, into_typed, parse_body};
pub use errors::{ArmError, ErrorKind};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, JSON_CONTENT_TYPE};
pub use http_response::{HttpResponse, AZURE_ASYNC_OPERATION_HEADER, MAX_RETRY_AFTER};
pub use polling::{
    AsyncOperationTracker, CancelToken, OperationHandle, OperationStatus, PollControl,
    PollMachine, PollOutcome, PollSource, PollState,
};
