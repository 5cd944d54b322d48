//! Configuration error types for the Azure Resource Manager client.
//!
//! This module contains the errors raised while building configuration and
//! while validating a request before it is sent. None of these errors ever
//! involves a network round trip.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. The request builder reuses the same type for
//! pre-flight checks (missing subscription, missing resource-group mapping,
//! missing body fields), which the facade surfaces as
//! [`ArmError::Configuration`](crate::ArmError::Configuration).
//!
//! # Example
//!
//! ```rust
//! use azure_arm::{ApiVersion, ConfigError};
//!
//! let result: Result<ApiVersion, _> = "2018-13".parse();
//! assert!(matches!(result, Err(ConfigError::InvalidApiVersion { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur during configuration or request validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API version is invalid.
    #[error("Invalid API version '{version}'. Expected format: 'YYYY-MM-DD' with an optional suffix (e.g., '2018-06-01' or '2016-04-30-preview').")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// The endpoint URL is invalid.
    #[error("Invalid endpoint '{url}'. Please provide an absolute http(s) URL (e.g., 'https://management.azure.com').")]
    InvalidEndpoint {
        /// The invalid URL that was provided.
        url: String,
    },

    /// The cloud environment name is not known.
    #[error("Unknown cloud environment '{name}'.")]
    UnknownEnvironment {
        /// The name that was provided.
        name: String,
    },

    /// The operation needs a subscription id but the client has none.
    #[error("Missing subscription id. This operation is scoped to a subscription.")]
    MissingSubscription,

    /// The resource type has no default resource group registered.
    #[error("No default resource group registered for resource type '{resource_type}'.")]
    MissingResourceGroup {
        /// The resource type that has no mapping.
        resource_type: String,
    },

    /// A field required by the operation is missing from the body or reference.
    #[error("Missing required field: '{field}'.")]
    MissingField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// A resource id could not be parsed.
    #[error("Invalid resource id '{id}': {reason}")]
    InvalidResourceId {
        /// The id that was provided.
        id: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A required builder field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}
