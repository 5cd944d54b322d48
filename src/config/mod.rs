//! Configuration types for the Azure Resource Manager client.
//!
//! This module provides the configuration used to initialize a
//! [`ResourceClient`](crate::ResourceClient).
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ArmConfig`]: The configuration struct holding all client settings
//! - [`ArmConfigBuilder`]: A builder for constructing [`ArmConfig`] instances
//! - [`CloudEnvironment`]: The Azure cloud whose endpoints to use
//! - [`ApiVersion`] and [`VersionTable`]: Protocol version selection per resource type
//! - [`ResourceGroupTable`]: Default resource group per resource type
//! - [`SubscriptionId`], [`ClientSecret`], [`Endpoint`]: Validated newtypes
//!
//! Both tables are immutable once built. A client owns one copy of each for
//! its whole lifetime.
//!
//! # Example
//!
//! ```rust
//! use azure_arm::{ArmConfig, CloudEnvironment, ResourceGroupTable};
//! use std::time::Duration;
//!
//! let config = ArmConfig::builder()
//!     .environment(CloudEnvironment::AzureChina)
//!     .resource_groups(
//!         ResourceGroupTable::builder()
//!             .entry("Microsoft.Compute/disks", "disks-rg")
//!             .build(),
//!     )
//!     .poll_deadline(Duration::from_secs(600))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_endpoint().as_ref(), "https://management.chinacloudapi.cn");
//! ```

mod environment;
mod newtypes;
mod resource_groups;
mod version;

pub use environment::CloudEnvironment;
pub use newtypes::{ClientSecret, Endpoint, SubscriptionId};
pub use resource_groups::{ResourceGroupTable, ResourceGroupTableBuilder};
pub use version::{ApiVersion, VersionTable, VersionTableBuilder, DEFAULT_API_VERSION};

use crate::error::ConfigError;
use std::time::Duration;

/// Default wait between two polls of a long-running operation.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default number of consecutive transient failures tolerated while polling.
pub const DEFAULT_POLL_TRANSPORT_RETRIES: u32 = 3;

/// Configuration for the Azure Resource Manager client.
///
/// # Thread Safety
///
/// `ArmConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
#[derive(Clone, Debug)]
pub struct ArmConfig {
    environment: CloudEnvironment,
    base_endpoint: Endpoint,
    version_table: VersionTable,
    resource_groups: ResourceGroupTable,
    poll_interval: Duration,
    poll_deadline: Option<Duration>,
    poll_transport_retries: u32,
    user_agent_prefix: Option<String>,
}

impl ArmConfig {
    /// Creates a new builder for constructing an `ArmConfig`.
    #[must_use]
    pub fn builder() -> ArmConfigBuilder {
        ArmConfigBuilder::new()
    }

    /// Returns the cloud environment.
    #[must_use]
    pub const fn environment(&self) -> CloudEnvironment {
        self.environment
    }

    /// Returns the endpoint every request path is joined onto.
    #[must_use]
    pub const fn base_endpoint(&self) -> &Endpoint {
        &self.base_endpoint
    }

    /// Returns the resource-type to API version table.
    #[must_use]
    pub const fn version_table(&self) -> &VersionTable {
        &self.version_table
    }

    /// Returns the resource-type to default resource-group table.
    #[must_use]
    pub const fn resource_groups(&self) -> &ResourceGroupTable {
        &self.resource_groups
    }

    /// Returns the wait between two polls of a long-running operation.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the default polling deadline, if any.
    #[must_use]
    pub const fn poll_deadline(&self) -> Option<Duration> {
        self.poll_deadline
    }

    /// Returns how many consecutive transient poll failures are retried.
    #[must_use]
    pub const fn poll_transport_retries(&self) -> u32 {
        self.poll_transport_retries
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

impl Default for ArmConfig {
    fn default() -> Self {
        let environment = CloudEnvironment::default();
        Self {
            environment,
            base_endpoint: environment.endpoint(),
            version_table: VersionTable::azure_defaults(),
            resource_groups: ResourceGroupTable::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_deadline: None,
            poll_transport_retries: DEFAULT_POLL_TRANSPORT_RETRIES,
            user_agent_prefix: None,
        }
    }
}

// Verify ArmConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ArmConfig>();
};

/// Builder for constructing [`ArmConfig`] instances.
///
/// # Defaults
///
/// - `environment`: [`CloudEnvironment::AzurePublic`]
/// - `base_endpoint`: the environment's Resource Manager endpoint
/// - `version_table`: [`VersionTable::azure_defaults`]
/// - `resource_groups`: empty
/// - `poll_interval`: 5 seconds
/// - `poll_deadline`: `None` (poll until a terminal state)
/// - `poll_transport_retries`: 3
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct ArmConfigBuilder {
    environment: Option<CloudEnvironment>,
    base_endpoint: Option<String>,
    version_table: Option<VersionTable>,
    resource_groups: Option<ResourceGroupTable>,
    poll_interval: Option<Duration>,
    poll_deadline: Option<Duration>,
    poll_transport_retries: Option<u32>,
    user_agent_prefix: Option<String>,
}

impl ArmConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cloud environment.
    #[must_use]
    pub const fn environment(mut self, environment: CloudEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Overrides the Resource Manager endpoint (proxies, local test servers).
    ///
    /// The URL is validated in [`build`](Self::build).
    #[must_use]
    pub fn base_endpoint(mut self, url: impl Into<String>) -> Self {
        self.base_endpoint = Some(url.into());
        self
    }

    /// Sets the resource-type to API version table.
    #[must_use]
    pub fn version_table(mut self, table: VersionTable) -> Self {
        self.version_table = Some(table);
        self
    }

    /// Sets the resource-type to default resource-group table.
    #[must_use]
    pub fn resource_groups(mut self, table: ResourceGroupTable) -> Self {
        self.resource_groups = Some(table);
        self
    }

    /// Sets the wait between two polls of a long-running operation.
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Sets the default deadline for long-running operations.
    #[must_use]
    pub const fn poll_deadline(mut self, deadline: Duration) -> Self {
        self.poll_deadline = Some(deadline);
        self
    }

    /// Sets how many consecutive transient poll failures are retried.
    #[must_use]
    pub const fn poll_transport_retries(mut self, retries: u32) -> Self {
        self.poll_transport_retries = Some(retries);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`ArmConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] if the endpoint override is
    /// not an absolute http(s) URL.
    pub fn build(self) -> Result<ArmConfig, ConfigError> {
        let environment = self.environment.unwrap_or_default();
        let base_endpoint = match self.base_endpoint {
            Some(url) => Endpoint::new(url)?,
            None => environment.endpoint(),
        };

        Ok(ArmConfig {
            environment,
            base_endpoint,
            version_table: self
                .version_table
                .unwrap_or_else(VersionTable::azure_defaults),
            resource_groups: self.resource_groups.unwrap_or_default(),
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
            poll_deadline: self.poll_deadline,
            poll_transport_retries: self
                .poll_transport_retries
                .unwrap_or(DEFAULT_POLL_TRANSPORT_RETRIES),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}
