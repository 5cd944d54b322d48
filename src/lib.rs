//! # Azure Resource Manager Client
//!
//! A versioned request/response engine for the Azure Resource Manager (ARM)
//! REST API: it picks the API version for every request, builds and sends
//! authenticated calls, follows long-running operations to completion and
//! decodes results into typed values or classified errors.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ArmConfig`] and [`ArmConfigBuilder`]
//! - Per-resource-type API version selection via [`VersionTable`]
//! - Client-credentials token acquisition with caching via [`auth`]
//! - Async HTTP transport with long-running operation tracking via [`clients`]
//! - A resource facade (get, list, create, update, delete, actions) via [`ResourceClient`]
//! - Region discovery and capability-scoped listings via [`regions`]
//!
//! ## Quick Start
//!
//! ```rust
//! use azure_arm::{ArmConfig, CloudEnvironment, ResourceGroupTable, VersionTable};
//! use std::time::Duration;
//!
//! let config = ArmConfig::builder()
//!     .environment(CloudEnvironment::AzurePublic)
//!     .version_table(VersionTable::azure_defaults())
//!     .resource_groups(ResourceGroupTable::builder()
//!         .entry("Microsoft.Compute/disks", "disks-rg")
//!         .build())
//!     .poll_interval(Duration::from_secs(2))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     config.version_table().resolve("Microsoft.Compute/disks").as_str(),
//!     "2018-06-01"
//! );
//! ```
//!
//! ## Version Selection
//!
//! Every request carries an `api-version` query parameter. The version is
//! the one registered for the longest table entry contained in the resource
//! type or path, falling back to the table default:
//!
//! ```rust
//! use azure_arm::{VersionTable, DEFAULT_API_VERSION};
//!
//! let table = VersionTable::azure_defaults();
//! let vm = "/subscriptions/s/resourceGroups/g/providers/Microsoft.Compute/virtualMachines/vm1";
//! assert_eq!(table.resolve(vm).as_str(), "2018-04-01");
//! assert_eq!(table.resolve("Microsoft.Unknown/things").as_str(), DEFAULT_API_VERSION);
//! ```
//!
//! ## Making API Requests
//!
//! ```rust,ignore
//! use azure_arm::{ArmConfig, ResourceClient};
//! use serde_json::{json, Value};
//!
//! let client = ResourceClient::connect(
//!     ArmConfig::default(),
//!     "tenant-id/subscription-id",
//!     "client-id/client-secret",
//! ).await?;
//!
//! // Long-running creates are polled until they finish
//! let disk: Value = client.create(json!({
//!     "type": "Microsoft.Compute/disks",
//!     "name": "data-1",
//!     "location": "eastus",
//!     "properties": { "diskSizeGB": 32, "creationData": { "createOption": "Empty" } }
//! })).await?;
//!
//! let disks: Vec<Value> = client.list_all("Microsoft.Compute/disks").await?;
//! ```
//!
//! ## Error Handling
//!
//! Every failure is an [`ArmError`]; [`ArmError::kind`] classifies it as one
//! of the [`ErrorKind`] categories. Absence is always distinguishable:
//!
//! ```rust,ignore
//! match client.get::<Value>(id).await {
//!     Err(e) if e.is_not_found() => println!("gone"),
//!     other => { other?; }
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: Malformed configuration never reaches the network
//! - **Thread-safe**: All public types are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime
//! - **Bounded waiting**: Long-running operations honor cancellation and deadlines

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod regions;
pub mod rest;

// Re-export public types at crate root for convenience
pub use config::{
    ApiVersion, ArmConfig, ArmConfigBuilder, ClientSecret, CloudEnvironment, Endpoint,
    ResourceGroupTable, SubscriptionId, VersionTable, VersionTableBuilder, DEFAULT_API_VERSION,
};
pub use error::ConfigError;

// Re-export client types
pub use clients::{ArmError, CancelToken, ErrorKind, PollControl};
pub use regions::{Capability, Region, RegionCatalog, SubAccounts};
pub use rest::ResourceClient;
