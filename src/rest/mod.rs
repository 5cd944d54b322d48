//! Resource-level operations on top of the HTTP layer.
//!
//! # Overview
//!
//! - [`ResourceClient`]: The public facade (get, list, create, update, delete, actions)
//! - [`ResourceReference`]: The address of one remote object
//! - [`RequestBuilder`] and [`Operation`]: Validated request construction with version resolution
//! - [`ListingIterator`] and [`Page`]: Restartable paged collection listing
//!
//! # Control flow
//!
//! ```text
//! ResourceClient ─▶ RequestBuilder (VersionTable) ─▶ HttpClient
//!                ─▶ AsyncOperationTracker (when polling) ─▶ decode
//! ```

mod client;
mod listing;
mod request_builder;
mod resource;

pub use client::ResourceClient;
pub use listing::{ListingIterator, Page};
pub use request_builder::{with_api_version, Operation, RequestBuilder};
pub use resource::ResourceReference;
