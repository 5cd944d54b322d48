//! The public Resource Manager facade.
//!
//! [`ResourceClient`] composes the request builder, the transport, the
//! long-running operation tracker and the response decoder into the
//! operations callers use: get, list, create, update, delete, actions and
//! name availability checks, plus region discovery.
//!
//! # Thread Safety
//!
//! `ResourceClient` is cheap to clone; clones share the transport, the
//! configuration and the region catalog. It is `Send + Sync`, so one
//! instance can serve any number of concurrent tasks. Calls are independent
//! of each other: no call orders, locks or retries another.
//!
//! # Example
//!
//! ```rust,ignore
//! use azure_arm::{ArmConfig, ResourceClient};
//! use serde_json::{json, Value};
//!
//! let client = ResourceClient::from_credentials(
//!     ArmConfig::default(),
//!     "tenant-id/subscription-id",
//!     "client-id/client-secret",
//! )?;
//!
//! let disk: Value = client.get("/subscriptions/.../providers/Microsoft.Compute/disks/d1").await?;
//! client.perform_action::<Value>(vm_id, "start", None).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::auth::{Authorizer, ClientCredentialsAuthorizer, Credential};
use crate::clients::{
    into_typed, ArmError, AsyncOperationTracker, CancelToken, HttpClient, HttpRequest, PollControl,
};
use crate::config::{ArmConfig, SubscriptionId};
use crate::error::ConfigError;
use crate::regions::{is_in_region, Capability, Region, RegionCatalog, SubAccounts, SubscriptionInfo};
use crate::rest::{ListingIterator, Operation, RequestBuilder, ResourceReference};

#[derive(Debug)]
struct ClientInner {
    config: ArmConfig,
    subscription: Option<SubscriptionId>,
    transport: HttpClient,
    regions: OnceCell<RegionCatalog>,
}

/// Client for Azure Resource Manager operations.
#[derive(Clone, Debug)]
pub struct ResourceClient {
    inner: Arc<ClientInner>,
    control: PollControl,
}

// Verify ResourceClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceClient>();
};

impl ResourceClient {
    /// Creates a client from an authorizer and an optional subscription.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Transport`] if the HTTP client cannot be created.
    pub fn new(
        config: ArmConfig,
        authorizer: Arc<dyn Authorizer>,
        subscription: Option<SubscriptionId>,
    ) -> Result<Self, ArmError> {
        let transport = HttpClient::new(&config, authorizer)?;
        let control = config
            .poll_deadline()
            .map_or_else(PollControl::new, |deadline| {
                PollControl::new().with_deadline(deadline)
            });

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                subscription,
                transport,
                regions: OnceCell::new(),
            }),
            control,
        })
    }

    /// Creates a client from account and secret strings.
    ///
    /// The account is `"<tenant>[/<subscription>]"`, the secret is
    /// `"<client id>/<client secret>"`. Tokens are obtained with the client
    /// credentials grant of the configured cloud.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Unauthorized`] if either string is malformed. No
    /// network call is made in that case.
    pub fn from_credentials(config: ArmConfig, account: &str, secret: &str) -> Result<Self, ArmError> {
        let credential = Credential::parse(account, secret)?;
        let authorizer = ClientCredentialsAuthorizer::new(&credential, config.environment());
        let subscription = credential.subscription_id().cloned();
        Self::new(config, Arc::new(authorizer), subscription)
    }

    /// Creates a client from credential strings and discovers its regions.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`from_credentials`](Self::from_credentials)
    /// and of region discovery.
    pub async fn connect(config: ArmConfig, account: &str, secret: &str) -> Result<Self, ArmError> {
        let client = Self::from_credentials(config, account, secret)?;
        client.regions().await?;
        Ok(client)
    }

    /// Returns a clone whose long-running operations stop when `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(&self, token: CancelToken) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            control: self.control.clone().with_cancel(token),
        }
    }

    /// Returns a clone whose long-running operations give up after `deadline`.
    #[must_use]
    pub fn with_deadline(&self, deadline: Duration) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            control: self.control.clone().with_deadline(deadline),
        }
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &ArmConfig {
        &self.inner.config
    }

    /// Returns the subscription, if the client has one.
    #[must_use]
    pub fn subscription_id(&self) -> Option<&SubscriptionId> {
        self.inner.subscription.as_ref()
    }

    /// Returns a request builder over this client's configuration.
    #[must_use]
    pub fn request_builder(&self) -> RequestBuilder<'_> {
        RequestBuilder::new(&self.inner.config, self.inner.subscription.as_ref())
    }

    pub(crate) fn transport(&self) -> &HttpClient {
        &self.inner.transport
    }

    /// Sends a request and drives any long-running operation to completion.
    async fn execute(&self, request: HttpRequest) -> Result<(u16, Value), ArmError> {
        let response = self.inner.transport.request(&request).await?;
        let status = response.code;
        let tracker = AsyncOperationTracker::new(
            &self.inner.transport,
            self.inner.config.poll_interval(),
            self.inner.config.poll_transport_retries(),
        );
        let value = tracker.complete(&request.url, response, &self.control).await?;
        Ok((status, value))
    }

    async fn run<T: DeserializeOwned>(
        &self,
        operation: &Operation,
        reference: &ResourceReference,
        body: Option<Value>,
    ) -> Result<T, ArmError> {
        let request = self.request_builder().build(operation, reference, body)?;
        let (status, value) = self.execute(request).await?;
        into_typed(status, value)
    }

    /// Fetches a resource by id.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::NotFound`] if the resource does not exist.
    pub async fn get<T: DeserializeOwned>(&self, id: &str) -> Result<T, ArmError> {
        let reference = ResourceReference::from_id(id)?;
        self.run(&Operation::Get, &reference, None).await
    }

    /// Returns whether a resource exists.
    ///
    /// # Errors
    ///
    /// Returns any error of [`get`](Self::get) other than not-found.
    pub async fn exists(&self, id: &str) -> Result<bool, ArmError> {
        match self.get::<Value>(id).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Returns a paged listing of every resource of a type in the subscription.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Configuration`] without a subscription.
    pub fn list_pages<T: DeserializeOwned>(
        &self,
        resource_type: &str,
    ) -> Result<ListingIterator<'_, T>, ArmError> {
        let reference = ResourceReference::new(resource_type, "");
        let request = self
            .request_builder()
            .build(&Operation::List, &reference, None)?;
        Ok(ListingIterator::new(self, request.url))
    }

    /// Lists every resource of a type in the subscription, following pages.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Configuration`] without a subscription, plus any
    /// transport or decoding error.
    pub async fn list_all<T: DeserializeOwned>(&self, resource_type: &str) -> Result<Vec<T>, ArmError> {
        self.list_pages(resource_type)?.collect_all().await
    }

    /// Lists the resources of a type in its default resource group.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Configuration`] without a subscription or without
    /// a resource-group mapping for the type.
    pub async fn list_by_type<T: DeserializeOwned>(&self, resource_type: &str) -> Result<Vec<T>, ArmError> {
        let builder = self.request_builder();
        let group = builder.resource_group(resource_type)?;
        let reference = ResourceReference::new(resource_type, "").with_resource_group(group);
        let request = builder.build(&Operation::List, &reference, None)?;
        ListingIterator::new(self, request.url).collect_all().await
    }

    /// Lists a subscription-level collection such as `locations`.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Configuration`] without a subscription.
    pub async fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, ArmError> {
        let builder = self.request_builder();
        let subscription = builder.subscription()?;
        let collection = collection.trim_matches('/');
        if collection.is_empty() {
            return Err(ConfigError::MissingField { field: "collection" }.into());
        }
        let url = builder.url(
            &format!("/subscriptions/{subscription}/{collection}"),
            self.inner.config.version_table().default_version(),
        );
        ListingIterator::new(self, url).collect_all().await
    }

    /// Lists the subscriptions visible to the credential.
    ///
    /// # Errors
    ///
    /// Returns any transport or decoding error.
    pub async fn list_subscriptions<T: DeserializeOwned>(&self) -> Result<Vec<T>, ArmError> {
        let url = self
            .request_builder()
            .url("/subscriptions", self.inner.config.version_table().default_version());
        ListingIterator::new(self, url).collect_all().await
    }

    /// Summarizes the subscriptions visible to the credential.
    ///
    /// # Errors
    ///
    /// Returns any transport or decoding error.
    pub async fn sub_accounts(&self) -> Result<SubAccounts, ArmError> {
        Ok(SubAccounts::from_subscriptions(self.list_subscriptions().await?))
    }

    /// Creates a resource from a body carrying `type` and `name`.
    ///
    /// The resource is placed in the default resource group of its type.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Configuration`] if `type` or `name` is missing,
    /// without a subscription, or without a resource-group mapping.
    pub async fn create<T: DeserializeOwned>(&self, body: Value) -> Result<T, ArmError> {
        let resource_type = string_field(&body, "type")?;
        let name = string_field(&body, "name")?;
        let reference = ResourceReference::new(resource_type, name);
        tracing::debug!(resource = %reference, "Creating resource");
        self.run(&Operation::Create, &reference, Some(body)).await
    }

    /// Replaces a resource with a body carrying its `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Configuration`] if `id` is missing or malformed,
    /// or if the type has no resource-group mapping.
    pub async fn update<T: DeserializeOwned>(&self, body: Value) -> Result<T, ArmError> {
        let reference = ResourceReference::from_id(string_field(&body, "id")?)?;
        tracing::debug!(resource = %reference, "Updating resource");
        self.run(&Operation::Update, &reference, Some(body)).await
    }

    /// Deletes a resource by id, waiting for a long-running delete to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::NotFound`] if the resource is already absent.
    pub async fn delete(&self, id: &str) -> Result<(), ArmError> {
        let reference = ResourceReference::from_id(id)?;
        tracing::debug!(resource = %reference, "Deleting resource");
        self.run::<Value>(&Operation::Delete, &reference, None).await?;
        Ok(())
    }

    /// Performs a named action on a resource (e.g. `start`, `powerOff`).
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::NotFound`] if the resource does not exist and
    /// [`ArmError::AsyncFailed`] if a long-running action fails.
    pub async fn perform_action<T: DeserializeOwned>(
        &self,
        id: &str,
        action: &str,
        body: Option<Value>,
    ) -> Result<T, ArmError> {
        let reference = ResourceReference::from_id(id)?;
        tracing::debug!(resource = %reference, action, "Performing action");
        self.run(&Operation::Action(action.to_string()), &reference, body)
            .await
    }

    /// Checks whether a name is available for a resource provider or type.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Configuration`] without a subscription.
    pub async fn check_name_availability<T: DeserializeOwned>(
        &self,
        resource_type: &str,
        body: Value,
    ) -> Result<T, ArmError> {
        let reference = ResourceReference::new(resource_type, "");
        self.run(&Operation::CheckNameAvailability, &reference, Some(body))
            .await
    }

    /// Returns the region catalog, discovering it on first use.
    ///
    /// Without a subscription the catalog has no regions.
    ///
    /// # Errors
    ///
    /// Returns any error of the discovery requests. A failed discovery is
    /// retried on the next call.
    pub async fn regions(&self) -> Result<&RegionCatalog, ArmError> {
        self.inner
            .regions
            .get_or_try_init(|| self.discover_regions())
            .await
    }

    async fn discover_regions(&self) -> Result<RegionCatalog, ArmError> {
        let subscription = self.inner.subscription.as_ref();
        let regions: Vec<Region> = match subscription {
            Some(_) => self.list("locations").await?,
            None => Vec::new(),
        };

        let subscriptions: Vec<SubscriptionInfo> = self.list_subscriptions().await?;
        let subscription_name = subscription.and_then(|ours| {
            subscriptions
                .into_iter()
                .find(|s| s.subscription_id == ours.as_ref())
                .map(|s| s.display_name)
        });

        tracing::debug!(regions = regions.len(), "Discovered regions");
        Ok(RegionCatalog::new(regions, subscription, subscription_name))
    }

    /// Finds a region by its global id (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::NotFound`] if no region matches.
    pub async fn region_by_id(&self, id: &str) -> Result<Region, ArmError> {
        let catalog = self.regions().await?;
        catalog
            .by_id(id)
            .cloned()
            .ok_or_else(|| region_not_found(id))
    }

    /// Finds a region by name (e.g. `eastus`).
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::NotFound`] if no region matches.
    pub async fn region(&self, name: &str) -> Result<Region, ArmError> {
        let catalog = self.regions().await?;
        catalog
            .by_name(name)
            .cloned()
            .ok_or_else(|| region_not_found(name))
    }

    /// Returns the first listed region.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::NotFound`] if the catalog is empty.
    pub async fn default_region(&self) -> Result<Region, ArmError> {
        let catalog = self.regions().await?;
        catalog
            .default_region()
            .cloned()
            .ok_or_else(|| region_not_found("default"))
    }

    /// Lists the resources of one capability that live in `region`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`list_all`](Self::list_all).
    pub async fn list_in_region<T: DeserializeOwned>(
        &self,
        region: &Region,
        capability: Capability,
    ) -> Result<Vec<T>, ArmError> {
        let resources: Vec<Value> = self.list_all(capability.resource_type()).await?;
        resources
            .into_iter()
            .filter(|resource| is_in_region(resource, region))
            .map(|resource| into_typed(200, resource))
            .collect()
    }
}

fn string_field<'a>(body: &'a Value, field: &'static str) -> Result<&'a str, ConfigError> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingField { field })
}

fn region_not_found(key: &str) -> ArmError {
    ArmError::NotFound {
        url: format!("region:{key}"),
        body: String::new(),
    }
}
