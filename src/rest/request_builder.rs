//! Request construction.
//!
//! The [`RequestBuilder`] turns an [`Operation`] and a [`ResourceReference`]
//! into a fully qualified [`HttpRequest`]: base endpoint, resource path and
//! the `api-version` query parameter resolved from the version table.
//!
//! All validation happens here, before any network call:
//!
//! - `List`, `Create` and `CheckNameAvailability` need a subscription.
//! - `Create` and `Update` need a default resource group for the type.
//! - `Create` needs a name; id-addressed operations need an id.
//!
//! `List` takes the version registered for exactly its resource type and
//! falls back to the table default; every other operation resolves the
//! longest contained prefix.

use serde_json::Value;

use crate::clients::{HttpMethod, HttpRequest};
use crate::config::{ApiVersion, ArmConfig, Endpoint, ResourceGroupTable, SubscriptionId, VersionTable};
use crate::error::ConfigError;
use crate::rest::ResourceReference;

/// The kind of request to build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    /// GET a resource by id.
    Get,
    /// GET the collection of a resource type.
    List,
    /// PUT a new resource into the type's default resource group.
    Create,
    /// PUT a modified resource back to its id.
    Update,
    /// DELETE a resource by id.
    Delete,
    /// POST a named action to a resource (e.g. `start`, `powerOff`).
    Action(String),
    /// POST a name availability check for a resource type.
    CheckNameAvailability,
}

impl Operation {
    /// Returns the HTTP method used for this operation.
    #[must_use]
    pub const fn http_method(&self) -> HttpMethod {
        match self {
            Self::Get | Self::List => HttpMethod::Get,
            Self::Create | Self::Update => HttpMethod::Put,
            Self::Delete => HttpMethod::Delete,
            Self::Action(_) | Self::CheckNameAvailability => HttpMethod::Post,
        }
    }
}

/// Appends the `api-version` query parameter to a path.
///
/// # Example
///
/// ```rust
/// use azure_arm::rest::with_api_version;
/// use azure_arm::ApiVersion;
///
/// let version: ApiVersion = "2018-06-01".parse().unwrap();
/// assert_eq!(with_api_version("/a", &version), "/a?api-version=2018-06-01");
/// assert_eq!(with_api_version("/a?b=c", &version), "/a?b=c&api-version=2018-06-01");
/// ```
#[must_use]
pub fn with_api_version(path: &str, version: &ApiVersion) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}api-version={version}")
}

/// Builds fully qualified requests from resource references.
///
/// # Example
///
/// ```rust
/// use azure_arm::rest::{Operation, RequestBuilder, ResourceReference};
/// use azure_arm::{ArmConfig, SubscriptionId};
///
/// let config = ArmConfig::default();
/// let subscription = SubscriptionId::new("sub-1").unwrap();
/// let builder = RequestBuilder::new(&config, Some(&subscription));
///
/// let reference = ResourceReference::from_id(
///     "/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/vm1",
/// )
/// .unwrap();
/// let request = builder
///     .build(&Operation::Action("start".to_string()), &reference, None)
///     .unwrap();
///
/// assert_eq!(
///     request.url,
///     "https://management.azure.com/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/vm1/start?api-version=2018-04-01"
/// );
/// ```
#[derive(Clone, Copy, Debug)]
pub struct RequestBuilder<'a> {
    endpoint: &'a Endpoint,
    versions: &'a VersionTable,
    resource_groups: &'a ResourceGroupTable,
    subscription: Option<&'a SubscriptionId>,
}

impl<'a> RequestBuilder<'a> {
    /// Creates a builder over the client configuration.
    #[must_use]
    pub const fn new(config: &'a ArmConfig, subscription: Option<&'a SubscriptionId>) -> Self {
        Self {
            endpoint: config.base_endpoint(),
            versions: config.version_table(),
            resource_groups: config.resource_groups(),
            subscription,
        }
    }

    /// Returns the subscription or a configuration error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSubscription`] if the client has none.
    pub fn subscription(&self) -> Result<&'a SubscriptionId, ConfigError> {
        self.subscription.ok_or(ConfigError::MissingSubscription)
    }

    /// Returns the default resource group of a type or a configuration error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingResourceGroup`] if the type has no mapping.
    pub fn resource_group(&self, resource_type: &str) -> Result<&'a str, ConfigError> {
        self.resource_groups
            .get(resource_type)
            .ok_or_else(|| ConfigError::MissingResourceGroup {
                resource_type: resource_type.to_string(),
            })
    }

    /// Joins a path onto the endpoint and appends the given version.
    #[must_use]
    pub fn url(&self, path: &str, version: &ApiVersion) -> String {
        self.endpoint.join(&with_api_version(path, version))
    }

    /// Builds the request for `operation` on `reference`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a precondition of the operation is not met.
    pub fn build(
        &self,
        operation: &Operation,
        reference: &ResourceReference,
        body: Option<Value>,
    ) -> Result<HttpRequest, ConfigError> {
        let method = operation.http_method();
        let resource_type = reference.resource_type();

        let (path, version) = match operation {
            Operation::Get | Operation::Delete => {
                let id = Self::id_of(reference)?;
                (id.to_string(), self.versions.resolve(id))
            }
            Operation::Action(action) => {
                let id = Self::id_of(reference)?;
                if action.trim().is_empty() {
                    return Err(ConfigError::MissingField { field: "action" });
                }
                (format!("{id}/{action}"), self.versions.resolve(id))
            }
            Operation::Update => {
                let id = Self::id_of(reference)?;
                self.resource_group(resource_type)?;
                (id.to_string(), self.versions.resolve(id))
            }
            Operation::List => {
                let subscription = self.subscription()?;
                Self::require_type(resource_type)?;
                let path = match reference.resource_group() {
                    Some(group) => format!(
                        "/subscriptions/{subscription}/resourceGroups/{group}/providers/{resource_type}"
                    ),
                    None => format!("/subscriptions/{subscription}/providers/{resource_type}"),
                };
                // Collections are versioned by exact type only.
                let version = self
                    .versions
                    .get(resource_type)
                    .unwrap_or_else(|| self.versions.default_version());
                (path, version)
            }
            Operation::Create => {
                let subscription = self.subscription()?;
                Self::require_type(resource_type)?;
                let group = self.resource_group(resource_type)?;
                if reference.name().trim().is_empty() {
                    return Err(ConfigError::MissingField { field: "name" });
                }
                let name = urlencoding::encode(reference.name());
                (
                    format!(
                        "/subscriptions/{subscription}/resourceGroups/{group}/providers/{resource_type}/{name}"
                    ),
                    self.versions.resolve(resource_type),
                )
            }
            Operation::CheckNameAvailability => {
                let subscription = self.subscription()?;
                Self::require_type(resource_type)?;
                let path = format!(
                    "/subscriptions/{subscription}/providers/{resource_type}/checkNameAvailability"
                );
                let version = self.versions.resolve(&path);
                (path, version)
            }
        };

        let mut request = HttpRequest::new(method, self.url(&path, version));
        if let Some(body) = body {
            request = request.with_body(body);
        }
        request.verify()?;
        Ok(request)
    }

    fn id_of(reference: &ResourceReference) -> Result<&str, ConfigError> {
        reference
            .resource_id()
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::MissingField { field: "id" })
    }

    fn require_type(resource_type: &str) -> Result<(), ConfigError> {
        if resource_type.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "type" });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DISK_ID: &str =
        "/subscriptions/sub-1/resourceGroups/rg-1/providers/Microsoft.Compute/disks/d1";

    fn config() -> ArmConfig {
        ArmConfig::builder()
            .base_endpoint("https://arm.test")
            .resource_groups(
                ResourceGroupTable::builder()
                    .entry("Microsoft.Compute/disks", "disks-rg")
                    .build(),
            )
            .build()
            .unwrap()
    }

    fn subscription() -> SubscriptionId {
        SubscriptionId::new("sub-1").unwrap()
    }

    // ========================================================================
    // Id-addressed operations
    // ========================================================================

    #[test]
    fn test_get_uses_id_and_resolved_version() {
        let config = config();
        let builder = RequestBuilder::new(&config, None);
        let reference = ResourceReference::from_id(DISK_ID).unwrap();
        let request = builder.build(&Operation::Get, &reference, None).unwrap();

        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(
            request.url,
            format!("https://arm.test{DISK_ID}?api-version=2018-06-01")
        );
    }

    #[test]
    fn test_delete_without_id_fails() {
        let config = config();
        let builder = RequestBuilder::new(&config, None);
        let reference = ResourceReference::new("Microsoft.Compute/disks", "d1");
        assert_eq!(
            builder.build(&Operation::Delete, &reference, None),
            Err(ConfigError::MissingField { field: "id" })
        );
    }

    #[test]
    fn test_action_appends_segment() {
        let config = config();
        let builder = RequestBuilder::new(&config, None);
        let reference = ResourceReference::from_id(DISK_ID).unwrap();
        let request = builder
            .build(&Operation::Action("beginGetAccess".to_string()), &reference, None)
            .unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert!(request
            .url
            .starts_with(&format!("https://arm.test{DISK_ID}/beginGetAccess?")));
    }

    #[test]
    fn test_update_requires_resource_group_mapping() {
        let config = config();
        let builder = RequestBuilder::new(&config, None);
        let reference = ResourceReference::from_id(
            "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Compute/images/i1",
        )
        .unwrap();
        assert!(matches!(
            builder.build(&Operation::Update, &reference, Some(json!({}))),
            Err(ConfigError::MissingResourceGroup { .. })
        ));
    }

    // ========================================================================
    // Subscription-scoped operations
    // ========================================================================

    #[test]
    fn test_list_requires_subscription() {
        let config = config();
        let builder = RequestBuilder::new(&config, None);
        let reference = ResourceReference::new("Microsoft.Compute/disks", "");
        assert_eq!(
            builder.build(&Operation::List, &reference, None),
            Err(ConfigError::MissingSubscription)
        );
    }

    #[test]
    fn test_list_with_resource_group() {
        let config = config();
        let subscription = subscription();
        let builder = RequestBuilder::new(&config, Some(&subscription));
        let reference =
            ResourceReference::new("Microsoft.Compute/disks", "").with_resource_group("rg-9");
        let request = builder.build(&Operation::List, &reference, None).unwrap();
        assert_eq!(
            request.url,
            "https://arm.test/subscriptions/sub-1/resourceGroups/rg-9/providers/Microsoft.Compute/disks?api-version=2018-06-01"
        );
    }

    #[test]
    fn test_list_uses_exact_type_version() {
        let config = config();
        let subscription = subscription();
        let builder = RequestBuilder::new(&config, Some(&subscription));

        let reference = ResourceReference::new("Microsoft.Network/loadBalancers", "");
        let request = builder.build(&Operation::List, &reference, None).unwrap();
        assert_eq!(
            request.url,
            "https://arm.test/subscriptions/sub-1/providers/Microsoft.Network/loadBalancers?api-version=2016-02-01"
        );

        let reference = ResourceReference::new("microsoft.network/VIRTUALNETWORKS", "");
        let request = builder.build(&Operation::List, &reference, None).unwrap();
        assert!(request.url.ends_with("?api-version=2018-08-01"));
    }

    #[test]
    fn test_create_uses_default_resource_group() {
        let config = config();
        let subscription = subscription();
        let builder = RequestBuilder::new(&config, Some(&subscription));
        let reference = ResourceReference::new("Microsoft.Compute/disks", "new disk");
        let request = builder
            .build(&Operation::Create, &reference, Some(json!({"name": "new disk"})))
            .unwrap();
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(
            request.url,
            "https://arm.test/subscriptions/sub-1/resourceGroups/disks-rg/providers/Microsoft.Compute/disks/new%20disk?api-version=2018-06-01"
        );
    }

    #[test]
    fn test_create_preconditions() {
        let config = config();
        let subscription = subscription();
        let reference = ResourceReference::new("Microsoft.Compute/disks", "d1");

        let without_subscription = RequestBuilder::new(&config, None);
        assert_eq!(
            without_subscription.build(&Operation::Create, &reference, Some(json!({}))),
            Err(ConfigError::MissingSubscription)
        );

        let builder = RequestBuilder::new(&config, Some(&subscription));
        let unmapped = ResourceReference::new("Microsoft.Compute/images", "i1");
        assert!(matches!(
            builder.build(&Operation::Create, &unmapped, Some(json!({}))),
            Err(ConfigError::MissingResourceGroup { .. })
        ));

        let unnamed = ResourceReference::new("Microsoft.Compute/disks", " ");
        assert_eq!(
            builder.build(&Operation::Create, &unnamed, Some(json!({}))),
            Err(ConfigError::MissingField { field: "name" })
        );

        assert_eq!(
            builder.build(&Operation::Create, &reference, None),
            Err(ConfigError::MissingField { field: "body" })
        );
    }

    #[test]
    fn test_check_name_availability_path() {
        let config = config();
        let subscription = subscription();
        let builder = RequestBuilder::new(&config, Some(&subscription));
        let reference = ResourceReference::new("Microsoft.Storage", "");
        let request = builder
            .build(
                &Operation::CheckNameAvailability,
                &reference,
                Some(json!({"name": "acct", "type": "Microsoft.Storage/storageAccounts"})),
            )
            .unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(
            request.url,
            "https://arm.test/subscriptions/sub-1/providers/Microsoft.Storage/checkNameAvailability?api-version=2016-12-01"
        );
    }
}
