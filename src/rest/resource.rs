//! Resource references.
//!
//! A [`ResourceReference`] addresses one remote object. Objects that already
//! exist are addressed by their vendor-assigned id; objects about to be
//! created are addressed by type and name, the subscription and resource
//! group being filled in from client configuration.

use std::fmt;

use crate::config::SubscriptionId;
use crate::error::ConfigError;

/// A fully qualified address of one Resource Manager object.
///
/// # Example
///
/// ```rust
/// use azure_arm::rest::ResourceReference;
///
/// let reference = ResourceReference::from_id(
///     "/subscriptions/sub-1/resourceGroups/rg-1/providers/Microsoft.Compute/disks/disk-1",
/// )
/// .unwrap();
///
/// assert_eq!(reference.resource_type(), "Microsoft.Compute/disks");
/// assert_eq!(reference.name(), "disk-1");
/// assert_eq!(reference.resource_group(), Some("rg-1"));
/// assert_eq!(reference.subscription_id().unwrap().as_ref(), "sub-1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceReference {
    resource_type: String,
    resource_id: Option<String>,
    subscription_id: Option<SubscriptionId>,
    resource_group: Option<String>,
    name: String,
}

impl ResourceReference {
    /// Creates a reference to a resource that has no id yet.
    #[must_use]
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: None,
            subscription_id: None,
            resource_group: None,
            name: name.into(),
        }
    }

    /// Parses a vendor-assigned resource id.
    ///
    /// The resource type is the provider namespace followed by every type
    /// segment (`Microsoft.Network/virtualNetworks/subnets`). Ids without a
    /// `providers` segment take the last collection name as their type.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidResourceId`] if the id is empty, is not
    /// an absolute path, or has an incomplete provider section.
    pub fn from_id(id: &str) -> Result<Self, ConfigError> {
        let id = id.trim();
        let invalid = |reason| ConfigError::InvalidResourceId {
            id: id.to_string(),
            reason,
        };

        if id.is_empty() {
            return Err(invalid("the id is empty"));
        }
        if !id.starts_with('/') {
            return Err(invalid("the id must start with '/'"));
        }

        let segments: Vec<&str> = id
            .trim_end_matches('/')
            .split('/')
            .skip(1)
            .collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid("the id has an empty segment"));
        }

        let mut subscription_id = None;
        let mut resource_group = None;
        let mut resource_type = String::new();
        let mut i = 0;
        while i < segments.len() {
            let key = segments[i];
            if key.eq_ignore_ascii_case("providers") {
                let rest = &segments[i + 1..];
                if rest.len() < 3 || rest.len() % 2 == 0 {
                    return Err(invalid("the provider section is incomplete"));
                }
                let types: Vec<&str> = rest[1..].iter().step_by(2).copied().collect();
                resource_type = format!("{}/{}", rest[0], types.join("/"));
                break;
            }
            let value = segments.get(i + 1).copied();
            if key.eq_ignore_ascii_case("subscriptions") {
                subscription_id = value.and_then(|v| SubscriptionId::new(v).ok());
            } else if key.eq_ignore_ascii_case("resourceGroups") {
                resource_group = value.map(str::to_string);
            }
            resource_type = key.to_string();
            i += 2;
        }

        let name = segments.last().copied().unwrap_or_default().to_string();

        Ok(Self {
            resource_type,
            resource_id: Some(id.trim_end_matches('/').to_string()),
            subscription_id,
            resource_group,
            name,
        })
    }

    /// Sets the subscription.
    #[must_use]
    pub fn with_subscription(mut self, subscription_id: SubscriptionId) -> Self {
        self.subscription_id = Some(subscription_id);
        self
    }

    /// Sets the resource group.
    #[must_use]
    pub fn with_resource_group(mut self, resource_group: impl Into<String>) -> Self {
        self.resource_group = Some(resource_group.into());
        self
    }

    /// Returns the resource type (e.g. `Microsoft.Compute/disks`).
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the vendor-assigned id, if the resource exists.
    #[must_use]
    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    /// Returns the subscription, if known.
    #[must_use]
    pub const fn subscription_id(&self) -> Option<&SubscriptionId> {
        self.subscription_id.as_ref()
    }

    /// Returns the resource group, if known.
    #[must_use]
    pub fn resource_group(&self) -> Option<&str> {
        self.resource_group.as_deref()
    }

    /// Returns the resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource_id {
            Some(id) => f.write_str(id),
            None => write!(f, "{}/{}", self.resource_type, self.name),
        }
    }
}
