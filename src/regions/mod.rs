//! Regions, capabilities and subscription summaries.
//!
//! A [`Region`] is one Azure location of the client's subscription. Rather
//! than exposing a region handle that implements every kind of cloud
//! resource, callers ask for a fixed [`Capability`] and get back the
//! resources of the matching type whose `location` is the region's name.
//!
//! # Example
//!
//! ```rust,ignore
//! use azure_arm::{Capability, ResourceClient};
//!
//! let region = client.region("eastus").await?;
//! let disks: Vec<serde_json::Value> = client.list_in_region(&region, Capability::Disks).await?;
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::SubscriptionId;

/// An Azure location available to a subscription.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// The location id (`/subscriptions/<sub>/locations/<name>`).
    #[serde(default)]
    pub id: String,
    /// The programmatic name (e.g. `eastus`).
    pub name: String,
    /// The human-readable name (e.g. `East US`).
    #[serde(default)]
    pub display_name: String,
    /// Latitude in degrees.
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,
    /// The subscription the location was listed for.
    #[serde(default)]
    pub subscription_id: Option<String>,
}

impl Region {
    /// Returns the id used for case-insensitive lookups.
    #[must_use]
    pub fn global_id(&self) -> &str {
        &self.id
    }
}

/// Coordinates come back as strings from the locations endpoint.
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Coordinate {
        Number(f64),
        Text(String),
    }

    Ok(
        Option::<Coordinate>::deserialize(deserializer)?.and_then(|c| match c {
            Coordinate::Number(n) => Some(n),
            Coordinate::Text(t) => t.trim().parse().ok(),
        }),
    )
}

/// A kind of resource a region can be queried for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Virtual machines hosted in the region.
    Hosts,
    /// Virtual networks.
    Networks,
    /// Storage accounts.
    Storages,
    /// Images used to provision disks.
    StorageCaches,
    /// Managed disks.
    Disks,
    /// Disk snapshots.
    Snapshots,
    /// Public IP addresses.
    PublicIps,
    /// Network security groups.
    SecurityGroups,
    /// Network interfaces.
    NetworkInterfaces,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Hosts,
        Self::Networks,
        Self::Storages,
        Self::StorageCaches,
        Self::Disks,
        Self::Snapshots,
        Self::PublicIps,
        Self::SecurityGroups,
        Self::NetworkInterfaces,
    ];

    /// Returns the resource type listed for this capability.
    #[must_use]
    pub const fn resource_type(&self) -> &'static str {
        match self {
            Self::Hosts => "Microsoft.Compute/virtualMachines",
            Self::Networks => "Microsoft.Network/virtualNetworks",
            Self::Storages => "Microsoft.Storage/storageAccounts",
            Self::StorageCaches => "Microsoft.Compute/images",
            Self::Disks => "Microsoft.Compute/disks",
            Self::Snapshots => "Microsoft.Compute/snapshots",
            Self::PublicIps => "Microsoft.Network/publicIPAddresses",
            Self::SecurityGroups => "Microsoft.Network/networkSecurityGroups",
            Self::NetworkInterfaces => "Microsoft.Network/networkInterfaces",
        }
    }
}

/// Returns `true` if a listed resource lives in `region`.
#[must_use]
pub fn is_in_region(resource: &Value, region: &Region) -> bool {
    resource
        .get("location")
        .and_then(Value::as_str)
        .is_some_and(|location| location == region.name)
}

/// A subscription visible to the credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInfo {
    /// The subscription id.
    pub subscription_id: String,
    /// The human-readable name.
    #[serde(default)]
    pub display_name: String,
    /// The subscription state (e.g. `Enabled`).
    #[serde(default)]
    pub state: Option<String>,
}

/// Summary of the subscriptions visible to the credential.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubAccounts {
    /// Number of subscriptions.
    pub total: usize,
    /// The raw subscription objects.
    pub data: Vec<Value>,
}

impl SubAccounts {
    /// Builds the summary from the listed subscriptions.
    #[must_use]
    pub fn from_subscriptions(data: Vec<Value>) -> Self {
        Self {
            total: data.len(),
            data,
        }
    }
}

/// The regions of the client's subscription, discovered once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegionCatalog {
    regions: Vec<Region>,
    subscription_name: Option<String>,
}

impl RegionCatalog {
    /// Builds a catalog, stamping each region with the subscription.
    #[must_use]
    pub fn new(
        mut regions: Vec<Region>,
        subscription: Option<&SubscriptionId>,
        subscription_name: Option<String>,
    ) -> Self {
        if let Some(subscription) = subscription {
            for region in &mut regions {
                region.subscription_id = Some(subscription.to_string());
            }
        }
        Self {
            regions,
            subscription_name,
        }
    }

    /// Returns every region, in the order the server listed them.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Returns the display name of the client's subscription, if found.
    #[must_use]
    pub fn subscription_name(&self) -> Option<&str> {
        self.subscription_name.as_deref()
    }

    /// Finds a region by its global id (case-insensitive).
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&Region> {
        self.regions
            .iter()
            .find(|region| region.global_id().eq_ignore_ascii_case(id))
    }

    /// Finds a region by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|region| region.name == name)
    }

    /// Returns the first listed region.
    #[must_use]
    pub fn default_region(&self) -> Option<&Region> {
        self.regions.first()
    }
}
