//! Default resource groups per resource type.
//!
//! Resources created through the facade are placed into the resource group
//! registered for their type. The table is loaded once and never mutated.

use std::collections::BTreeMap;

/// Immutable mapping from resource type to its default resource group.
///
/// Keys are matched case-insensitively.
///
/// # Example
///
/// ```rust
/// use azure_arm::ResourceGroupTable;
///
/// let table = ResourceGroupTable::builder()
///     .entry("Microsoft.Compute/disks", "onecloud-disks")
///     .build();
///
/// assert_eq!(table.get("microsoft.compute/DISKS"), Some("onecloud-disks"));
/// assert_eq!(table.get("Microsoft.Compute/images"), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceGroupTable {
    groups: BTreeMap<String, String>,
}

impl ResourceGroupTable {
    /// Creates a new builder for constructing a `ResourceGroupTable`.
    #[must_use]
    pub fn builder() -> ResourceGroupTableBuilder {
        ResourceGroupTableBuilder::default()
    }

    /// Returns the resource group registered for a resource type.
    #[must_use]
    pub fn get(&self, resource_type: &str) -> Option<&str> {
        self.groups
            .get(&resource_type.to_lowercase())
            .map(String::as_str)
    }

    /// Returns the number of registered resource types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if no resource type is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ResourceGroupTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::builder(), |builder, (k, v)| builder.entry(k, v))
            .build()
    }
}

/// Builder for constructing [`ResourceGroupTable`] instances.
#[derive(Debug, Default)]
pub struct ResourceGroupTableBuilder {
    groups: BTreeMap<String, String>,
}

impl ResourceGroupTableBuilder {
    /// Registers the default resource group for a resource type.
    #[must_use]
    pub fn entry(mut self, resource_type: impl Into<String>, group: impl Into<String>) -> Self {
        self.groups
            .insert(resource_type.into().to_lowercase(), group.into());
        self
    }

    /// Builds the table.
    #[must_use]
    pub fn build(self) -> ResourceGroupTable {
        ResourceGroupTable {
            groups: self.groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = ResourceGroupTable::builder()
            .entry("Microsoft.Network/virtualNetworks", "net-rg")
            .build();
        assert_eq!(table.get("MICROSOFT.NETWORK/VIRTUALNETWORKS"), Some("net-rg"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_collect_from_pairs() {
        let table: ResourceGroupTable = [
            ("Microsoft.Compute/disks", "disk-rg"),
            ("Microsoft.Compute/snapshots", "snap-rg"),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.get("Microsoft.Compute/snapshots"), Some("snap-rg"));
        assert!(!table.is_empty());
    }

    #[test]
    fn test_empty_table_has_no_mappings() {
        let table = ResourceGroupTable::default();
        assert!(table.get("Microsoft.Compute/disks").is_none());
    }
}
