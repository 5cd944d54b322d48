//! Azure Resource Manager API version definitions.
//!
//! This module provides the [`ApiVersion`] newtype and the [`VersionTable`]
//! that maps resource types to the `api-version` they must be addressed with.

use crate::error::ConfigError;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// The version used when no table entry matches a resource path.
pub const DEFAULT_API_VERSION: &str = "2016-02-01";

/// An Azure Resource Manager API version.
///
/// Versions are date strings (`YYYY-MM-DD`), optionally followed by a
/// suffix such as `-preview`. Versions order chronologically; for the same
/// date a suffixed (pre-release) version sorts before the plain one.
///
/// # Example
///
/// ```rust
/// use azure_arm::ApiVersion;
///
/// let version: ApiVersion = "2018-06-01".parse().unwrap();
/// assert_eq!(version.to_string(), "2018-06-01");
/// assert!(version.is_stable());
///
/// let preview: ApiVersion = "2016-04-30-preview".parse().unwrap();
/// assert!(!preview.is_stable());
/// assert!(preview < version);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiVersion {
    raw: String,
}

impl ApiVersion {
    /// Returns the version used when nothing more specific applies.
    #[must_use]
    pub fn default_version() -> Self {
        Self {
            raw: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Returns the version string as sent in the `api-version` query parameter.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the `YYYY-MM-DD` part of the version.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.raw[..10]
    }

    /// Returns the suffix after the date (without the leading `-`), if any.
    #[must_use]
    pub fn suffix(&self) -> Option<&str> {
        self.raw.get(11..).filter(|s| !s.is_empty())
    }

    /// Returns `true` if this version has no pre-release suffix.
    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.suffix().is_none()
    }

    fn is_valid_version_format(s: &str) -> bool {
        if !s.is_ascii() || s.len() < 10 {
            return false;
        }

        let date = &s[..10];
        let parts: Vec<&str> = date.split('-').collect();
        if parts.len() != 3 {
            return false;
        }
        let (year, month, day) = (parts[0], parts[1], parts[2]);
        if year.len() != 4 || month.len() != 2 || day.len() != 2 {
            return false;
        }
        if ![year, month, day]
            .iter()
            .all(|part| part.chars().all(|c| c.is_ascii_digit()))
        {
            return false;
        }

        let month: u32 = month.parse().unwrap_or(0);
        let day: u32 = day.parse().unwrap_or(0);
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return false;
        }

        // Optional "-suffix" of alphanumerics
        match s.get(10..) {
            None | Some("") => true,
            Some(rest) => {
                rest.len() > 1
                    && rest.starts_with('-')
                    && rest[1..].chars().all(|c| c.is_ascii_alphanumeric())
            }
        }
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::default_version()
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date()
            .cmp(other.date())
            .then_with(|| match (self.suffix(), other.suffix()) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if Self::is_valid_version_format(&s) {
            Ok(Self { raw: s })
        } else {
            Err(ConfigError::InvalidApiVersion { version: s })
        }
    }
}

/// Built-in resource-type to version entries.
const AZURE_DEFAULT_VERSIONS: &[(&str, &str)] = &[
    ("Microsoft.Compute/virtualMachines", "2018-04-01"),
    ("Microsoft.ClassicCompute/virtualMachines", "2017-04-01"),
    ("Microsoft.Compute/operations", "2018-10-01"),
    ("Microsoft.ClassicCompute/operations", "2017-04-01"),
    ("Microsoft.Network/virtualNetworks", "2018-08-01"),
    ("Microsoft.ClassicNetwork/virtualNetworks", "2017-11-15"),
    ("Microsoft.Compute/disks", "2018-06-01"),
    ("Microsoft.Storage/storageAccounts", "2016-12-01"),
    ("Microsoft.ClassicStorage/storageAccounts", "2016-04-01"),
    ("Microsoft.Compute/snapshots", "2018-06-01"),
    ("Microsoft.Compute/images", "2018-10-01"),
    ("Microsoft.Storage", "2016-12-01"),
    ("Microsoft.Network/publicIPAddresses", "2018-06-01"),
    ("Microsoft.Network/networkSecurityGroups", "2018-06-01"),
    ("Microsoft.Network/networkInterfaces", "2018-06-01"),
    ("Microsoft.Network", "2018-06-01"),
    ("Microsoft.ClassicNetwork/reservedIps", "2016-04-01"),
    ("Microsoft.ClassicNetwork/networkSecurityGroups", "2016-11-01"),
];

#[derive(Clone, Debug, PartialEq, Eq)]
struct VersionEntry {
    prefix: String,
    lowered: String,
    version: ApiVersion,
}

/// Immutable mapping from resource-type prefixes to API versions.
///
/// # Resolution Rule
///
/// [`resolve`](Self::resolve) looks for every prefix contained anywhere in
/// the input (case-insensitive). The longest matching prefix wins. When two
/// matching prefixes have the same length, the one that sorts first
/// (case-insensitive, ascending) wins. No match yields the table's default
/// version.
///
/// Entries are sorted once at construction, so resolution never depends on
/// insertion order.
///
/// # Example
///
/// ```rust
/// use azure_arm::{ApiVersion, VersionTable};
///
/// let table = VersionTable::azure_defaults();
///
/// // The more specific "Microsoft.Storage/storageAccounts" beats "Microsoft.Storage"
/// let version = table.resolve("/subscriptions/s/providers/Microsoft.Storage/storageAccounts");
/// assert_eq!(version.as_str(), "2016-12-01");
///
/// // Unknown types fall back to the default version
/// assert_eq!(table.resolve("Contoso.Widgets/gadgets"), &ApiVersion::default_version());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionTable {
    entries: Vec<VersionEntry>,
    default_version: ApiVersion,
}

impl VersionTable {
    /// Creates a new builder for constructing a `VersionTable`.
    #[must_use]
    pub fn builder() -> VersionTableBuilder {
        VersionTableBuilder::default()
    }

    /// Returns the built-in table of Azure resource-type versions.
    #[must_use]
    pub fn azure_defaults() -> Self {
        let mut builder = Self::builder();
        for (prefix, version) in AZURE_DEFAULT_VERSIONS {
            builder = builder.entry_unchecked(prefix, version);
        }
        builder.build()
    }

    /// Resolves the API version for a resource type or full resource path.
    ///
    /// This never fails: with no matching entry the default version is returned.
    #[must_use]
    pub fn resolve(&self, resource_type_or_path: &str) -> &ApiVersion {
        let haystack = resource_type_or_path.to_lowercase();
        self.entries
            .iter()
            .find(|entry| haystack.contains(&entry.lowered))
            .map_or(&self.default_version, |entry| &entry.version)
    }

    /// Returns the version registered for exactly this resource type, if any.
    #[must_use]
    pub fn get(&self, resource_type: &str) -> Option<&ApiVersion> {
        let lowered = resource_type.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.lowered == lowered)
            .map(|entry| &entry.version)
    }

    /// Returns the version used when no entry matches.
    #[must_use]
    pub const fn default_version(&self) -> &ApiVersion {
        &self.default_version
    }

    /// Returns the number of entries in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(prefix, version)` pairs in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ApiVersion)> {
        self.entries
            .iter()
            .map(|entry| (entry.prefix.as_str(), &entry.version))
    }
}

impl Default for VersionTable {
    fn default() -> Self {
        Self::azure_defaults()
    }
}

/// Builder for constructing [`VersionTable`] instances.
///
/// Adding the same prefix twice (case-insensitive) keeps the last version.
#[derive(Debug, Default)]
pub struct VersionTableBuilder {
    entries: Vec<(String, ApiVersion)>,
    default_version: Option<ApiVersion>,
}

impl VersionTableBuilder {
    /// Adds a prefix with an already validated version.
    #[must_use]
    pub fn entry(mut self, prefix: impl Into<String>, version: ApiVersion) -> Self {
        let prefix = prefix.into();
        let lowered = prefix.to_lowercase();
        self.entries
            .retain(|(existing, _)| existing.to_lowercase() != lowered);
        self.entries.push((prefix, version));
        self
    }

    /// Adds a prefix, parsing the version string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiVersion`] if the version is malformed.
    pub fn entry_str(self, prefix: impl Into<String>, version: &str) -> Result<Self, ConfigError> {
        let version = version.parse()?;
        Ok(self.entry(prefix, version))
    }

    // Only used for the compile-time table, whose versions are known to be valid.
    fn entry_unchecked(self, prefix: &str, version: &str) -> Self {
        self.entry(
            prefix,
            ApiVersion {
                raw: version.to_string(),
            },
        )
    }

    /// Sets the version used when no entry matches.
    #[must_use]
    pub fn default_version(mut self, version: ApiVersion) -> Self {
        self.default_version = Some(version);
        self
    }

    /// Builds the table, fixing the resolution order.
    #[must_use]
    pub fn build(self) -> VersionTable {
        let mut entries: Vec<VersionEntry> = self
            .entries
            .into_iter()
            .filter(|(prefix, _)| !prefix.is_empty())
            .map(|(prefix, version)| VersionEntry {
                lowered: prefix.to_lowercase(),
                prefix,
                version,
            })
            .collect();

        entries.sort_by(|a, b| {
            b.lowered
                .len()
                .cmp(&a.lowered.len())
                .then_with(|| a.lowered.cmp(&b.lowered))
        });

        VersionTable {
            entries,
            default_version: self.default_version.unwrap_or_default(),
        }
    }
}
