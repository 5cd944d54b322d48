//! Azure cloud environments.
//!
//! Each sovereign cloud has its own Resource Manager and Active Directory
//! endpoints. Environments are looked up by their conventional names.

use crate::config::Endpoint;
use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// An Azure cloud environment.
///
/// # Example
///
/// ```rust
/// use azure_arm::CloudEnvironment;
///
/// let env: CloudEnvironment = "AzureChinaCloud".parse().unwrap();
/// assert_eq!(env, CloudEnvironment::AzureChina);
/// assert_eq!(env.resource_manager_endpoint(), "https://management.chinacloudapi.cn");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CloudEnvironment {
    /// The global Azure cloud.
    #[default]
    AzurePublic,
    /// Azure operated by 21Vianet in China.
    AzureChina,
    /// Azure US Government.
    AzureUsGovernment,
    /// Azure Germany.
    AzureGerman,
}

impl CloudEnvironment {
    /// Returns the Resource Manager endpoint for this environment.
    #[must_use]
    pub const fn resource_manager_endpoint(&self) -> &'static str {
        match self {
            Self::AzurePublic => "https://management.azure.com",
            Self::AzureChina => "https://management.chinacloudapi.cn",
            Self::AzureUsGovernment => "https://management.usgovcloudapi.net",
            Self::AzureGerman => "https://management.microsoftazure.de",
        }
    }

    /// Returns the Active Directory endpoint (with trailing slash) for this environment.
    #[must_use]
    pub const fn active_directory_endpoint(&self) -> &'static str {
        match self {
            Self::AzurePublic => "https://login.microsoftonline.com/",
            Self::AzureChina => "https://login.chinacloudapi.cn/",
            Self::AzureUsGovernment => "https://login.microsoftonline.us/",
            Self::AzureGerman => "https://login.microsoftonline.de/",
        }
    }

    /// Returns the token audience for Resource Manager requests.
    ///
    /// Azure Active Directory expects the audience with a trailing slash.
    #[must_use]
    pub fn token_resource(&self) -> String {
        format!("{}/", self.resource_manager_endpoint())
    }

    /// Returns the Resource Manager endpoint as a validated [`Endpoint`].
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::from_static(self.resource_manager_endpoint())
    }

    /// Returns the conventional environment name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AzurePublic => "AzurePublicCloud",
            Self::AzureChina => "AzureChinaCloud",
            Self::AzureUsGovernment => "AzureUSGovernmentCloud",
            Self::AzureGerman => "AzureGermanCloud",
        }
    }
}

impl fmt::Display for CloudEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CloudEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "azurepubliccloud" | "azurecloud" | "public" => Ok(Self::AzurePublic),
            "azurechinacloud" | "china" => Ok(Self::AzureChina),
            "azureusgovernmentcloud" | "azureusgovernment" | "usgovernment" => {
                Ok(Self::AzureUsGovernment)
            }
            "azuregermancloud" | "german" => Ok(Self::AzureGerman),
            _ => Err(ConfigError::UnknownEnvironment {
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_environment_names() {
        assert_eq!(
            "AzurePublicCloud".parse::<CloudEnvironment>().unwrap(),
            CloudEnvironment::AzurePublic
        );
        assert_eq!(
            "azureusgovernmentcloud".parse::<CloudEnvironment>().unwrap(),
            CloudEnvironment::AzureUsGovernment
        );
        assert_eq!(
            "AzureGermanCloud".parse::<CloudEnvironment>().unwrap(),
            CloudEnvironment::AzureGerman
        );
        assert!(matches!(
            "Mars".parse::<CloudEnvironment>(),
            Err(ConfigError::UnknownEnvironment { .. })
        ));
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for env in [
            CloudEnvironment::AzurePublic,
            CloudEnvironment::AzureChina,
            CloudEnvironment::AzureUsGovernment,
            CloudEnvironment::AzureGerman,
        ] {
            assert_eq!(env.to_string().parse::<CloudEnvironment>().unwrap(), env);
        }
    }

    #[test]
    fn test_endpoints_are_valid() {
        let env = CloudEnvironment::default();
        assert_eq!(env.endpoint().as_ref(), "https://management.azure.com");
        assert_eq!(env.token_resource(), "https://management.azure.com/");
        assert!(env.active_directory_endpoint().ends_with('/'));
    }
}
