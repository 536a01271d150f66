//! Wire types for the provider registry JSON schema.

use serde::Deserialize;

/// Top-level registry search response.
#[derive(Debug, Default, Deserialize)]
pub struct RegistryResponse {
    #[serde(default)]
    pub result_count: i64,
    #[serde(default)]
    pub results: Vec<RegistryRecord>,
}

/// One raw candidate record as returned by the registry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryRecord {
    /// The registry identifier (NPI number).
    #[serde(default)]
    pub number: Option<i64>,
    #[serde(default)]
    pub basic: RegistryBasic,
    #[serde(default)]
    pub addresses: Vec<RegistryAddress>,
    #[serde(default)]
    pub taxonomies: Vec<RegistryTaxonomy>,
}

impl RegistryRecord {
    /// The practice location: the first LOCATION-purpose address, falling back
    /// to whatever address is listed first.
    pub fn practice_address(&self) -> Option<&RegistryAddress> {
        self.addresses
            .iter()
            .find(|a| a.address_purpose == "LOCATION")
            .or_else(|| self.addresses.first())
    }

    /// Description of the primary taxonomy entry, if one is flagged.
    pub fn primary_specialty(&self) -> Option<&str> {
        self.taxonomies
            .iter()
            .find(|t| t.primary)
            .and_then(|t| t.desc.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryBasic {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub credential: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub enumeration_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryAddress {
    #[serde(default)]
    pub address_purpose: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub organization_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryTaxonomy {
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
}
