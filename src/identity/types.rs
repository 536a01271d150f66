use serde::{Deserialize, Serialize};
use std::fmt;

/// Which source produced the resolved identity.
///
/// A payments-store hit is authoritative: it indicates a payment history
/// already keyed to a verified identifier, so it always wins over a registry
/// lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentitySource {
    PaymentsStore,
    Registry,
}

impl fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentitySource::PaymentsStore => write!(f, "payments store"),
            IdentitySource::Registry => write!(f, "registry"),
        }
    }
}

/// One specialty classification attached to a registry candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecialtyListing {
    pub specialty: String,
    pub primary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

/// A scored candidate identity, one per raw registry hit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderCandidate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumeration_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_in_practice: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_specialties: Vec<SpecialtyListing>,
    pub score: i64,
}

/// The chosen candidate plus provenance and ranked alternates.
///
/// Alternates are the candidates ranked immediately after the winner; they are
/// retained for disclosure, never silently discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedProvider {
    pub provider: ProviderCandidate,
    pub source: IdentitySource,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternates: Vec<ProviderCandidate>,
}

/// Always-present result of identity resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityResult {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl IdentityResult {
    pub fn resolved(provider: ProviderCandidate, source: IdentitySource, alternates: Vec<ProviderCandidate>) -> Self {
        IdentityResult {
            found: true,
            resolved: Some(ResolvedProvider {
                provider,
                source,
                alternates,
            }),
            diagnostic: None,
        }
    }

    pub fn not_found(diagnostic: impl Into<String>) -> Self {
        IdentityResult {
            found: false,
            resolved: None,
            diagnostic: Some(diagnostic.into()),
        }
    }

    pub fn external_id(&self) -> Option<&str> {
        self.resolved
            .as_ref()
            .and_then(|r| r.provider.external_id.as_deref())
    }
}
