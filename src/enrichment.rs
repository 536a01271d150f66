//! Best-effort education and training enrichment.
//!
//! Directory scrapers are optional collaborators whose output is a bag of
//! unverified strings; the engine never depends on one being wired in. The
//! specialty-to-society inference is pure and always available.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::name::NormalizedName;

/// Unverified biographical strings gathered from public directories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EducationProfile {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_school: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graduation_year: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub residency: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fellowships: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub board_certifications: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub professional_organizations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

/// Directory-scraper collaborator contract.
#[async_trait]
pub trait EducationSource: Send + Sync {
    async fn lookup(
        &self,
        name: &NormalizedName,
        city: Option<&str>,
        state: Option<&str>,
        specialty: Option<&str>,
    ) -> Result<EducationProfile>;
}

/// Stand-in for deployments without a directory scraper.
pub struct NoEducationSource;

#[async_trait]
impl EducationSource for NoEducationSource {
    async fn lookup(
        &self,
        _name: &NormalizedName,
        _city: Option<&str>,
        _state: Option<&str>,
        _specialty: Option<&str>,
    ) -> Result<EducationProfile> {
        Ok(EducationProfile::default())
    }
}

/// Professional societies a provider with this specialty is likely to belong
/// to. Membership is inferred, not verified.
pub fn likely_societies(specialty: &str) -> Vec<&'static str> {
    let specialty_lower = specialty.to_lowercase();
    let mut societies = Vec::new();

    if specialty_lower.contains("neurological surgery") || specialty_lower.contains("neurosurg") {
        societies.push("American Association of Neurological Surgeons (AANS)");
        societies.push("Congress of Neurological Surgeons (CNS)");
    }
    if specialty_lower.contains("interventional") || specialty_lower.contains("endovascular") {
        societies.push("Society of NeuroInterventional Surgery (SNIS)");
    }
    if specialty_lower.contains("vascular neurology") || specialty_lower.contains("stroke") {
        societies.push("Society of Vascular and Interventional Neurology (SVIN)");
        societies.push("American Heart Association / American Stroke Association (AHA/ASA)");
    }
    if specialty_lower.contains("neurology") {
        societies.push("American Academy of Neurology (AAN)");
    }
    if specialty_lower.contains("neuroradiology") {
        societies.push("American Society of Neuroradiology (ASNR)");
    }

    societies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neurosurgery_societies() {
        let societies = likely_societies("Neurological Surgery");
        assert!(societies
            .iter()
            .any(|s| s.contains("Neurological Surgeons (AANS)")));
        assert!(societies.iter().any(|s| s.contains("(CNS)")));
    }

    #[test]
    fn test_vascular_neurology_accumulates() {
        let societies = likely_societies("Vascular Neurology");
        assert!(societies.iter().any(|s| s.contains("(SVIN)")));
        assert!(societies.iter().any(|s| s.contains("(AHA/ASA)")));
        // "vascular neurology" also contains "neurology"
        assert!(societies.iter().any(|s| s.contains("(AAN)")));
    }

    #[test]
    fn test_unrelated_specialty_yields_nothing() {
        assert!(likely_societies("Dermatology").is_empty());
        assert!(likely_societies("").is_empty());
    }

    #[tokio::test]
    async fn test_no_education_source_is_empty() {
        let profile = NoEducationSource
            .lookup(&crate::name::normalize("Evan Joyce"), None, None, None)
            .await
            .unwrap();
        assert!(!profile.found);
        assert!(profile.medical_school.is_none());
    }
}
