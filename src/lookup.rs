//! Static reference data and injectable match tables.
//!
//! The scoring rules are data-driven: the specialty, keyword and institution
//! lists live here as a [`DomainTables`] value handed to the components that
//! score with them, so tests can substitute their own tables.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// US state abbreviation to full name, used when matching affiliation text
    /// that spells the state out.
    pub static ref US_STATES: HashMap<&'static str, &'static str> = HashMap::from([
        ("AL", "Alabama"),
        ("AK", "Alaska"),
        ("AZ", "Arizona"),
        ("AR", "Arkansas"),
        ("CA", "California"),
        ("CO", "Colorado"),
        ("CT", "Connecticut"),
        ("DE", "Delaware"),
        ("FL", "Florida"),
        ("GA", "Georgia"),
        ("HI", "Hawaii"),
        ("ID", "Idaho"),
        ("IL", "Illinois"),
        ("IN", "Indiana"),
        ("IA", "Iowa"),
        ("KS", "Kansas"),
        ("KY", "Kentucky"),
        ("LA", "Louisiana"),
        ("ME", "Maine"),
        ("MD", "Maryland"),
        ("MA", "Massachusetts"),
        ("MI", "Michigan"),
        ("MN", "Minnesota"),
        ("MS", "Mississippi"),
        ("MO", "Missouri"),
        ("MT", "Montana"),
        ("NE", "Nebraska"),
        ("NV", "Nevada"),
        ("NH", "New Hampshire"),
        ("NJ", "New Jersey"),
        ("NM", "New Mexico"),
        ("NY", "New York"),
        ("NC", "North Carolina"),
        ("ND", "North Dakota"),
        ("OH", "Ohio"),
        ("OK", "Oklahoma"),
        ("OR", "Oregon"),
        ("PA", "Pennsylvania"),
        ("RI", "Rhode Island"),
        ("SC", "South Carolina"),
        ("SD", "South Dakota"),
        ("TN", "Tennessee"),
        ("TX", "Texas"),
        ("UT", "Utah"),
        ("VT", "Vermont"),
        ("VA", "Virginia"),
        ("WA", "Washington"),
        ("WV", "West Virginia"),
        ("WI", "Wisconsin"),
        ("WY", "Wyoming"),
    ]);
}

pub fn state_full_name(abbr: &str) -> Option<&'static str> {
    US_STATES.get(abbr.to_uppercase().as_str()).copied()
}

/// Domain-specific match tables injected into the scoring components.
///
/// The defaults target neurovascular care. All entries that participate in
/// case-insensitive substring matching are stored lowercased.
#[derive(Debug, Clone)]
pub struct DomainTables {
    /// Registry specialties that earn the specialty bonus during identity
    /// resolution.
    pub target_specialties: Vec<String>,
    /// Substrings that mark an author affiliation as clinically relevant.
    pub affiliation_keywords: Vec<String>,
    /// Substrings naming institutions in the provider's home region.
    pub regional_institutions: Vec<String>,
    /// Clinical terms OR-ed into the first literature query strategy.
    pub query_keywords: Vec<String>,
    /// The one counterparty whose payment totals are always reported
    /// separately from all competitors.
    pub designated_counterparty: String,
}

impl Default for DomainTables {
    fn default() -> Self {
        Self {
            target_specialties: [
                "Neurological Surgery",
                "Neurology",
                "Interventional Neuroradiology",
                "Vascular Neurology",
                "Neuroradiology",
                "Endovascular Surgical Neuroradiology",
                "Vascular Surgery",
                "Interventional Radiology",
            ]
            .into_iter()
            .map(str::to_lowercase)
            .collect(),
            affiliation_keywords: [
                "neurosurg",
                "neurology",
                "stroke",
                "cerebrovascular",
                "neurointervent",
                "neuroradiol",
                "brain",
                "aneurysm",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            regional_institutions: ["st. luke", "saint luke", "boise", "idaho"]
                .into_iter()
                .map(String::from)
                .collect(),
            query_keywords: [
                "stroke",
                "hemorrhage",
                "aneurysm",
                "neurovascular",
                "thrombectomy",
                "embolization",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            designated_counterparty: "J&J/Cerenovus".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_full_name() {
        assert_eq!(state_full_name("ID"), Some("Idaho"));
        assert_eq!(state_full_name("id"), Some("Idaho"));
        assert_eq!(state_full_name("ZZ"), None);
    }

    #[test]
    fn test_default_tables_lowercased() {
        let tables = DomainTables::default();
        for entry in tables
            .target_specialties
            .iter()
            .chain(&tables.affiliation_keywords)
            .chain(&tables.regional_institutions)
        {
            assert_eq!(entry, &entry.to_lowercase());
        }
        assert_eq!(tables.designated_counterparty, "J&J/Cerenovus");
    }
}
