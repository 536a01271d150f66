//! Registry candidate scoring.
//!
//! Pure functions from (raw record, locale hints) to a scored candidate; all
//! I/O stays in the resolver so these rules can be tested table-driven.

use chrono::{Datelike, Utc};

use super::types::{ProviderCandidate, SpecialtyListing};
use crate::lookup::DomainTables;
use crate::registry::RegistryRecord;

pub const BASE_SCORE: i64 = 100;
pub const STATE_BONUS: i64 = 50;
pub const CITY_BONUS: i64 = 30;
pub const SPECIALTY_BONUS: i64 = 100;

/// Score one raw registry record against the caller's locale hints.
pub fn score_candidate(
    record: &RegistryRecord,
    state_hint: Option<&str>,
    city_hint: Option<&str>,
    tables: &DomainTables,
) -> ProviderCandidate {
    let address = record.practice_address();
    let city = address.and_then(|a| a.city.clone());
    let state = address.and_then(|a| a.state.clone());
    let organization = address.and_then(|a| a.organization_name.clone());
    let specialty = record.primary_specialty().map(str::to_string);

    let mut score = BASE_SCORE;

    if let (Some(hint), Some(state)) = (state_hint, state.as_deref()) {
        if state.eq_ignore_ascii_case(hint) {
            score += STATE_BONUS;
        }
    }

    if let (Some(hint), Some(city)) = (city_hint, city.as_deref()) {
        if !hint.is_empty() && city.to_lowercase().contains(&hint.to_lowercase()) {
            score += CITY_BONUS;
        }
    }

    if let Some(specialty) = specialty.as_deref() {
        let specialty_lower = specialty.to_lowercase();
        if tables
            .target_specialties
            .iter()
            .any(|target| specialty_lower.contains(target))
        {
            score += SPECIALTY_BONUS;
        }
    }

    ProviderCandidate {
        external_id: record.number.map(|n| n.to_string()),
        name: format!(
            "{} {}",
            record.basic.first_name, record.basic.last_name
        )
        .trim()
        .to_string(),
        specialty,
        city,
        state,
        organization,
        credentials: record.basic.credential.clone(),
        gender: record.basic.gender.clone(),
        enumeration_date: record.basic.enumeration_date.clone(),
        years_in_practice: years_in_practice(record.basic.enumeration_date.as_deref()),
        all_specialties: record
            .taxonomies
            .iter()
            .filter_map(|t| {
                t.desc.as_ref().map(|desc| SpecialtyListing {
                    specialty: desc.clone(),
                    primary: t.primary,
                    state: t.state.clone(),
                    license: t.license.clone(),
                })
            })
            .collect(),
        score,
    }
}

/// Years since the registry enumeration date, a rough proxy for time in
/// practice.
fn years_in_practice(enumeration_date: Option<&str>) -> Option<i32> {
    let year: i32 = enumeration_date?.split('-').next()?.parse().ok()?;
    Some(Utc::now().year() - year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RegistryAddress, RegistryBasic, RegistryTaxonomy};

    fn record(state: &str, city: &str, specialty: &str) -> RegistryRecord {
        RegistryRecord {
            number: Some(1_000_000_001),
            basic: RegistryBasic {
                first_name: "Evan".into(),
                last_name: "Joyce".into(),
                ..Default::default()
            },
            addresses: vec![RegistryAddress {
                address_purpose: "LOCATION".into(),
                city: Some(city.into()),
                state: Some(state.into()),
                organization_name: None,
            }],
            taxonomies: vec![RegistryTaxonomy {
                desc: Some(specialty.into()),
                primary: true,
                state: None,
                license: None,
            }],
        }
    }

    #[test]
    fn test_base_score_without_hints() {
        let tables = DomainTables::default();
        let candidate = score_candidate(&record("ID", "Boise", "Family Medicine"), None, None, &tables);
        assert_eq!(candidate.score, BASE_SCORE);
        assert_eq!(candidate.external_id.as_deref(), Some("1000000001"));
        assert_eq!(candidate.name, "Evan Joyce");
    }

    #[test]
    fn test_all_bonuses_accumulate() {
        let tables = DomainTables::default();
        let candidate = score_candidate(
            &record("ID", "Boise", "Neurological Surgery"),
            Some("id"),
            Some("boise"),
            &tables,
        );
        assert_eq!(
            candidate.score,
            BASE_SCORE + STATE_BONUS + CITY_BONUS + SPECIALTY_BONUS
        );
    }

    #[test]
    fn test_city_hint_is_substring_match() {
        let tables = DomainTables::default();
        let candidate = score_candidate(
            &record("UT", "Salt Lake City", "Family Medicine"),
            None,
            Some("salt lake"),
            &tables,
        );
        assert_eq!(candidate.score, BASE_SCORE + CITY_BONUS);
    }

    #[test]
    fn test_state_match_dominates_otherwise_identical_candidates() {
        // A state-matched candidate must outrank an otherwise-identical one
        // regardless of which other bonuses both carry.
        let tables = DomainTables::default();
        for (city_hint, specialty) in [
            (None, "Family Medicine"),
            (Some("boise"), "Family Medicine"),
            (None, "Neurological Surgery"),
            (Some("boise"), "Neurological Surgery"),
        ] {
            let matched = score_candidate(
                &record("ID", "Boise", specialty),
                Some("ID"),
                city_hint,
                &tables,
            );
            let unmatched = score_candidate(
                &record("MT", "Boise", specialty),
                Some("ID"),
                city_hint,
                &tables,
            );
            assert!(
                matched.score > unmatched.score,
                "state match must dominate: {} vs {}",
                matched.score,
                unmatched.score
            );
            assert_eq!(matched.score - unmatched.score, STATE_BONUS);
        }
    }

    #[test]
    fn test_specialty_match_is_substring_and_case_insensitive() {
        let tables = DomainTables::default();
        let candidate = score_candidate(
            &record("ID", "Boise", "NEUROLOGICAL SURGERY (BOARD CERTIFIED)"),
            None,
            None,
            &tables,
        );
        assert_eq!(candidate.score, BASE_SCORE + SPECIALTY_BONUS);
    }

    #[test]
    fn test_years_in_practice_from_enumeration_date() {
        let mut rec = record("ID", "Boise", "Neurology");
        rec.basic.enumeration_date = Some("2015-06-01".into());
        let tables = DomainTables::default();
        let candidate = score_candidate(&rec, None, None, &tables);
        let expected = Utc::now().year() - 2015;
        assert_eq!(candidate.years_in_practice, Some(expected));

        rec.basic.enumeration_date = Some("not-a-date".into());
        let candidate = score_candidate(&rec, None, None, &tables);
        assert_eq!(candidate.years_in_practice, None);
    }
}
