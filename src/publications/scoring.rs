//! Author-match scoring.
//!
//! Pure function from (matched author, affiliation, hints) to a score and the
//! reasons that produced it. Name evidence and affiliation evidence are
//! additive, so location-only signals can still reach the MEDIUM tier.

use crate::lookup::{state_full_name, DomainTables};
use crate::name::NormalizedName;

pub const SURNAME_BONUS: i64 = 20;
pub const FORENAME_BONUS: i64 = 30;
pub const INITIAL_BONUS: i64 = 10;
pub const STATE_BONUS: i64 = 25;
pub const CITY_BONUS: i64 = 30;
pub const KEYWORD_BONUS: i64 = 15;
pub const INSTITUTION_BONUS: i64 = 20;

/// Score how likely an article author entry refers to the target provider.
///
/// `author_name` is the display name of the author entry located in the
/// article's author list, or empty when no entry matched the target name.
pub fn score_author_match(
    author_name: &str,
    affiliation: Option<&str>,
    target: &NormalizedName,
    city_hint: Option<&str>,
    state_hint: Option<&str>,
    tables: &DomainTables,
) -> (i64, Vec<String>) {
    let mut score = 0;
    let mut reasons = Vec::new();

    let author_lower = author_name.to_lowercase();

    if !target.last.is_empty() && author_lower.contains(&target.last.to_lowercase()) {
        score += SURNAME_BONUS;
        if !target.first.is_empty() && author_lower.contains(&target.first.to_lowercase()) {
            score += FORENAME_BONUS;
            reasons.push("full name match".to_string());
        } else if initial_matches(&target.first, &author_lower) {
            score += INITIAL_BONUS;
            reasons.push("first initial match".to_string());
        }
    }

    if let Some(affiliation) = affiliation {
        let affil_lower = affiliation.to_lowercase();

        if let Some(state) = state_hint {
            let full = state_full_name(state).unwrap_or("").to_lowercase();
            if (!state.is_empty() && affil_lower.contains(&state.to_lowercase()))
                || (!full.is_empty() && affil_lower.contains(&full))
            {
                score += STATE_BONUS;
                reasons.push(format!("state: {}", state));
            }
        }

        if let Some(city) = city_hint {
            if !city.is_empty() && affil_lower.contains(&city.to_lowercase()) {
                score += CITY_BONUS;
                reasons.push(format!("city: {}", city));
            }
        }

        if tables
            .affiliation_keywords
            .iter()
            .any(|keyword| affil_lower.contains(keyword))
        {
            score += KEYWORD_BONUS;
            reasons.push("specialty affiliation".to_string());
        }

        if tables
            .regional_institutions
            .iter()
            .any(|institution| affil_lower.contains(institution))
        {
            score += INSTITUTION_BONUS;
            reasons.push("regional institution".to_string());
        }
    }

    (score, reasons)
}

/// First-initial comparison against the first token of the author string.
/// An author entry with no tokens is a non-match.
fn initial_matches(first: &str, author_lower: &str) -> bool {
    let Some(token) = author_lower.split_whitespace().next() else {
        return false;
    };
    match (first.chars().next(), token.chars().next()) {
        (Some(target), Some(author)) => target.to_lowercase().eq(author.to_lowercase()),
        _ => false,
    }
}
