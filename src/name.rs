//! Provider name normalization.
//!
//! Free-text names arrive with honorifics ("Dr.") and credential suffixes
//! ("MD", "FAANS", generational suffixes) attached. Every downstream lookup is
//! keyed on the bare first/last form, so everything starts here.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

lazy_static! {
    static ref TITLE_PREFIXES: HashSet<&'static str> =
        ["DR", "DR.", "DOCTOR"].into_iter().collect();
    static ref CREDENTIAL_SUFFIXES: HashSet<&'static str> = [
        "MD", "M.D.", "DO", "D.O.", "PHD", "PH.D.", "MBA", "MS", "FAANS", "FAHA", "FACS", "JR",
        "JR.", "SR", "SR.", "II", "III", "IV",
    ]
    .into_iter()
    .collect();
}

/// A provider name with titles and credentials stripped.
///
/// `last` is empty when the input did not contain at least two usable tokens;
/// callers must treat that as a terminal input error, since no identity can be
/// resolved without a surname.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedName {
    pub first: String,
    pub last: String,
    pub full: String,
}

impl NormalizedName {
    pub fn has_surname(&self) -> bool {
        !self.last.is_empty()
    }

    pub fn first_initial(&self) -> Option<char> {
        self.first.chars().next()
    }
}

/// Parse a free-text provider name, stripping titles and credentials.
///
/// Total function: empty or unusable input yields empty fields, never an
/// error. Idempotent over its own `full` output.
pub fn normalize(raw: &str) -> NormalizedName {
    let mut parts: Vec<String> = raw.split_whitespace().map(str::to_string).collect();

    while parts
        .first()
        .is_some_and(|t| TITLE_PREFIXES.contains(t.to_uppercase().trim_end_matches(',')))
    {
        parts.remove(0);
    }

    while parts
        .last()
        .is_some_and(|t| CREDENTIAL_SUFFIXES.contains(t.to_uppercase().trim_end_matches(',')))
    {
        parts.pop();
    }

    // "Evan Joyce, MD" leaves "Joyce," as the final token
    if let Some(last) = parts.last_mut() {
        if let Some(idx) = last.find(',') {
            last.truncate(idx);
        }
    }

    if parts.len() < 2 {
        let only = parts.first().cloned().unwrap_or_default();
        return NormalizedName {
            first: only.clone(),
            last: String::new(),
            full: only,
        };
    }

    NormalizedName {
        first: parts[0].clone(),
        last: parts[parts.len() - 1].clone(),
        full: parts.join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_titles_and_credentials() {
        let name = normalize("Dr. Sarah Chen MD");
        assert_eq!(name.first, "Sarah");
        assert_eq!(name.last, "Chen");
        assert_eq!(name.full, "Sarah Chen");
    }

    #[test]
    fn test_trailing_comma_forms() {
        let name = normalize("Dr. Evan Joyce, MD");
        assert_eq!(name.first, "Evan");
        assert_eq!(name.last, "Joyce");
        assert_eq!(name.full, "Evan Joyce");

        let name = normalize("Evan Joyce, M.D., FAANS");
        assert_eq!(name.last, "Joyce");
    }

    #[test]
    fn test_middle_names_preserved_in_full() {
        let name = normalize("Mary Beth O'Connor PhD");
        assert_eq!(name.first, "Mary");
        assert_eq!(name.last, "O'Connor");
        assert_eq!(name.full, "Mary Beth O'Connor");
    }

    #[test]
    fn test_single_token_has_no_surname() {
        let name = normalize("Smith");
        assert_eq!(name.first, "Smith");
        assert_eq!(name.last, "");
        assert_eq!(name.full, "Smith");
        assert!(!name.has_surname());
    }

    #[test]
    fn test_empty_input() {
        let name = normalize("");
        assert_eq!(name, NormalizedName::default());
        assert!(!name.has_surname());
    }

    #[test]
    fn test_all_tokens_stripped() {
        // Nothing but a title and a credential
        let name = normalize("Dr. MD");
        assert!(!name.has_surname());
        assert_eq!(name.full, "");
    }

    #[test]
    fn test_idempotent_over_full() {
        for input in [
            "Dr. Sarah Chen MD",
            "Evan Joyce, MD",
            "DOCTOR John Q. Public III",
            "Smith",
            "",
        ] {
            let once = normalize(input);
            let twice = normalize(&once.full);
            assert_eq!(once, twice, "normalize not idempotent for {input:?}");
        }
    }
}
