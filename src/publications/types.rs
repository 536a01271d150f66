use serde::{Deserialize, Serialize};
use std::fmt;

/// How strongly a matched publication is believed to belong to the resolved
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub const HIGH_THRESHOLD: i64 = 50;
    pub const MEDIUM_THRESHOLD: i64 = 30;

    pub fn from_score(score: i64) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            ConfidenceTier::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    /// High and medium candidates land in the verified list; low candidates
    /// are surfaced separately for manual review, never dropped.
    pub fn verified(self) -> bool {
        !matches!(self, ConfidenceTier::Low)
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceTier::High => write!(f, "HIGH"),
            ConfidenceTier::Medium => write!(f, "MEDIUM"),
            ConfidenceTier::Low => write!(f, "LOW"),
        }
    }
}

/// One publication scored against the target identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationCandidate {
    pub id: String,
    pub title: String,
    pub journal: String,
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Leading authors only; `author_count` has the full number.
    pub authors: Vec<String>,
    pub author_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_author_affiliation: Option<String>,
    pub match_score: i64,
    pub match_reasons: Vec<String>,
    pub confidence: ConfidenceTier,
}

/// Tiered publication results; both lists are always returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicationSet {
    pub found: bool,
    /// Total hit count reported by the index, which can exceed the number of
    /// candidates actually fetched.
    pub total_count: usize,
    pub verified: Vec<PublicationCandidate>,
    pub unverified: Vec<PublicationCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

/// Identifier list returned by one search strategy.
#[derive(Debug, Clone, Default)]
pub struct SearchHits {
    pub ids: Vec<String>,
    pub total: usize,
}

/// One author entry of a fetched article record.
#[derive(Debug, Clone, Default)]
pub struct ArticleAuthor {
    pub last_name: String,
    pub fore_name: String,
    pub initials: String,
    pub affiliation: Option<String>,
}

impl ArticleAuthor {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.fore_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Full detail for one literature-index record.
#[derive(Debug, Clone, Default)]
pub struct ArticleRecord {
    pub id: String,
    pub title: String,
    pub journal: String,
    pub year: Option<i32>,
    pub url: Option<String>,
    pub authors: Vec<ArticleAuthor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(ConfidenceTier::from_score(50), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_score(95), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_score(49), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_score(30), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_score(29), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::from_score(0), ConfidenceTier::Low);
    }

    #[test]
    fn test_verified_partition() {
        assert!(ConfidenceTier::High.verified());
        assert!(ConfidenceTier::Medium.verified());
        assert!(!ConfidenceTier::Low.verified());
    }

    #[test]
    fn test_author_display_name() {
        let author = ArticleAuthor {
            last_name: "Joyce".into(),
            fore_name: "Evan".into(),
            ..Default::default()
        };
        assert_eq!(author.display_name(), "Evan Joyce");

        let bare = ArticleAuthor {
            last_name: "Collective".into(),
            ..Default::default()
        };
        assert_eq!(bare.display_name(), "Collective");
    }
}
