//! Query-strategy execution and authorship disambiguation.
//!
//! Strategies run from most to least specific; their identifier sets are
//! merged by deduplicated union in strategy order, so an identifier found by
//! any strategy is eligible and nothing depends on which strategy finished
//! first.

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;
use tracing::{debug, warn};

use super::scoring::score_author_match;
use super::types::{
    ArticleAuthor, ArticleRecord, ConfidenceTier, PublicationCandidate, PublicationSet, SearchHits,
};
use super::TARGET_MATCH;
use crate::lookup::{state_full_name, DomainTables};
use crate::name::NormalizedName;

/// Authors shown on a candidate before truncation.
const DISPLAY_AUTHOR_LIMIT: usize = 5;

/// Literature-index collaborator contract.
#[async_trait]
pub trait LiteratureIndex: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<SearchHits>;

    async fn fetch_details(&self, ids: &[String]) -> Result<Vec<ArticleRecord>>;
}

pub struct PublicationMatcher {
    tables: DomainTables,
    max_results: usize,
}

impl PublicationMatcher {
    pub fn new(tables: DomainTables, max_results: usize) -> Self {
        Self {
            tables,
            max_results,
        }
    }

    /// Ordered query strategies, most specific first. Location-filtered
    /// strategies are only emitted when the corresponding hint is present.
    fn build_queries(
        &self,
        name: &NormalizedName,
        state_hint: Option<&str>,
        city_hint: Option<&str>,
    ) -> Vec<String> {
        let initial = match name.first_initial() {
            Some(c) => c.to_uppercase().to_string(),
            None => return Vec::new(),
        };
        let author = format!("{} {}", name.last, initial);

        let mut queries = vec![format!(
            "\"{}\"[Author] AND ({})",
            author,
            self.tables.query_keywords.join(" OR ")
        )];

        if let Some(state) = state_hint {
            let state_term = state_full_name(state).unwrap_or(state);
            queries.push(format!("\"{}\"[Author] AND {}[Affiliation]", author, state_term));
        }

        if let Some(city) = city_hint {
            queries.push(format!("\"{}\"[Author] AND {}[Affiliation]", author, city));
        }

        queries.push(format!("{}[Author]", author));
        queries
    }

    pub async fn match_publications<L: LiteratureIndex>(
        &self,
        index: &L,
        name: &NormalizedName,
        state_hint: Option<&str>,
        city_hint: Option<&str>,
    ) -> PublicationSet {
        if name.last.is_empty() || name.first.is_empty() {
            return PublicationSet {
                note: Some("no usable author name".to_string()),
                ..Default::default()
            };
        }

        let queries = self.build_queries(name, state_hint, city_hint);
        debug!(
            target: TARGET_MATCH,
            "Running {} query strategies for '{}'",
            queries.len(),
            name.full
        );

        // Strategies are independent, so the searches run concurrently; the
        // union below still accumulates in fixed strategy order.
        let searches = join_all(
            queries
                .iter()
                .map(|query| index.search(query, self.max_results)),
        )
        .await;

        let mut total_count = 0;
        let mut seen: HashSet<String> = HashSet::new();
        let mut ids: Vec<String> = Vec::new();
        let mut failures: Vec<String> = Vec::new();

        for (query, result) in queries.iter().zip(searches) {
            match result {
                Ok(hits) => {
                    if total_count == 0 {
                        total_count = hits.total;
                    }
                    for id in hits.ids {
                        if ids.len() >= self.max_results {
                            break;
                        }
                        if seen.insert(id.clone()) {
                            ids.push(id);
                        }
                    }
                }
                Err(err) => {
                    warn!(
                        target: TARGET_MATCH,
                        "Search strategy failed ({}): {}", query, err
                    );
                    failures.push(format!("search failed: {}", err));
                }
            }
        }

        let diagnostic = if failures.is_empty() {
            None
        } else {
            Some(failures.join("; "))
        };

        if ids.is_empty() {
            return PublicationSet {
                total_count,
                note: Some("no publications found".to_string()),
                diagnostic,
                ..Default::default()
            };
        }

        let records = match index.fetch_details(&ids).await {
            Ok(records) => records,
            Err(err) => {
                warn!(target: TARGET_MATCH, "Detail fetch failed: {}", err);
                return PublicationSet {
                    total_count,
                    note: Some("publication details unavailable".to_string()),
                    diagnostic: Some(format!("detail fetch failed: {}", err)),
                    ..Default::default()
                };
            }
        };

        let mut verified = Vec::new();
        let mut unverified = Vec::new();
        for record in records {
            let candidate = self.evaluate(record, name, state_hint, city_hint);
            if candidate.confidence.verified() {
                verified.push(candidate);
            } else {
                unverified.push(candidate);
            }
        }

        sort_candidates(&mut verified);
        sort_candidates(&mut unverified);

        let note = if !verified.is_empty() {
            Some(format!(
                "found {} publications with location/specialty match",
                verified.len()
            ))
        } else if !unverified.is_empty() {
            Some(
                "publications found but author identity not verified; review affiliations"
                    .to_string(),
            )
        } else {
            None
        };

        PublicationSet {
            found: !verified.is_empty() || !unverified.is_empty(),
            total_count,
            verified,
            unverified,
            note,
            diagnostic,
        }
    }

    /// Locate the target author in the record and score the pairing.
    fn evaluate(
        &self,
        record: ArticleRecord,
        name: &NormalizedName,
        state_hint: Option<&str>,
        city_hint: Option<&str>,
    ) -> PublicationCandidate {
        let target_author = record
            .authors
            .iter()
            .find(|author| is_target_author(author, name));
        let target_author_affiliation =
            target_author.and_then(|author| author.affiliation.clone());
        let compared_name = target_author
            .map(|author| author.display_name())
            .unwrap_or_default();

        let (match_score, match_reasons) = score_author_match(
            &compared_name,
            target_author_affiliation.as_deref(),
            name,
            city_hint,
            state_hint,
            &self.tables,
        );

        let author_count = record.authors.len();
        let authors: Vec<String> = record
            .authors
            .iter()
            .take(DISPLAY_AUTHOR_LIMIT)
            .map(ArticleAuthor::display_name)
            .collect();

        PublicationCandidate {
            id: record.id,
            title: record.title,
            journal: record.journal,
            year: record.year,
            url: record.url,
            authors,
            author_count,
            target_author_affiliation,
            match_score,
            match_reasons,
            confidence: ConfidenceTier::from_score(match_score),
        }
    }
}

/// Exact surname match, plus exact forename or matching first initial. A name
/// collision across contributors yields the first matching entry.
fn is_target_author(author: &ArticleAuthor, name: &NormalizedName) -> bool {
    if !author.last_name.eq_ignore_ascii_case(&name.last) {
        return false;
    }
    if author.fore_name.eq_ignore_ascii_case(&name.first) && !name.first.is_empty() {
        return true;
    }
    match (name.first_initial(), author.initials.chars().next()) {
        (Some(target), Some(initial)) => {
            target.to_lowercase().eq(initial.to_lowercase())
        }
        _ => false,
    }
}

fn sort_candidates(candidates: &mut [PublicationCandidate]) {
    candidates.sort_by(|a, b| {
        b.match_score
            .cmp(&a.match_score)
            .then(b.year.unwrap_or(0).cmp(&a.year.unwrap_or(0)))
    });
}
