//! Counterparty aggregation over raw payment rows.
//!
//! Exactly one organization is the designated counterparty; its totals are
//! always reported separately from the competitor totals, and the two are
//! never merged downstream.

use std::collections::HashMap;
use tracing::{debug, warn};

use super::types::{CounterpartyTotal, PaymentRow, PaymentSummary};
use super::PaymentsSource;
use crate::lookup::DomainTables;
use crate::name::NormalizedName;
use crate::TARGET_DB;

/// Bucket for rows whose counterparty field is blank.
const UNNAMED_COUNTERPARTY: &str = "Other";

pub struct PaymentAggregator {
    designated_counterparty: String,
}

impl PaymentAggregator {
    pub fn new(tables: &DomainTables) -> Self {
        Self {
            designated_counterparty: tables.designated_counterparty.clone(),
        }
    }

    /// Fetch and aggregate payment rows for a provider.
    ///
    /// With a known external identifier the query is precise; the name-keyed
    /// fallback can mix in rows from same-named providers, which is surfaced
    /// in the diagnostic rather than hidden.
    pub async fn aggregate<P: PaymentsSource>(
        &self,
        source: &P,
        external_id: Option<&str>,
        name: &NormalizedName,
    ) -> PaymentSummary {
        let rows = match external_id {
            Some(id) => source.query_by_identifier(id).await,
            None => source.query_by_name(&name.first, &name.last).await,
        };

        match rows {
            Ok(rows) => {
                debug!(
                    target: TARGET_DB,
                    "Aggregating {} payment rows for '{}'",
                    rows.len(),
                    name.full
                );
                let mut summary = self.summarize(&rows);
                if external_id.is_none() && summary.found {
                    summary.diagnostic = Some(
                        "matched by name only; rows from same-named providers may be included"
                            .to_string(),
                    );
                }
                summary
            }
            Err(err) => {
                warn!(
                    target: TARGET_DB,
                    "Payments store unavailable for '{}': {}", name.full, err
                );
                PaymentSummary {
                    found: false,
                    diagnostic: Some(format!("payments store unavailable: {}", err)),
                    ..Default::default()
                }
            }
        }
    }

    /// Group rows by counterparty, summing amounts and counts across years.
    pub fn summarize(&self, rows: &[PaymentRow]) -> PaymentSummary {
        if rows.is_empty() {
            return PaymentSummary::default();
        }

        let mut groups: HashMap<String, CounterpartyTotal> = HashMap::new();
        for row in rows {
            let counterparty = if row.counterparty.is_empty() {
                UNNAMED_COUNTERPARTY
            } else {
                &row.counterparty
            };
            let entry = groups
                .entry(counterparty.to_string())
                .or_insert_with(|| CounterpartyTotal {
                    counterparty: counterparty.to_string(),
                    designated: counterparty == self.designated_counterparty,
                    ..Default::default()
                });
            entry.total_amount += row.amount;
            entry.payment_count += row.payment_count;
        }

        let mut designated_total = 0.0;
        let mut competitor_total = 0.0;
        for total in groups.values() {
            if total.designated {
                designated_total += total.total_amount;
            } else {
                competitor_total += total.total_amount;
            }
        }

        // Competitors by descending amount; the designated counterparty last,
        // regardless of its amount.
        let mut relationships: Vec<CounterpartyTotal> = groups.into_values().collect();
        relationships.sort_by(|a, b| {
            a.designated
                .cmp(&b.designated)
                .then(b.total_amount.total_cmp(&a.total_amount))
        });

        PaymentSummary {
            found: true,
            designated_total,
            competitor_total,
            relationships,
            diagnostic: None,
        }
    }
}
