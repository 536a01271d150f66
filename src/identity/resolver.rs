//! Two-tier identity resolution.
//!
//! Tier one asks the payments store for an exact name hit: a payment history
//! already keyed to a verified identifier is authoritative. Tier two falls
//! back to a scored registry search. Collaborator failures degrade to
//! `found = false` with a diagnostic; they never abort the caller's pipeline.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use super::scoring::score_candidate;
use super::types::{IdentityResult, IdentitySource, ProviderCandidate};
use super::TARGET_IDENTITY;
use crate::lookup::DomainTables;
use crate::name::NormalizedName;
use crate::payments::{PaymentRow, PaymentsSource};
use crate::registry::RegistryRecord;

/// Number of ranked alternates retained after the winning candidate.
const ALTERNATE_COUNT: usize = 4;

/// Registry collaborator contract.
#[async_trait]
pub trait RegistrySearch: Send + Sync {
    async fn search(
        &self,
        first: &str,
        last: &str,
        state: Option<&str>,
        city: Option<&str>,
    ) -> Result<Vec<RegistryRecord>>;
}

pub struct IdentityResolver<'a> {
    tables: &'a DomainTables,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(tables: &'a DomainTables) -> Self {
        Self { tables }
    }

    pub async fn resolve<P, R>(
        &self,
        payments: &P,
        registry: &R,
        name: &NormalizedName,
        state_hint: Option<&str>,
        city_hint: Option<&str>,
    ) -> IdentityResult
    where
        P: PaymentsSource,
        R: RegistrySearch,
    {
        let mut diagnostics: Vec<String> = Vec::new();

        match payments.query_by_name(&name.first, &name.last).await {
            Ok(rows) if !rows.is_empty() => {
                debug!(
                    target: TARGET_IDENTITY,
                    "Direct payments-store hit for '{}' ({} rows)",
                    name.full,
                    rows.len()
                );
                // Rows arrive most-recent first; its embedded identity fields
                // win outright.
                return IdentityResult::resolved(
                    candidate_from_row(&rows[0]),
                    IdentitySource::PaymentsStore,
                    Vec::new(),
                );
            }
            Ok(_) => {
                debug!(
                    target: TARGET_IDENTITY,
                    "No payments-store rows for '{}', falling back to registry", name.full
                );
            }
            Err(err) => {
                warn!(
                    target: TARGET_IDENTITY,
                    "Payments store unavailable during resolution: {}", err
                );
                diagnostics.push(format!("payments store unavailable: {}", err));
            }
        }

        let records = match registry
            .search(&name.first, &name.last, state_hint, city_hint)
            .await
        {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    target: TARGET_IDENTITY,
                    "Registry search failed for '{}': {}", name.full, err
                );
                diagnostics.push(format!("registry search failed: {}", err));
                return IdentityResult::not_found(diagnostics.join("; "));
            }
        };

        if records.is_empty() {
            diagnostics.push(format!("no registry candidates for '{}'", name.full));
            return IdentityResult::not_found(diagnostics.join("; "));
        }

        let mut candidates: Vec<ProviderCandidate> = records
            .iter()
            .map(|record| score_candidate(record, state_hint, city_hint, self.tables))
            .collect();
        // Stable sort: ties keep the registry's original order.
        candidates.sort_by(|a, b| b.score.cmp(&a.score));

        debug!(
            target: TARGET_IDENTITY,
            "Scored {} registry candidates for '{}', best score {}",
            candidates.len(),
            name.full,
            candidates[0].score
        );

        let winner = candidates.remove(0);
        candidates.truncate(ALTERNATE_COUNT);

        let mut result = IdentityResult::resolved(winner, IdentitySource::Registry, candidates);
        if !diagnostics.is_empty() {
            result.diagnostic = Some(diagnostics.join("; "));
        }
        result
    }
}

fn candidate_from_row(row: &PaymentRow) -> ProviderCandidate {
    ProviderCandidate {
        external_id: row.external_id.clone(),
        name: row.provider_name.clone(),
        specialty: row.specialty.clone(),
        city: row.city.clone(),
        state: row.state.clone(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RegistryAddress, RegistryBasic, RegistryTaxonomy};
    use anyhow::bail;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakePayments {
        rows: Vec<PaymentRow>,
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PaymentsSource for FakePayments {
        async fn query_by_identifier(&self, _external_id: &str) -> Result<Vec<PaymentRow>> {
            Ok(self.rows.clone())
        }

        async fn query_by_name(&self, _first: &str, _last: &str) -> Result<Vec<PaymentRow>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                bail!("store down");
            }
            Ok(self.rows.clone())
        }
    }

    #[derive(Default)]
    struct FakeRegistry {
        records: Vec<RegistryRecord>,
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RegistrySearch for FakeRegistry {
        async fn search(
            &self,
            _first: &str,
            _last: &str,
            _state: Option<&str>,
            _city: Option<&str>,
        ) -> Result<Vec<RegistryRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                bail!("registry down");
            }
            Ok(self.records.clone())
        }
    }

    fn store_row(name: &str, external_id: &str) -> PaymentRow {
        PaymentRow {
            provider_name: name.into(),
            external_id: Some(external_id.into()),
            specialty: Some("Neurological Surgery".into()),
            city: Some("Boise".into()),
            state: Some("ID".into()),
            counterparty: "Penumbra".into(),
            amount: 100.0,
            payment_count: 1,
            program_year: 2023,
        }
    }

    fn registry_record(first: &str, last: &str, state: &str, specialty: &str) -> RegistryRecord {
        RegistryRecord {
            number: Some(1_234_567_890),
            basic: RegistryBasic {
                first_name: first.into(),
                last_name: last.into(),
                ..Default::default()
            },
            addresses: vec![RegistryAddress {
                address_purpose: "LOCATION".into(),
                city: Some("Boise".into()),
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

    fn target() -> NormalizedName {
        crate::name::normalize("Evan Joyce")
    }

    #[tokio::test]
    async fn test_direct_store_hit_wins_over_registry() {
        let tables = DomainTables::default();
        let payments = FakePayments {
            rows: vec![store_row("Evan Joyce", "1000000001")],
            ..Default::default()
        };
        let registry = FakeRegistry {
            records: vec![registry_record("Evan", "Joyce", "ID", "Neurological Surgery")],
            ..Default::default()
        };

        let result = IdentityResolver::new(&tables)
            .resolve(&payments, &registry, &target(), Some("ID"), None)
            .await;

        assert!(result.found);
        let resolved = result.resolved.unwrap();
        assert_eq!(resolved.source, IdentitySource::PaymentsStore);
        assert_eq!(resolved.provider.external_id.as_deref(), Some("1000000001"));
        // Short-circuit: the registry is never consulted.
        assert_eq!(registry.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_registry_fallback_ranks_and_keeps_alternates() {
        let tables = DomainTables::default();
        let payments = FakePayments::default();
        let registry = FakeRegistry {
            records: vec![
                registry_record("Evan", "Joyce", "MT", "Family Medicine"),
                registry_record("Evan", "Joyce", "ID", "Neurological Surgery"),
                registry_record("Evan", "Joyce", "WA", "Family Medicine"),
                registry_record("Evan", "Joyce", "OR", "Family Medicine"),
                registry_record("Evan", "Joyce", "NV", "Family Medicine"),
                registry_record("Evan", "Joyce", "AZ", "Family Medicine"),
                registry_record("Evan", "Joyce", "UT", "Family Medicine"),
            ],
            ..Default::default()
        };

        let result = IdentityResolver::new(&tables)
            .resolve(&payments, &registry, &target(), Some("ID"), None)
            .await;

        let resolved = result.resolved.unwrap();
        assert_eq!(resolved.source, IdentitySource::Registry);
        assert_eq!(resolved.provider.state.as_deref(), Some("ID"));
        assert_eq!(resolved.alternates.len(), 4);
    }

    #[tokio::test]
    async fn test_tie_break_preserves_source_order() {
        let tables = DomainTables::default();
        let payments = FakePayments::default();
        let first = registry_record("Evan", "Joyce", "MT", "Family Medicine");
        let mut second = registry_record("Evan", "Joyce", "WA", "Family Medicine");
        second.number = Some(9_999_999_999);
        let registry = FakeRegistry {
            records: vec![first, second],
            ..Default::default()
        };

        let result = IdentityResolver::new(&tables)
            .resolve(&payments, &registry, &target(), None, None)
            .await;

        let resolved = result.resolved.unwrap();
        assert_eq!(resolved.provider.external_id.as_deref(), Some("1234567890"));
    }

    #[tokio::test]
    async fn test_store_error_still_reaches_registry() {
        let tables = DomainTables::default();
        let payments = FakePayments {
            fail: true,
            ..Default::default()
        };
        let registry = FakeRegistry {
            records: vec![registry_record("Evan", "Joyce", "ID", "Neurological Surgery")],
            ..Default::default()
        };

        let result = IdentityResolver::new(&tables)
            .resolve(&payments, &registry, &target(), None, None)
            .await;

        assert!(result.found);
        assert!(result.diagnostic.unwrap().contains("payments store unavailable"));
    }

    #[tokio::test]
    async fn test_both_tiers_failing_is_not_found() {
        let tables = DomainTables::default();
        let payments = FakePayments {
            fail: true,
            ..Default::default()
        };
        let registry = FakeRegistry {
            fail: true,
            ..Default::default()
        };

        let result = IdentityResolver::new(&tables)
            .resolve(&payments, &registry, &target(), None, None)
            .await;

        assert!(!result.found);
        let diagnostic = result.diagnostic.unwrap();
        assert!(diagnostic.contains("payments store unavailable"));
        assert!(diagnostic.contains("registry search failed"));
    }

    #[tokio::test]
    async fn test_empty_registry_is_not_found() {
        let tables = DomainTables::default();
        let payments = FakePayments::default();
        let registry = FakeRegistry::default();

        let result = IdentityResolver::new(&tables)
            .resolve(&payments, &registry, &target(), None, None)
            .await;

        assert!(!result.found);
        assert!(result.resolved.is_none());
    }
}
