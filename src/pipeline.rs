//! Pipeline orchestration.
//!
//! One invocation runs identity resolution, then payment aggregation, then
//! publication matching, threading the resolved identity's locale and
//! specialty forward. Failed stages degrade to empty results with
//! diagnostics; only an unusable input name aborts the pipeline.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::enrichment::{likely_societies, EducationProfile, EducationSource, NoEducationSource};
use crate::identity::{IdentityResolver, IdentityResult, RegistrySearch};
use crate::lookup::DomainTables;
use crate::name::NormalizedName;
use crate::payments::{PaymentAggregator, PaymentSummary, PaymentsSource};
use crate::publications::{LiteratureIndex, PublicationMatcher, PublicationSet};

pub const DEFAULT_MAX_PUBLICATIONS: usize = 30;

/// Everything the pipeline learned about one provider.
#[derive(Debug, Clone, Serialize)]
pub struct DossierResult {
    pub input_name: String,
    pub name: NormalizedName,
    pub identity: IdentityResult,
    pub payments: PaymentSummary,
    pub publications: PublicationSet,
    pub education: EducationProfile,
    pub generated_at: DateTime<Utc>,
}

pub struct DossierEngine<R, P, L, E = NoEducationSource> {
    registry: R,
    payments: P,
    literature: L,
    education: Option<E>,
    tables: DomainTables,
    max_publications: usize,
}

impl<R, P, L> DossierEngine<R, P, L, NoEducationSource> {
    pub fn new(registry: R, payments: P, literature: L) -> Self {
        DossierEngine {
            registry,
            payments,
            literature,
            education: None,
            tables: DomainTables::default(),
            max_publications: DEFAULT_MAX_PUBLICATIONS,
        }
    }
}

impl<R, P, L, E> DossierEngine<R, P, L, E> {
    pub fn with_tables(mut self, tables: DomainTables) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_max_publications(mut self, max_publications: usize) -> Self {
        self.max_publications = max_publications;
        self
    }

    pub fn with_education<E2>(self, education: E2) -> DossierEngine<R, P, L, E2> {
        DossierEngine {
            registry: self.registry,
            payments: self.payments,
            literature: self.literature,
            education: Some(education),
            tables: self.tables,
            max_publications: self.max_publications,
        }
    }
}

impl<R, P, L, E> DossierEngine<R, P, L, E>
where
    R: RegistrySearch,
    P: PaymentsSource,
    L: LiteratureIndex,
    E: EducationSource,
{
    pub async fn build_dossier(
        &self,
        raw_name: &str,
        state_hint: Option<&str>,
        city_hint: Option<&str>,
    ) -> Result<DossierResult> {
        let name = crate::name::normalize(raw_name);
        if !name.has_surname() {
            bail!(
                "cannot resolve an identity without a surname (input: {:?})",
                raw_name
            );
        }

        info!("Building dossier for '{}'", name.full);

        let resolver = IdentityResolver::new(&self.tables);
        let identity = resolver
            .resolve(&self.payments, &self.registry, &name, state_hint, city_hint)
            .await;

        // The resolved identity's fields drive the downstream queries; caller
        // hints fill any gaps. With no identity at all, name-only queries
        // proceed with degraded confidence.
        let (hint_state, hint_city, hint_specialty) = match &identity.resolved {
            Some(resolved) => (
                resolved
                    .provider
                    .state
                    .clone()
                    .or_else(|| state_hint.map(String::from)),
                resolved
                    .provider
                    .city
                    .clone()
                    .or_else(|| city_hint.map(String::from)),
                resolved.provider.specialty.clone(),
            ),
            None => (
                state_hint.map(String::from),
                city_hint.map(String::from),
                None,
            ),
        };
        let external_id = identity.external_id().map(String::from);

        let aggregator = PaymentAggregator::new(&self.tables);
        let payments = aggregator
            .aggregate(&self.payments, external_id.as_deref(), &name)
            .await;

        let matcher = PublicationMatcher::new(self.tables.clone(), self.max_publications);
        let publications = matcher
            .match_publications(
                &self.literature,
                &name,
                hint_state.as_deref(),
                hint_city.as_deref(),
            )
            .await;

        let mut education = match &self.education {
            Some(source) => source
                .lookup(
                    &name,
                    hint_city.as_deref(),
                    hint_state.as_deref(),
                    hint_specialty.as_deref(),
                )
                .await
                .unwrap_or_else(|err| {
                    warn!("Education enrichment failed: {}", err);
                    EducationProfile::default()
                }),
            None => EducationProfile::default(),
        };
        if education.professional_organizations.is_empty() {
            if let Some(specialty) = hint_specialty.as_deref() {
                education.professional_organizations = likely_societies(specialty)
                    .into_iter()
                    .map(String::from)
                    .collect();
            }
        }

        Ok(DossierResult {
            input_name: raw_name.to_string(),
            name,
            identity,
            payments,
            publications,
            education,
            generated_at: Utc::now(),
        })
    }
}
