//! Industry-payment disclosure records and their aggregation.

pub mod aggregator;
pub mod store;
pub mod types;

pub use aggregator::PaymentAggregator;
pub use store::PaymentsDb;
pub use types::*;

use anyhow::Result;
use async_trait::async_trait;

/// Payments-store collaborator contract.
///
/// Identifier-keyed queries are precise; name-keyed queries accept the risk of
/// cross-identity contamination and exist only as a fallback.
#[async_trait]
pub trait PaymentsSource: Send + Sync {
    async fn query_by_identifier(&self, external_id: &str) -> Result<Vec<PaymentRow>>;

    async fn query_by_name(&self, first: &str, last: &str) -> Result<Vec<PaymentRow>>;
}
