use serde::{Deserialize, Serialize};

/// One raw payment line item, grouped per counterparty and program year, with
/// the provider identity fields the disclosure dataset embeds in every row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct PaymentRow {
    pub provider_name: String,
    pub external_id: Option<String>,
    pub specialty: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub counterparty: String,
    pub amount: f64,
    pub payment_count: i64,
    pub program_year: i64,
}

/// Payment totals for one counterparty organization, summed across years.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CounterpartyTotal {
    pub counterparty: String,
    pub total_amount: f64,
    pub payment_count: i64,
    pub designated: bool,
}

/// Aggregated payment picture for a resolved provider.
///
/// `designated_total` and `competitor_total` are kept separate by business
/// rule; downstream consumers must never merge them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub found: bool,
    pub designated_total: f64,
    pub competitor_total: f64,
    pub relationships: Vec<CounterpartyTotal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}
