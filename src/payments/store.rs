//! SQLite-backed payments store.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    Pool, Sqlite,
};
use std::path::Path;
use std::str::FromStr;
use tokio::time::Duration;
use tracing::info;

use super::types::PaymentRow;
use super::PaymentsSource;
use crate::TARGET_DB;

/// Grouped line-item select shared by both query paths. Rows come back
/// most-recent year first so callers can treat the first row as current.
const SELECT_ROWS: &str = "
    SELECT
        provider_name_full AS provider_name,
        external_id,
        specialty,
        city,
        state,
        counterparty,
        SUM(total_amount) AS amount,
        SUM(payment_count) AS payment_count,
        program_year
    FROM payment_records
";

const GROUP_AND_ORDER: &str = "
    GROUP BY provider_name_full, external_id, specialty, city, state,
             counterparty, program_year
    ORDER BY program_year DESC, amount DESC
";

#[derive(Clone)]
pub struct PaymentsDb {
    pool: Pool<Sqlite>,
}

impl PaymentsDb {
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn new(database_path: &str) -> Result<Self, sqlx::Error> {
        info!(target: TARGET_DB, "Creating database pool for: {}", database_path);

        if !Path::new(database_path).exists() {
            return Err(sqlx::Error::Configuration(
                format!("Database file '{}' does not exist", database_path).into(),
            ));
        }

        let connect_options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", database_path))?
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5))
                .synchronous(SqliteSynchronous::Normal);

        Self::with_options(connect_options, 5).await
    }

    /// Fresh in-memory store, used by tests and data loaders.
    ///
    /// Pinned to a single connection: every pooled connection to
    /// `sqlite::memory:` would otherwise see its own empty database.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        Self::with_options(SqliteConnectOptions::from_str("sqlite::memory:")?, 1).await
    }

    async fn with_options(
        options: SqliteConnectOptions,
        max_connections: u32,
    ) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let db = PaymentsDb { pool };
        db.initialize_schema().await?;

        Ok(db)
    }

    async fn initialize_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS payment_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                provider_name_full TEXT NOT NULL,
                provider_first_name TEXT NOT NULL,
                provider_last_name TEXT NOT NULL,
                external_id TEXT,
                specialty TEXT,
                city TEXT,
                state TEXT,
                counterparty TEXT NOT NULL,
                total_amount REAL NOT NULL DEFAULT 0,
                payment_count INTEGER NOT NULL DEFAULT 0,
                program_year INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_payment_records_name
             ON payment_records (provider_last_name, provider_first_name)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_payment_records_external_id
             ON payment_records (external_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert one disclosure row. Used by data loaders and tests.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_row(
        &self,
        first: &str,
        last: &str,
        external_id: Option<&str>,
        specialty: Option<&str>,
        city: Option<&str>,
        state: Option<&str>,
        counterparty: &str,
        amount: f64,
        payment_count: i64,
        program_year: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO payment_records (
                provider_name_full, provider_first_name, provider_last_name,
                external_id, specialty, city, state,
                counterparty, total_amount, payment_count, program_year
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(format!("{} {}", first, last))
        .bind(first)
        .bind(last)
        .bind(external_id)
        .bind(specialty)
        .bind(city)
        .bind(state)
        .bind(counterparty)
        .bind(amount)
        .bind(payment_count)
        .bind(program_year)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl PaymentsSource for PaymentsDb {
    async fn query_by_identifier(&self, external_id: &str) -> Result<Vec<PaymentRow>> {
        let sql = format!("{} WHERE external_id = ? {}", SELECT_ROWS, GROUP_AND_ORDER);
        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(external_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn query_by_name(&self, first: &str, last: &str) -> Result<Vec<PaymentRow>> {
        let sql = format!(
            "{} WHERE LOWER(provider_first_name) = LOWER(?)
               AND LOWER(provider_last_name) = LOWER(?) {}",
            SELECT_ROWS, GROUP_AND_ORDER
        );
        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(first)
            .bind(last)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_store() -> PaymentsDb {
        let db = PaymentsDb::in_memory().await.unwrap();
        db.insert_row(
            "Evan",
            "Joyce",
            Some("1000000001"),
            Some("Neurological Surgery"),
            Some("Boise"),
            Some("ID"),
            "Penumbra",
            1500.0,
            3,
            2022,
        )
        .await
        .unwrap();
        db.insert_row(
            "Evan",
            "Joyce",
            Some("1000000001"),
            Some("Neurological Surgery"),
            Some("Boise"),
            Some("ID"),
            "Penumbra",
            500.0,
            1,
            2023,
        )
        .await
        .unwrap();
        db.insert_row(
            "Evan",
            "Joyce",
            Some("1000000001"),
            Some("Neurological Surgery"),
            Some("Boise"),
            Some("ID"),
            "J&J/Cerenovus",
            250.0,
            2,
            2023,
        )
        .await
        .unwrap();
        db.insert_row(
            "Someone",
            "Else",
            Some("2000000002"),
            None,
            None,
            Some("WA"),
            "Penumbra",
            99.0,
            1,
            2023,
        )
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn test_query_by_name_is_case_insensitive_and_scoped() {
        let db = seeded_store().await;
        let rows = db.query_by_name("EVAN", "joyce").await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.provider_name == "Evan Joyce"));
        // Most recent program year first
        assert_eq!(rows[0].program_year, 2023);
    }

    #[tokio::test]
    async fn test_query_by_identifier() {
        let db = seeded_store().await;
        let rows = db.query_by_identifier("1000000001").await.unwrap();
        assert_eq!(rows.len(), 3);
        let rows = db.query_by_identifier("0").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_rows_group_within_year() {
        let db = seeded_store().await;
        db.insert_row(
            "Evan",
            "Joyce",
            Some("1000000001"),
            Some("Neurological Surgery"),
            Some("Boise"),
            Some("ID"),
            "Penumbra",
            100.0,
            1,
            2023,
        )
        .await
        .unwrap();

        let rows = db.query_by_identifier("1000000001").await.unwrap();
        let penumbra_2023: Vec<_> = rows
            .iter()
            .filter(|r| r.counterparty == "Penumbra" && r.program_year == 2023)
            .collect();
        assert_eq!(penumbra_2023.len(), 1);
        assert_eq!(penumbra_2023[0].amount, 600.0);
        assert_eq!(penumbra_2023[0].payment_count, 2);
    }
}
