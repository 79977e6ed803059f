//! # Cash-Flow Repository
//!
//! Latest recorded balance per currency, as imported from the cash-flow
//! sheet. Like the rate table, an import replaces everything.

use chrono::Utc;
use kasa_core::{CashFlowRow, CashPosition, CoreError, BASE_CURRENCY};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::parse_stored;
use crate::error::DbResult;

#[derive(Debug, sqlx::FromRow)]
struct BalanceRow {
    currency: String,
    balance: String,
}

/// Repository for the cash-flow snapshot.
#[derive(Debug, Clone)]
pub struct CashFlowRepository {
    pool: SqlitePool,
}

impl CashFlowRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CashFlowRepository { pool }
    }

    /// Replaces the stored balances with `position`.
    pub async fn replace_snapshot(&self, position: &CashPosition) -> DbResult<usize> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cash_flow").execute(&mut *tx).await?;

        let mut written = 0;
        for (currency, balance) in position.iter() {
            sqlx::query("INSERT INTO cash_flow (currency, balance, imported_at) VALUES (?1, ?2, ?3)")
                .bind(currency)
                .bind(balance.to_string())
                .bind(now)
                .execute(&mut *tx)
                .await?;
            written += 1;
        }

        tx.commit().await?;

        info!(currencies = written, "Cash-flow balances imported");
        Ok(written)
    }

    /// Loads the stored balances.
    ///
    /// An empty snapshot is `MissingReferenceData`: nothing can be checked
    /// against a sheet that was never imported.
    pub async fn load_position(&self) -> DbResult<CashPosition> {
        let rows: Vec<BalanceRow> =
            sqlx::query_as("SELECT currency, balance FROM cash_flow ORDER BY currency")
                .fetch_all(&self.pool)
                .await?;

        debug!(rows = rows.len(), "Loaded cash-flow balances");

        if rows.is_empty() {
            return Err(CoreError::missing("cash-flow sheet", BASE_CURRENCY).into());
        }

        let rows = rows
            .into_iter()
            .map(|row| -> DbResult<CashFlowRow> {
                Ok(CashFlowRow {
                    balance: parse_stored("cash_flow.balance", &row.balance)?,
                    currency: row.currency,
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(CashPosition::from_rows(rows))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use rust_decimal_macros::dec;

    fn position() -> CashPosition {
        CashPosition::from_rows(vec![
            CashFlowRow {
                currency: "CZK".to_string(),
                balance: dec!(150000.00),
            },
            CashFlowRow {
                currency: "EUR".to_string(),
                balance: dec!(532.50),
            },
        ])
    }

    #[tokio::test]
    async fn test_empty_sheet_is_missing_reference_data() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.cash_flow().load_position().await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::MissingReferenceData { .. })
        ));
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert_eq!(db.cash_flow().replace_snapshot(&position()).await.unwrap(), 2);

        let loaded = db.cash_flow().load_position().await.unwrap();
        assert_eq!(loaded.balance("EUR").unwrap(), dec!(532.50));
        assert_eq!(loaded.capital("CZK").unwrap(), dec!(150000));
        assert!(loaded.balance("USD").is_err());
    }

    #[tokio::test]
    async fn test_replace_overwrites_balances() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.cash_flow().replace_snapshot(&position()).await.unwrap();

        let next = CashPosition::from_rows(vec![CashFlowRow {
            currency: "CZK".to_string(),
            balance: dec!(90000),
        }]);
        db.cash_flow().replace_snapshot(&next).await.unwrap();

        let loaded = db.cash_flow().load_position().await.unwrap();
        assert_eq!(loaded.capital("CZK").unwrap(), dec!(90000));
        assert!(loaded.balance("EUR").is_err());
    }
}
