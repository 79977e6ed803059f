//! # Rate Table Repository
//!
//! Keeps the latest imported rate table. An import replaces the whole
//! snapshot; there is no history.

use chrono::Utc;
use kasa_core::{CoreError, RateCatalog, RateRow};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::parse_stored;
use crate::error::DbResult;

#[derive(Debug, sqlx::FromRow)]
struct RateTableRow {
    code: String,
    flag: Option<String>,
    rate_amount: String,
    buy_rate: String,
    sell_rate: String,
    buy_rate_vip: String,
    sell_rate_vip: String,
    cash_limit: String,
}

impl RateTableRow {
    fn into_rate_row(self) -> DbResult<RateRow> {
        Ok(RateRow {
            rate_amount: parse_stored("rate_table.rate_amount", &self.rate_amount)?,
            buy_rate: parse_stored("rate_table.buy_rate", &self.buy_rate)?,
            sell_rate: parse_stored("rate_table.sell_rate", &self.sell_rate)?,
            buy_rate_vip: parse_stored("rate_table.buy_rate_vip", &self.buy_rate_vip)?,
            sell_rate_vip: parse_stored("rate_table.sell_rate_vip", &self.sell_rate_vip)?,
            cash_limit: parse_stored("rate_table.cash_limit", &self.cash_limit)?,
            flag: self.flag,
            code: self.code,
        })
    }
}

/// Repository for the rate table snapshot.
#[derive(Debug, Clone)]
pub struct RateTableRepository {
    pool: SqlitePool,
}

impl RateTableRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RateTableRepository { pool }
    }

    /// Replaces the stored table with `catalog`, keeping its row order.
    ///
    /// Returns the number of quotes written.
    pub async fn replace_snapshot(&self, catalog: &RateCatalog) -> DbResult<usize> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM rate_table")
            .execute(&mut *tx)
            .await?;

        for (position, quote) in catalog.quotes().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO rate_table (
                    code, position, flag, rate_amount, buy_rate, sell_rate,
                    buy_rate_vip, sell_rate_vip, cash_limit, imported_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(&quote.code)
            .bind(position as i64)
            .bind(&quote.flag)
            .bind(quote.rate_amount.to_string())
            .bind(quote.buy_rate.to_string())
            .bind(quote.sell_rate.to_string())
            .bind(quote.buy_rate_vip.to_string())
            .bind(quote.sell_rate_vip.to_string())
            .bind(quote.cash_limit.to_string())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(quotes = catalog.quotes().len(), "Rate table imported");
        Ok(catalog.quotes().len())
    }

    /// Loads the stored table and re-validates it against `base_currency`.
    ///
    /// ## Errors
    /// - `DbError::Core(MissingReferenceData)` when nothing was imported yet
    /// - `DbError::InvalidData` when a stored number no longer parses
    pub async fn load_catalog(&self, base_currency: &str) -> DbResult<RateCatalog> {
        let rows: Vec<RateTableRow> = sqlx::query_as(
            r#"
            SELECT code, flag, rate_amount, buy_rate, sell_rate,
                   buy_rate_vip, sell_rate_vip, cash_limit
            FROM rate_table
            ORDER BY position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(rows = rows.len(), "Loaded rate table");

        if rows.is_empty() {
            return Err(CoreError::missing("rate table", base_currency).into());
        }

        let rows = rows
            .into_iter()
            .map(RateTableRow::into_rate_row)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(RateCatalog::from_rows(base_currency, rows)?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
