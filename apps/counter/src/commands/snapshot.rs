//! # Snapshot Commands
//!
//! The host UI owns the rate table and the cash-flow sheet; it pushes their
//! raw rows here whenever they change. Each import validates the whole sheet
//! and replaces the stored snapshot, or changes nothing.

use kasa_core::catalog::LimitBreach;
use kasa_core::{
    CashFlowRow, CashPosition, CoreError, CurrencyQuote, RateCatalog, RateRow, BASE_CURRENCY,
};
use kasa_db::DbError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RateImportSummary {
    pub imported: usize,
    pub codes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowImportSummary {
    pub imported: usize,
    /// Currencies now holding more than their cash limit.
    pub limit_warnings: Vec<LimitBreach>,
}

/// Everything the order form needs to pre-fill rates.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBoard {
    pub base_currency: String,
    pub quotes: Vec<CurrencyQuote>,
    pub limit_warnings: Vec<LimitBreach>,
}

/// Loads a stored snapshot, mapping "never imported" to `None`.
async fn optional<T>(load: impl std::future::Future<Output = Result<T, DbError>>) -> ApiResult<Option<T>> {
    match load.await {
        Ok(value) => Ok(Some(value)),
        Err(DbError::Core(CoreError::MissingReferenceData { .. })) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn breaches(catalog: Option<&RateCatalog>, position: Option<&CashPosition>) -> Vec<LimitBreach> {
    match (catalog, position) {
        (Some(catalog), Some(position)) => {
            let found = catalog.limit_breaches(position);
            for breach in &found {
                warn!(
                    currency = %breach.currency,
                    balance = %breach.balance,
                    limit = %breach.limit,
                    "Cash limit exceeded"
                );
            }
            found
        }
        _ => Vec::new(),
    }
}

/// Replaces the stored rate table with the given sheet rows.
///
/// Rows with a blank code cell are skipped. Column layout: flag, code,
/// rate amount, buy, sell, buy VIP, sell VIP, optional cash limit.
pub async fn import_rate_table(state: &AppState, rows: Vec<Vec<String>>) -> ApiResult<RateImportSummary> {
    debug!(rows = rows.len(), "import_rate_table command");

    let parsed = RateRow::parse_table(&rows)?;
    let catalog = RateCatalog::from_rows(BASE_CURRENCY, parsed)?;
    let imported = state.db.rates().replace_snapshot(&catalog).await?;

    info!(imported, "Rate table replaced");

    Ok(RateImportSummary {
        imported,
        codes: catalog.codes().into_iter().map(String::from).collect(),
    })
}

/// Replaces the stored balances with the given cash-flow rows.
///
/// Only the currency (third) and balance (sixth) columns are read; the last
/// row per currency wins.
pub async fn import_cash_flow(state: &AppState, rows: Vec<Vec<String>>) -> ApiResult<CashFlowImportSummary> {
    debug!(rows = rows.len(), "import_cash_flow command");

    let position = CashPosition::from_rows(CashFlowRow::parse_table(&rows)?);
    let imported = state.db.cash_flow().replace_snapshot(&position).await?;

    let catalog = optional(state.db.rates().load_catalog(BASE_CURRENCY)).await?;
    let limit_warnings = breaches(catalog.as_ref(), Some(&position));

    info!(imported, warnings = limit_warnings.len(), "Cash-flow balances replaced");

    Ok(CashFlowImportSummary {
        imported,
        limit_warnings,
    })
}

/// Current quotes in sheet order, with cash-limit warnings when balances
/// are known.
pub async fn list_quotes(state: &AppState) -> ApiResult<QuoteBoard> {
    debug!("list_quotes command");

    let catalog = state.db.rates().load_catalog(BASE_CURRENCY).await?;
    let position = optional(state.db.cash_flow().load_position()).await?;
    let limit_warnings = breaches(Some(&catalog), position.as_ref());

    Ok(QuoteBoard {
        base_currency: BASE_CURRENCY.to_string(),
        quotes: catalog.quotes().to_vec(),
        limit_warnings,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{cash_sheet, empty_state, rate_sheet, row};
    use crate::error::ErrorCode;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_import_rate_table() {
        let state = empty_state().await;
        let summary = import_rate_table(&state, rate_sheet()).await.unwrap();

        assert_eq!(summary.imported, 3);
        assert_eq!(summary.codes, vec!["EUR", "USD", "HUF"]);

        let board = list_quotes(&state).await.unwrap();
        assert_eq!(board.base_currency, "CZK");
        assert_eq!(board.quotes[0].buy_rate, dec!(25.50));
        assert_eq!(board.quotes[0].cash_limit, dec!(20000));
        assert_eq!(board.quotes[2].rate_amount, dec!(100));
        assert!(board.limit_warnings.is_empty());
    }

    #[tokio::test]
    async fn test_bad_sheet_keeps_previous_snapshot() {
        let state = empty_state().await;
        import_rate_table(&state, rate_sheet()).await.unwrap();

        let mut broken = rate_sheet();
        broken.push(row(&["", "EUR", "1", "1", "1", "1", "1"]));
        let err = import_rate_table(&state, broken).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedInput);

        let err = import_rate_table(&state, vec![row(&["", "CZK", "1", "1", "1", "1", "1"])])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedInput);

        assert_eq!(list_quotes(&state).await.unwrap().quotes.len(), 3);
    }

    #[tokio::test]
    async fn test_list_quotes_without_import() {
        let state = empty_state().await;
        let err = list_quotes(&state).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingReferenceData);
    }

    #[tokio::test]
    async fn test_cash_flow_import_reports_limit_breaches() {
        let state = empty_state().await;
        import_rate_table(&state, rate_sheet()).await.unwrap();

        let mut sheet = cash_sheet();
        sheet.push(row(&["08.03.2026", "deposit", "EUR", "25000", "0", "25 532,50"]));
        let summary = import_cash_flow(&state, sheet).await.unwrap();

        assert_eq!(summary.imported, 3);
        assert_eq!(summary.limit_warnings.len(), 1);
        assert_eq!(summary.limit_warnings[0].currency, "EUR");
        assert_eq!(summary.limit_warnings[0].balance, dec!(25532.50));

        let board = list_quotes(&state).await.unwrap();
        assert_eq!(board.limit_warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_cash_flow_import_before_rates() {
        let state = empty_state().await;
        let summary = import_cash_flow(&state, cash_sheet()).await.unwrap();
        assert_eq!(summary.imported, 3);
        assert!(summary.limit_warnings.is_empty());
    }
}
