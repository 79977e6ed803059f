//! # Reconciliation Commands
//!
//! The count form lists the faces from `denominations`, the operator fills
//! in quantities, and `reconcile_cash` compares the total against the
//! balance recorded in the last cash-flow import.

use kasa_core::denominations as tables;
use kasa_core::reconciliation::{count_sheet, reconcile};
use kasa_core::validation::validate_currency_code;
use kasa_core::{DenominationCount, Precision, ReconciliationResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub result: ReconciliationResult,
    /// Printable audit lines for the result card
    pub breakdown_text: String,
}

/// Faces of one currency, split the way the count form shows them.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DenominationSheet {
    pub currency: String,
    pub precision: Precision,
    #[ts(as = "Vec<String>")]
    pub notes: Vec<Decimal>,
    #[ts(as = "Vec<String>")]
    pub coins: Vec<Decimal>,
    /// Blank count rows, notes first
    pub sheet: Vec<DenominationCount>,
}

pub async fn reconcile_cash(
    state: &AppState,
    currency: &str,
    counted: Vec<DenominationCount>,
) -> ApiResult<ReconciliationReport> {
    let currency = validate_currency_code(currency)?;
    debug!(%currency, entries = counted.len(), "reconcile_cash command");

    let position = state.db.cash_flow().load_position().await?;
    let recorded = position.balance(&currency)?;
    let result = reconcile(&currency, recorded, &counted)?;

    info!(
        %currency,
        counted = %result.counted_total,
        recorded = %result.recorded_balance,
        difference = %result.difference,
        classification = ?result.classification,
        "Cash reconciled"
    );

    Ok(ReconciliationReport {
        breakdown_text: result.breakdown_text(),
        result,
    })
}

pub fn denominations(currency: &str) -> ApiResult<DenominationSheet> {
    let currency = validate_currency_code(currency)?;
    let set = tables::denominations(&currency)?;

    Ok(DenominationSheet {
        precision: set.precision(),
        notes: set.notes(),
        coins: set.coins(),
        sheet: count_sheet(&currency)?,
        currency,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
