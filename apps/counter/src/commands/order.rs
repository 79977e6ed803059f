//! # Order Commands
//!
//! ## Submit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderForm (raw strings)                                                │
//! │       │  OrderForm::parse                  ✗ MALFORMED_INPUT            │
//! │       ▼                                                                 │
//! │  OrderRequest                                                           │
//! │       │  load rate table + cash flow       ✗ MISSING_REFERENCE_DATA     │
//! │       ▼                                                                 │
//! │  pricing::quote_order → Settlement                                      │
//! │       │  OrderDraft::accepted              ✗ INSUFFICIENT_LIQUIDITY     │
//! │       ▼                                                                 │
//! │  OrderLedger::append (number + row, atomic)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderReceipt { order, ledgerRow, settlement }                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `quote_order` runs the same steps without the append, so the form can
//! show the total and the liquidity verdict before the operator confirms.

use kasa_core::ledger::OrderDraft;
use kasa_core::pricing;
use kasa_core::validation::OrderForm;
use kasa_core::{
    CashPosition, LedgerRow, Order, OrderLedger, OrderRequest, RateCatalog, Settlement,
    BASE_CURRENCY,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Result card of a recorded order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order: Order,
    /// The twelve ledger columns, ready to append to the order sheet.
    pub ledger_row: Vec<String>,
    pub settlement: Settlement,
}

fn parse_form(state: &AppState, form: &OrderForm) -> ApiResult<OrderRequest> {
    let mut form = form.clone();
    if form.submitted_by.trim().is_empty() {
        if let Some(operator) = &state.config.default_operator {
            form.submitted_by = operator.clone();
        }
    }
    Ok(form.parse(BASE_CURRENCY)?)
}

async fn load_snapshots(state: &AppState) -> ApiResult<(RateCatalog, CashPosition)> {
    let catalog = state.db.rates().load_catalog(BASE_CURRENCY).await?;
    let position = state.db.cash_flow().load_position().await?;
    Ok((catalog, position))
}

/// Prices the form without recording anything.
///
/// A liquidity rejection is not an error here: the settlement comes back
/// with `accepted: false` and the shortfall.
pub async fn quote_order(state: &AppState, form: OrderForm) -> ApiResult<Settlement> {
    debug!(direction = %form.direction, currency = %form.currency, "quote_order command");

    let request = parse_form(state, &form)?;
    let (catalog, position) = load_snapshots(state).await?;

    Ok(pricing::quote_order(&catalog, &position, &request)?)
}

/// Prices the form and, when the counter can cover it, records the order.
pub async fn submit_order(state: &AppState, form: OrderForm) -> ApiResult<OrderReceipt> {
    debug!(direction = %form.direction, currency = %form.currency, "submit_order command");

    let request = parse_form(state, &form)?;
    let (catalog, position) = load_snapshots(state).await?;

    record_order(&state.db.orders(), &catalog, &position, &request).await
}

/// Prices `request` and appends it to `ledger` if accepted.
///
/// Generic over the ledger so the same path runs against SQLite in the app
/// and against `MemoryLedger` in tests.
pub async fn record_order<L>(
    ledger: &L,
    catalog: &RateCatalog,
    position: &CashPosition,
    request: &OrderRequest,
) -> ApiResult<OrderReceipt>
where
    L: OrderLedger,
    ApiError: From<L::Error>,
{
    let settlement = pricing::quote_order(catalog, position, request)?;
    let draft = OrderDraft::accepted(request, settlement.clone())?;
    let order = ledger.append(draft).await?;

    info!(
        order_number = %order.order_number,
        direction = %order.direction,
        currency = %order.currency,
        amount = order.amount,
        total_paid = %order.total_paid,
        "Order accepted"
    );

    Ok(OrderReceipt {
        ledger_row: LedgerRow::from_order(&order).to_columns(),
        order,
        settlement,
    })
}

/// Newest orders first; `limit` falls back to the configured page size.
pub async fn recent_orders(state: &AppState, limit: Option<u32>) -> ApiResult<Vec<Order>> {
    let limit = limit.unwrap_or(state.config.recent_limit);
    debug!(limit, "recent_orders command");

    Ok(state.db.orders().list_recent(limit).await?)
}

pub async fn get_order(state: &AppState, order_number: &str) -> ApiResult<Order> {
    debug!(%order_number, "get_order command");

    state
        .db
        .orders()
        .get_by_number(order_number)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", order_number))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::seeded_state;
    use crate::error::ErrorCode;
    use kasa_core::{CashFlowRow, Direction, MemoryLedger, RateRow};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn form(direction: &str, currency: &str, amount: &str) -> OrderForm {
        OrderForm {
            direction: direction.to_string(),
            currency: currency.to_string(),
            amount: amount.to_string(),
            submitted_by: "jana".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_quote_order_uses_table_rate() {
        let state = seeded_state().await;
        let settlement = quote_order(&state, form("sell", "eur", "200")).await.unwrap();

        assert_eq!(settlement.rate, dec!(24.20));
        assert_eq!(settlement.total_paid.to_decimal(), dec!(4840.00));
        // 532.50 EUR on hand
        assert!(settlement.accepted);
        assert_eq!(state.db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_quote_order_reports_shortfall_without_error() {
        let state = seeded_state().await;
        let settlement = quote_order(&state, form("sell", "EUR", "600")).await.unwrap();

        assert!(!settlement.accepted);
        let gap = settlement.shortfall.unwrap();
        assert_eq!(gap.side, "EUR");
        assert_eq!(gap.missing, dec!(67.50));
    }

    #[tokio::test]
    async fn test_submit_buy_at_capital_boundary() {
        let state = seeded_state().await;

        // 40 × 25.00 = 1000.00 against 1000 CZK on hand
        let mut at_limit = form("buy", "EUR", "40");
        at_limit.rate = Some("25".to_string());
        let receipt = submit_order(&state, at_limit).await.unwrap();

        assert_eq!(receipt.order.order_number, "000001");
        assert_eq!(receipt.order.total_paid.to_decimal(), dec!(1000.00));
        assert_eq!(receipt.ledger_row.len(), 12);
        assert_eq!(receipt.ledger_row[1], "buy");
        assert_eq!(receipt.ledger_row[10], "1000.00");

        // 40 × 25.00025 → 1000.01, one heller over
        let mut over = form("buy", "EUR", "40");
        over.rate = Some("25.00025".to_string());
        let err = submit_order(&state, over).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientLiquidity);
        let details = err.details.unwrap();
        assert_eq!(details["side"], "CZK");
        assert_eq!(details["shortfall"], "0.01");
        assert_eq!(state.db.orders().last_number().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_submit_sell_rejected_when_amount_exceeds_cash() {
        let state = seeded_state().await;

        let err = submit_order(&state, form("sell", "USD", "51")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientLiquidity);

        let receipt = submit_order(&state, form("sell", "USD", "50")).await.unwrap();
        assert_eq!(receipt.order.direction, Direction::Sell);
        assert_eq!(receipt.order.rate, dec!(22.40));
    }

    #[tokio::test]
    async fn test_submit_rejects_malformed_and_unknown() {
        let state = seeded_state().await;

        let err = submit_order(&state, form("sell", "EUR", "12.5")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedInput);

        let err = submit_order(&state, form("sell", "CZK", "10")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedInput);

        let err = submit_order(&state, form("sell", "GBP", "10")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingReferenceData);

        assert_eq!(state.db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_default_operator_fills_blank_submitter() {
        let mut state = seeded_state().await;
        state.config.default_operator = Some("petr".to_string());

        let mut f = form("sell", "EUR", "10");
        f.submitted_by = String::new();
        let receipt = submit_order(&state, f).await.unwrap();
        assert_eq!(receipt.order.submitted_by, "petr");
    }

    #[tokio::test]
    async fn test_recent_and_get_order() {
        let state = seeded_state().await;
        for amount in ["10", "20", "30"] {
            submit_order(&state, form("sell", "EUR", amount)).await.unwrap();
        }

        let recent = recent_orders(&state, Some(2)).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].order_number, "000003");

        let order = get_order(&state, "000002").await.unwrap();
        assert_eq!(order.amount, 20);

        let err = get_order(&state, "000099").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_record_order_against_memory_ledger() {
        let ledger = MemoryLedger::starting_at(99);
        let catalog = RateCatalog::from_rows(
            "CZK",
            vec![RateRow {
                flag: None,
                code: "EUR".to_string(),
                rate_amount: dec!(1),
                buy_rate: dec!(25.50),
                sell_rate: dec!(24.20),
                buy_rate_vip: dec!(25.20),
                sell_rate_vip: dec!(24.50),
                cash_limit: Decimal::ZERO,
            }],
        )
        .unwrap();
        let position = CashPosition::from_rows(vec![
            CashFlowRow { currency: "CZK".into(), balance: dec!(10000) },
            CashFlowRow { currency: "EUR".into(), balance: dec!(0) },
        ]);

        let mut request = form("buy", "EUR", "100").parse("CZK").unwrap();
        request.vip = true;
        let receipt = record_order(&ledger, &catalog, &position, &request)
            .await
            .unwrap();

        assert_eq!(receipt.order.order_number, "000100");
        assert_eq!(receipt.order.rate, dec!(25.20));
        assert_eq!(receipt.ledger_row[6], "yes");
        assert_eq!(ledger.orders().await.len(), 1);
    }
}
