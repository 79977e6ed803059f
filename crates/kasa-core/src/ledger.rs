//! # Order Ledger
//!
//! The append-only store of accepted orders, as a capability the counter
//! is handed rather than a global it reaches for.
//!
//! ## Numbering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  append(draft)                                                          │
//! │     │                                                                   │
//! │     ├── next = sequence + 1          ┐                                  │
//! │     ├── row  = draft + "000123"      │  one atomic step: two appends   │
//! │     └── sequence = next              ┘  never share a number           │
//! │                                                                         │
//! │  A failed append leaves the sequence where it was.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`MemoryLedger`] serves tests and dry runs; `kasa-db` provides the SQLite
//! implementation.

use std::convert::Infallible;
use std::future::Future;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::CoreError;
use crate::money::Money;
use crate::types::{Direction, Order, OrderRequest, Settlement};

/// Width of the zero-padded order number.
pub const ORDER_NUMBER_WIDTH: usize = 6;

/// Renders a sequence value as an order number: `42` → `"000042"`.
pub fn format_order_number(sequence: u64) -> String {
    format!("{:0width$}", sequence, width = ORDER_NUMBER_WIDTH)
}

/// An accepted order that has not been numbered yet.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub direction: Direction,
    pub currency: String,
    pub rate: Decimal,
    pub amount: i64,
    pub discount_pct: Decimal,
    pub vip: bool,
    pub note: String,
    pub submitted_by: String,
    pub total_paid: Money,
}

impl OrderDraft {
    /// Builds a draft from a priced request. Rejected settlements fail with
    /// `InsufficientLiquidity` so they can never reach a ledger.
    pub fn accepted(request: &OrderRequest, settlement: Settlement) -> Result<Self, CoreError> {
        let settlement = settlement.into_result()?;

        Ok(OrderDraft {
            direction: settlement.direction,
            currency: settlement.currency,
            rate: settlement.rate,
            amount: settlement.amount,
            discount_pct: request.discount_pct,
            vip: request.vip,
            note: request.note.clone(),
            submitted_by: request.submitted_by.clone(),
            total_paid: settlement.total_paid,
        })
    }

    /// Completes the draft with its number, id and timestamp.
    pub fn into_order(self, id: String, sequence: u64, created_at: chrono::DateTime<Utc>) -> Order {
        Order {
            id,
            order_number: format_order_number(sequence),
            direction: self.direction,
            currency: self.currency,
            rate: self.rate,
            amount: self.amount,
            discount_pct: self.discount_pct,
            vip: self.vip,
            note: self.note,
            submitted_by: self.submitted_by,
            total_paid: self.total_paid,
            created_at,
        }
    }
}

/// Append-only order store with an atomic order-number sequence.
pub trait OrderLedger: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Numbers the draft and appends it in one step.
    fn append(&self, draft: OrderDraft) -> impl Future<Output = Result<Order, Self::Error>> + Send;
}

// =============================================================================
// In-Memory Ledger
// =============================================================================

#[derive(Debug, Default)]
struct MemoryState {
    sequence: u64,
    orders: Vec<Order>,
}

/// Ledger held in process memory.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Mutex<MemoryState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts numbering after `sequence` (e.g. continuing an existing book).
    pub fn starting_at(sequence: u64) -> Self {
        MemoryLedger {
            state: Mutex::new(MemoryState {
                sequence,
                orders: Vec::new(),
            }),
        }
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.state.lock().await.orders.clone()
    }

    pub async fn last_sequence(&self) -> u64 {
        self.state.lock().await.sequence
    }
}

impl OrderLedger for MemoryLedger {
    type Error = Infallible;

    async fn append(&self, draft: OrderDraft) -> Result<Order, Self::Error> {
        let mut state = self.state.lock().await;
        let next = state.sequence + 1;
        let order = draft.into_order(Uuid::new_v4().to_string(), next, Utc::now());
        state.orders.push(order.clone());
        state.sequence = next;
        Ok(order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Shortfall;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn request() -> OrderRequest {
        OrderRequest {
            direction: Direction::Buy,
            currency: "USD".to_string(),
            rate: None,
            amount: 100,
            discount_pct: dec!(1),
            vip: true,
            note: "walk-in".to_string(),
            submitted_by: "petr".to_string(),
        }
    }

    fn settlement(accepted: bool) -> Settlement {
        Settlement {
            direction: Direction::Buy,
            currency: "USD".to_string(),
            amount: 100,
            rate: dec!(22.80),
            total_paid: Money::from_hellers(225_720),
            accepted,
            shortfall: (!accepted).then(|| Shortfall {
                side: "CZK".to_string(),
                required: dec!(2257.20),
                available: dec!(2000),
                missing: dec!(257.20),
            }),
        }
    }

    #[test]
    fn test_format_order_number() {
        assert_eq!(format_order_number(1), "000001");
        assert_eq!(format_order_number(123_456), "123456");
        assert_eq!(format_order_number(1_234_567), "1234567");
    }

    #[test]
    fn test_rejected_settlement_has_no_draft() {
        let err = OrderDraft::accepted(&request(), settlement(false)).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientLiquidity { .. }));
    }

    #[tokio::test]
    async fn test_append_numbers_sequentially() {
        let ledger = MemoryLedger::starting_at(41);
        let draft = OrderDraft::accepted(&request(), settlement(true)).unwrap();

        let first = ledger.append(draft.clone()).await.unwrap();
        let second = ledger.append(draft).await.unwrap();

        assert_eq!(first.order_number, "000042");
        assert_eq!(second.order_number, "000043");
        assert_eq!(first.discount_pct, dec!(1));
        assert!(first.vip);
        assert_ne!(first.id, second.id);
        assert_eq!(ledger.orders().await.len(), 2);
        assert_eq!(ledger.last_sequence().await, 43);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_never_share_a_number() {
        let ledger = Arc::new(MemoryLedger::new());
        let draft = OrderDraft::accepted(&request(), settlement(true)).unwrap();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let draft = draft.clone();
                tokio::spawn(async move { ledger.append(draft).await.unwrap() })
            })
            .collect();

        let mut numbers = HashSet::new();
        for handle in handles {
            numbers.insert(handle.await.unwrap().order_number);
        }
        assert_eq!(numbers.len(), 32);
        assert!(numbers.contains("000032"));
    }
}
