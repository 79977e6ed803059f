//! # Repository Module
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Counter command                                                        │
//! │       │                                                                 │
//! │       │  db.orders().append(draft)                                      │
//! │       ▼                                                                 │
//! │  OrderRepository          RateTableRepository     CashFlowRepository    │
//! │  ├── append (ledger)      ├── replace_snapshot    ├── replace_snapshot  │
//! │  ├── get_by_number        └── load_catalog        └── load_position     │
//! │  ├── list_recent                                                        │
//! │  └── last_number                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decimals are stored as TEXT and parsed back through [`parse_stored`].

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{DbError, DbResult};

pub mod cash_flow;
pub mod order;
pub mod rates;

/// Parses a decimal column written by this crate.
pub(crate) fn parse_stored(field: &str, raw: &str) -> DbResult<Decimal> {
    Decimal::from_str(raw).map_err(|_| DbError::invalid(field, raw))
}
