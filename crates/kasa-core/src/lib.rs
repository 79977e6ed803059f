//! # kasa-core: Pure Business Logic for the Exchange Counter
//!
//! This crate holds the two engines of the counter as pure functions with
//! zero I/O dependencies: order pricing and cash reconciliation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Kasa Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Host UI (spreadsheet add-on)                 │   │
//! │  │    Order form ──► Result card     Count form ──► Audit card     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON lines                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/counter commands                        │   │
//! │  │    submit_order, quote_order, reconcile_cash, import_*          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasa-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌──────────────┐  ┌─────────┐  │   │
//! │  │   │  pricing  │  │  catalog  │  │reconciliation│  │  money  │  │   │
//! │  │   │ Settlement│  │ RateCat.  │  │ Breakdown    │  │Precision│  │   │
//! │  │   └───────────┘  └───────────┘  └──────────────┘  └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasa-db (Order Ledger)                       │   │
//! │  │        SQLite orders, rate table and cash-flow snapshots        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, CurrencyQuote, ReconciliationResult, ...)
//! - [`money`] - Base-currency `Money` and per-currency `Precision`
//! - [`catalog`] - Rate table and cash-flow snapshots as named records
//! - [`denominations`] - Static note/coin tables
//! - [`validation`] - Order form parsing
//! - [`pricing`] - Settlement total and liquidity decision
//! - [`reconciliation`] - Counted cash vs recorded balance
//! - [`ledger`] - The order-ledger capability
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use kasa_core::denominations::precision;
//! use kasa_core::reconciliation::reconcile;
//! use kasa_core::{Classification, DenominationCount};
//! use rust_decimal::Decimal;
//!
//! let counted = vec![
//!     DenominationCount::new(Decimal::from(1000), 10),
//!     DenominationCount::new(Decimal::from(200), 25),
//! ];
//! let result = reconcile("CZK", Decimal::from(15000), &counted).unwrap();
//!
//! assert_eq!(result.classification, Classification::Match);
//! assert_eq!(precision("CZK").unwrap().places(), 0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod denominations;
pub mod error;
pub mod ledger;
pub mod money;
pub mod pricing;
pub mod reconciliation;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{CashFlowRow, CashPosition, RateCatalog, RateRow};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{MemoryLedger, OrderLedger};
pub use money::{Money, Precision};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Home currency every rate is quoted against.
pub const BASE_CURRENCY: &str = "CZK";

/// Decimal places of the base currency. Settlement totals always use this.
pub const BASE_PRECISION: u32 = 2;

/// Upper bound of the per-order discount, in percent.
pub const MAX_DISCOUNT_PCT: i64 = 100;

/// Maximum length of the free-text order note.
pub const MAX_NOTE_LEN: usize = 500;
