//! # kasa-db: Database Layer for the Exchange Counter
//!
//! SQLite storage behind the order ledger and the reference snapshots the
//! host UI imports (rate table, cash-flow balances).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasa Data Flow                                   │
//! │                                                                         │
//! │  Counter command (submit_order)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kasa-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ OrderRepo     │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ RateTableRepo │    │              │  │   │
//! │  │   │               │    │ CashFlowRepo  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (KASA_DB_PATH, default ./kasa.db)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Orders, rate table and cash-flow snapshots
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kasa_core::OrderLedger;
//! use kasa_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./kasa.db")).await?;
//! let catalog = db.rates().load_catalog("CZK").await?;
//! let order = db.orders().append(draft).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::cash_flow::CashFlowRepository;
pub use repository::order::OrderRepository;
pub use repository::rates::RateTableRepository;
