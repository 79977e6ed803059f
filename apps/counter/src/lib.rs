//! # Kasa Counter Library
//!
//! Command service behind the exchange counter UI.
//!
//! ## Module Organization
//! ```text
//! kasa_counter/
//! ├── lib.rs          ◄─── You are here (logging, startup, run loop)
//! ├── config.rs       ◄─── Environment configuration
//! ├── state.rs        ◄─── Shared state handed to every command
//! ├── protocol.rs     ◄─── JSON-lines envelope and dispatch
//! ├── commands/
//! │   ├── snapshot.rs ◄─── Rate table and cash-flow imports, quote board
//! │   ├── order.rs    ◄─── Pricing preview, order submission, lookups
//! │   ├── reconcile.rs◄─── Cash count against recorded balance
//! │   └── status.rs   ◄─── Health and numbering status
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. CounterConfig::load     KASA_DB_PATH, KASA_OPERATOR, ...            │
//! │  2. init_tracing            stderr, filter from RUST_LOG                │
//! │  3. Database::new           WAL, busy timeout, pending migrations       │
//! │  4. protocol::serve         stdin → commands → stdout until EOF         │
//! │  5. Database::close                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! stdout carries protocol lines only; every log line goes to stderr.

pub mod commands;
pub mod config;
pub mod error;
pub mod protocol;
pub mod state;

use tokio::io::{stdin, stdout, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{ConfigError, CounterConfig, DEFAULT_LOG_FILTER};
use kasa_db::{Database, DbConfig, DbError};
use state::AppState;

/// Startup and I/O failures of the service itself. Command failures never
/// end up here; they are answered on the protocol.
#[derive(Debug, thiserror::Error)]
pub enum CounterError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initializes the tracing subscriber on stderr.
///
/// An unparsable filter falls back to the default instead of failing
/// startup.
pub fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the database and serves stdin until it closes.
pub async fn run(config: CounterConfig) -> Result<(), CounterError> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        db_path = %config.database_path.display(),
        "Starting Kasa counter"
    );

    let db = Database::new(DbConfig::new(config.database_path.clone())).await?;
    info!("Database connected and migrations applied");

    let state = AppState::new(db, config);
    let served = protocol::serve(&state, BufReader::new(stdin()), stdout()).await;

    state.db.close().await;
    served?;

    info!("Kasa counter stopped");
    Ok(())
}
