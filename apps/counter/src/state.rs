//! # Counter State
//!
//! Everything a command may need, built once at startup and shared
//! read-only. `Database` wraps a `SqlitePool`, which is already safe to use
//! from concurrent commands, so no lock is taken here.

use kasa_db::Database;

use crate::config::CounterConfig;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: CounterConfig,
}

impl AppState {
    pub fn new(db: Database, config: CounterConfig) -> Self {
        AppState { db, config }
    }
}
