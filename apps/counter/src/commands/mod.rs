//! # Commands Module
//!
//! Every operation the host UI can request.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports, shared test fixtures)
//! ├── snapshot.rs   ◄─── import_rate_table, import_cash_flow, list_quotes
//! ├── order.rs      ◄─── quote_order, submit_order, recent_orders, get_order
//! ├── reconcile.rs  ◄─── reconcile_cash, denominations
//! └── status.rs     ◄─── status
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Host UI writes one line:                                               │
//! │    {"id":7,"command":"submit_order","direction":"sell",...}             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  protocol::dispatch ──► commands::order::submit_order(&state, form)     │
//! │                              -> Result<OrderReceipt, ApiError>          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Host UI reads one line:                                                │
//! │    {"id":7,"ok":true,"data":{"order":{...},"ledgerRow":[...]}}          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands take `&AppState` and plain arguments, so they are called
//! directly from tests without going through the protocol.

pub mod order;
pub mod reconcile;
pub mod snapshot;
pub mod status;

#[cfg(test)]
pub(crate) mod fixtures {
    use kasa_db::{Database, DbConfig};

    use crate::commands::snapshot::{import_cash_flow, import_rate_table};
    use crate::config::CounterConfig;
    use crate::state::AppState;

    pub fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    /// EUR, USD and HUF, as the sheet exports them (data rows only).
    pub fn rate_sheet() -> Vec<Vec<String>> {
        vec![
            row(&["🇪🇺", "EUR", "1", "25,50", "24,20", "25,20", "24,50", "20 000"]),
            row(&["🇺🇸", "USD", "1", "23.60", "22.40", "23.40", "22.60", ""]),
            row(&["", "HUF", "100", "6.90", "6.10", "6.80", "6.20"]),
            row(&["", "", "", "", "", "", ""]),
        ]
    }

    /// date, note, currency, in, out, balance
    pub fn cash_sheet() -> Vec<Vec<String>> {
        vec![
            row(&["07.03.2026", "opening", "CZK", "1000", "0", "1000"]),
            row(&["07.03.2026", "opening", "EUR", "532.50", "0", "532.50"]),
            row(&["07.03.2026", "opening", "USD", "50", "0", "50"]),
        ]
    }

    pub async fn empty_state() -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        AppState::new(db, CounterConfig::default())
    }

    pub async fn seeded_state() -> AppState {
        let state = empty_state().await;
        import_rate_table(&state, rate_sheet()).await.unwrap();
        import_cash_flow(&state, cash_sheet()).await.unwrap();
        state
    }
}
