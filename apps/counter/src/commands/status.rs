//! # Status Command
//!
//! Health probe for the host UI: is the database reachable, are the
//! migrations applied, which order number comes next.

use kasa_core::ledger::format_order_number;
use kasa_core::BASE_CURRENCY;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::ApiResult;
use crate::state::AppState;

/// Response DTO for the status command.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StatusDto {
    /// Whether `SELECT 1` succeeds
    pub healthy: bool,

    /// Crate version of the running service
    pub version: String,

    pub base_currency: String,

    pub migrations_total: usize,
    pub migrations_applied: usize,

    /// Last issued order number, `None` before the first order
    pub last_order_number: Option<String>,

    /// Number the next accepted order will get
    pub next_order_number: String,
}

pub async fn status(state: &AppState) -> ApiResult<StatusDto> {
    debug!("status command");

    let healthy = state.db.health_check().await;
    let (migrations_total, migrations_applied) = state.db.migration_status().await?;
    let last = state.db.orders().last_number().await?;

    Ok(StatusDto {
        healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        base_currency: BASE_CURRENCY.to_string(),
        migrations_total,
        migrations_applied,
        last_order_number: (last > 0).then(|| format_order_number(last)),
        next_order_number: format_order_number(last + 1),
    })
}
