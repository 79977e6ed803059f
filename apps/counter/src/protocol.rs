//! # Command Protocol
//!
//! JSON lines over stdio. Each request line names a command and carries its
//! arguments inline; each response line echoes the request `id`.
//!
//! ```text
//! → {"id":1,"command":"list_quotes"}
//! ← {"id":1,"ok":true,"data":{"baseCurrency":"CZK","quotes":[...]}}
//!
//! → {"id":2,"command":"submit_order","direction":"buy","currency":"EUR","amount":"40"}
//! ← {"id":2,"ok":false,"error":{"code":"INSUFFICIENT_LIQUIDITY",...}}
//! ```
//!
//! Requests are handled one at a time in arrival order. Blank lines are
//! skipped; a line that is not a valid request gets a `MALFORMED_INPUT`
//! response and the loop carries on.

use kasa_core::validation::OrderForm;
use kasa_core::DenominationCount;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::commands::{order, reconcile, snapshot, status};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// One request line.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// Correlation id chosen by the caller, echoed back verbatim
    #[serde(default)]
    pub id: Option<Value>,

    #[serde(flatten)]
    pub request: Request,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Request {
    ImportRateTable {
        rows: Vec<Vec<String>>,
    },
    ImportCashFlow {
        rows: Vec<Vec<String>>,
    },
    ListQuotes,
    QuoteOrder(OrderForm),
    SubmitOrder(OrderForm),
    #[serde(rename_all = "camelCase")]
    RecentOrders {
        #[serde(default)]
        limit: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    GetOrder {
        order_number: String,
    },
    ReconcileCash {
        currency: String,
        counted: Vec<DenominationCount>,
    },
    Denominations {
        currency: String,
    },
    Status,
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::ImportRateTable { .. } => "import_rate_table",
            Request::ImportCashFlow { .. } => "import_cash_flow",
            Request::ListQuotes => "list_quotes",
            Request::QuoteOrder(_) => "quote_order",
            Request::SubmitOrder(_) => "submit_order",
            Request::RecentOrders { .. } => "recent_orders",
            Request::GetOrder { .. } => "get_order",
            Request::ReconcileCash { .. } => "reconcile_cash",
            Request::Denominations { .. } => "denominations",
            Request::Status => "status",
        }
    }
}

/// One response line.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl Response {
    fn from_result(id: Option<Value>, result: ApiResult<Value>) -> Self {
        match result {
            Ok(data) => Response {
                id,
                ok: true,
                data: Some(data),
                error: None,
            },
            Err(error) => Response {
                id,
                ok: false,
                data: None,
                error: Some(error),
            },
        }
    }
}

fn to_data<T: Serialize>(value: T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(format!("Response encoding failed: {}", e)))
}

/// Runs one request against the state.
pub async fn dispatch(state: &AppState, request: Request) -> ApiResult<Value> {
    match request {
        Request::ImportRateTable { rows } => to_data(snapshot::import_rate_table(state, rows).await?),
        Request::ImportCashFlow { rows } => to_data(snapshot::import_cash_flow(state, rows).await?),
        Request::ListQuotes => to_data(snapshot::list_quotes(state).await?),
        Request::QuoteOrder(form) => to_data(order::quote_order(state, form).await?),
        Request::SubmitOrder(form) => to_data(order::submit_order(state, form).await?),
        Request::RecentOrders { limit } => to_data(order::recent_orders(state, limit).await?),
        Request::GetOrder { order_number } => to_data(order::get_order(state, &order_number).await?),
        Request::ReconcileCash { currency, counted } => {
            to_data(reconcile::reconcile_cash(state, &currency, counted).await?)
        }
        Request::Denominations { currency } => to_data(reconcile::denominations(&currency)?),
        Request::Status => to_data(status::status(state).await?),
    }
}

/// Parses and runs one request line.
pub async fn handle_line(state: &AppState, line: &str) -> Response {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Request is not JSON");
            return Response::from_result(None, Err(ApiError::malformed(format!("Invalid JSON: {}", e))));
        }
    };

    let id = value.get("id").cloned();

    let envelope: Envelope = match serde_json::from_value(value) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Unrecognised request");
            return Response::from_result(id, Err(ApiError::malformed(format!("Invalid request: {}", e))));
        }
    };

    debug!(command = envelope.request.name(), "Dispatching");
    Response::from_result(envelope.id, dispatch(state, envelope.request).await)
}

/// Serves requests from `reader` until end of input, one response line per
/// request line.
pub async fn serve<R, W>(state: &AppState, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(state, &line).await;
        let mut encoded = serde_json::to_string(&response)?;
        encoded.push('\n');

        writer.write_all(encoded.as_bytes()).await?;
        writer.flush().await?;
    }

    debug!("Input closed");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
