//! # API Error Type
//!
//! What the host UI receives when a command fails.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Counter                            │
//! │                                                                         │
//! │  Command function → Result<T, ApiError>                                 │
//! │       │                                                                 │
//! │       ├── ValidationError ─────────────► MALFORMED_INPUT                │
//! │       ├── CoreError::MissingReferenceData ► MISSING_REFERENCE_DATA      │
//! │       ├── CoreError::UnknownDenomination ─► MALFORMED_INPUT             │
//! │       ├── CoreError::InsufficientLiquidity ► INSUFFICIENT_LIQUIDITY     │
//! │       │                                      + details { side, ... }    │
//! │       └── DbError ─────────────────────────► DATABASE_ERROR             │
//! │                                                                         │
//! │  {"ok":false,"error":{"code":"INSUFFICIENT_LIQUIDITY",                  │
//! │                       "message":"Insufficient CZK: ...",                │
//! │                       "details":{"side":"CZK","shortfall":"0.01",...}}} │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kasa_core::{CoreError, ValidationError};
use kasa_db::DbError;
use serde::Serialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use tracing::{error, warn};

/// API error returned from commands.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable message for the result card
    pub message: String,

    /// Structured context (liquidity rejections)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Form or request could not be parsed or validated
    MalformedInput,

    /// Rate table, cash-flow sheet or denomination table lacks the currency
    MissingReferenceData,

    /// The counter cannot cover the order
    InsufficientLiquidity,

    /// Lookup of a stored record failed
    NotFound,

    /// Database operation failed
    DatabaseError,

    /// Anything else
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::MalformedInput, message)
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::malformed(err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        if err.is_business_rejection() {
            warn!(%err, "Order rejected");
        }

        let message = err.to_string();
        match err {
            CoreError::MissingReferenceData { .. } => {
                ApiError::new(ErrorCode::MissingReferenceData, message)
            }
            CoreError::UnknownDenomination { .. }
            | CoreError::DuplicateCurrency(_)
            | CoreError::Validation(_) => ApiError::malformed(message),
            CoreError::InsufficientLiquidity {
                side,
                required,
                available,
                shortfall,
            } => ApiError::new(ErrorCode::InsufficientLiquidity, message).with_details(json!({
                "side": side,
                "required": required.to_string(),
                "available": available.to_string(),
                "shortfall": shortfall.to_string(),
            })),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Core(core) => core.into(),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::InvalidData { field, value } => {
                error!(%field, %value, "Stored value does not parse");
                ApiError::new(
                    ErrorCode::DatabaseError,
                    format!("Stored {} is corrupt", field),
                )
            }
            DbError::UniqueViolation { field, .. } => {
                error!(%field, "Unique constraint violated");
                ApiError::new(ErrorCode::DatabaseError, "Duplicate ledger entry")
            }
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!("Migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// The in-memory ledger cannot fail.
impl From<Infallible> for ApiError {
    fn from(err: Infallible) -> Self {
        match err {}
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for command functions.
pub type ApiResult<T> = Result<T, ApiError>;
