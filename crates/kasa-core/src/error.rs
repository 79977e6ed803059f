//! # Error Types
//!
//! Domain-specific error types for kasa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasa-core errors (this file)                                          │
//! │  ├── CoreError        - Reference data + business rejections           │
//! │  └── ValidationError  - Malformed form input                           │
//! │                                                                         │
//! │  kasa-db errors (separate crate)                                       │
//! │  └── DbError          - Ledger storage failures                        │
//! │                                                                         │
//! │  counter app errors                                                    │
//! │  └── ApiError         - What the host UI sees (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Host UI                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every rejection is terminal for its submission. Nothing here is retried.

use rust_decimal::Decimal;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Rate table, cash-flow snapshot or denomination table has no entry
    /// for the requested currency.
    ///
    /// ## When This Occurs
    /// - Currency missing from the imported rate table
    /// - No cash-flow row recorded for the currency
    /// - Reconciling a currency without a denomination table
    ///
    /// The engines never guess a rate or a precision for these.
    #[error("Missing reference data: {what} for {currency}")]
    MissingReferenceData { what: String, currency: String },

    /// A counted face value is not part of the currency's note/coin set.
    #[error("{face} is not a known denomination of {currency}")]
    UnknownDenomination { currency: String, face: Decimal },

    /// The same currency appears twice in a rate table snapshot.
    #[error("Currency {0} is listed more than once in the rate table")]
    DuplicateCurrency(String),

    /// The counter cannot cover the order.
    ///
    /// ## User Workflow
    /// ```text
    /// Sell 500 EUR
    ///      │
    ///      ▼
    /// Check cash: EUR on hand = 320
    ///      │
    ///      ▼
    /// InsufficientLiquidity { side: "EUR", required: 500, available: 320, shortfall: 180 }
    ///      │
    ///      ▼
    /// Host shows: "Not enough EUR: need 500, have 320 (short 180)"
    /// ```
    #[error("Insufficient {side}: required {required}, available {available}, short {shortfall}")]
    InsufficientLiquidity {
        side: String,
        required: Decimal,
        available: Decimal,
        shortfall: Decimal,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a MissingReferenceData error.
    pub fn missing(what: impl Into<String>, currency: impl Into<String>) -> Self {
        CoreError::MissingReferenceData {
            what: what.into(),
            currency: currency.into(),
        }
    }

    /// Business rejections are reported to the operator, not logged as faults.
    pub fn is_business_rejection(&self) -> bool {
        matches!(self, CoreError::InsufficientLiquidity { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors (the `MalformedInput` family).
///
/// Raised before pricing runs; an order failing here is never persisted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field is not a number.
    #[error("{field} is not a number: '{value}'")]
    NotANumber { field: String, value: String },

    /// Field must be a whole number.
    #[error("{field} must be a whole number: '{value}'")]
    NotAnInteger { field: String, value: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g. currency code with spaces).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_liquidity_message() {
        let err = CoreError::InsufficientLiquidity {
            side: "CZK".to_string(),
            required: dec!(1000.00),
            available: dec!(999.99),
            shortfall: dec!(0.01),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient CZK: required 1000.00, available 999.99, short 0.01"
        );
        assert!(err.is_business_rejection());
    }

    #[test]
    fn test_missing_reference_message() {
        let err = CoreError::missing("rate quote", "XYZ");
        assert_eq!(err.to_string(), "Missing reference data: rate quote for XYZ");
        assert!(!err.is_business_rejection());
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::NotANumber {
            field: "rate".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "rate is not a number: 'abc'");

        let err = ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        };
        assert_eq!(err.to_string(), "discount must be between 0 and 100");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("currency").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
