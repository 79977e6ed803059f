//! # Validation Module
//!
//! Turns the raw order form into a typed [`OrderRequest`].
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Host UI form                                                  │
//! │  └── Pre-filled rate, free-text fields                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (MalformedInput)                                 │
//! │  ├── Numbers parse ("25,40" and "25.40" both accepted)                 │
//! │  ├── amount is a positive whole number                                 │
//! │  ├── rate > 0, discount in [0, 100]                                    │
//! │  └── currency is a code other than the base currency                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Pricing (reference data + liquidity)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasa_core::validation::{parse_amount, parse_discount};
//!
//! assert_eq!(parse_amount("1 000").unwrap(), 1000);
//! assert!(parse_amount("12.5").is_err());
//! assert!(parse_discount("101").is_err());
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::{Direction, OrderRequest};
use crate::{MAX_DISCOUNT_PCT, MAX_NOTE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Parsers
// =============================================================================

/// Parses a number the way spreadsheet exports write it.
///
/// Spaces (including non-breaking ones) are thousands separators and a
/// single comma is accepted as the decimal point.
pub fn parse_decimal(field: &str, raw: &str) -> ValidationResult<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return Err(ValidationError::required(field));
    }

    Decimal::from_str(&cleaned).map_err(|_| ValidationError::NotANumber {
        field: field.to_string(),
        value: raw.trim().to_string(),
    })
}

/// Validates the order amount: whole units of the foreign currency, > 0.
pub fn parse_amount(raw: &str) -> ValidationResult<i64> {
    let value = parse_decimal("amount", raw)?;

    if !value.fract().is_zero() {
        return Err(ValidationError::NotAnInteger {
            field: "amount".to_string(),
            value: raw.trim().to_string(),
        });
    }

    if value <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    value.to_i64().ok_or_else(|| ValidationError::OutOfRange {
        field: "amount".to_string(),
        min: 1,
        max: i64::MAX,
    })
}

/// Validates a rate. Zero is rejected: it would create an unpriced order.
pub fn parse_rate(raw: &str) -> ValidationResult<Decimal> {
    let rate = parse_decimal("rate", raw)?;

    if rate <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "rate".to_string(),
        });
    }

    Ok(rate)
}

/// Validates a discount percentage. Blank means no discount.
pub fn parse_discount(raw: &str) -> ValidationResult<Decimal> {
    if raw.trim().is_empty() {
        return Ok(Decimal::ZERO);
    }

    let pct = parse_decimal("discount", raw)?;

    if pct < Decimal::ZERO || pct > Decimal::from(MAX_DISCOUNT_PCT) {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: MAX_DISCOUNT_PCT,
        });
    }

    Ok(pct)
}

// =============================================================================
// String Validators
// =============================================================================

/// Normalises a currency code to upper case.
///
/// ## Rules
/// - Must not be empty
/// - Exactly three ASCII letters
pub fn validate_currency_code(raw: &str) -> ValidationResult<String> {
    let code = raw.trim();

    if code.is_empty() {
        return Err(ValidationError::required("currency"));
    }

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be a three-letter code".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

pub fn parse_direction(raw: &str) -> ValidationResult<Direction> {
    match raw.trim().to_lowercase().as_str() {
        "buy" => Ok(Direction::Buy),
        "sell" => Ok(Direction::Sell),
        "" => Err(ValidationError::required("direction")),
        _ => Err(ValidationError::InvalidFormat {
            field: "direction".to_string(),
            reason: "must be 'buy' or 'sell'".to_string(),
        }),
    }
}

/// Operator name recorded as `submittedBy`.
pub fn validate_operator(raw: &str) -> ValidationResult<String> {
    let name = raw.trim();

    if name.is_empty() {
        return Err(ValidationError::required("submittedBy"));
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "submittedBy".to_string(),
            max: 100,
        });
    }

    Ok(name.to_string())
}

pub fn validate_note(raw: &str) -> ValidationResult<String> {
    let note = raw.trim();

    if note.chars().count() > MAX_NOTE_LEN {
        return Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: MAX_NOTE_LEN,
        });
    }

    Ok(note.to_string())
}

// =============================================================================
// Order Form
// =============================================================================

/// The order form exactly as the host UI submits it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderForm {
    pub direction: String,
    pub currency: String,
    /// Blank or missing: use the rate table.
    pub rate: Option<String>,
    pub amount: String,
    pub discount: String,
    pub vip: bool,
    pub note: String,
    pub submitted_by: String,
}

impl OrderForm {
    /// Validates every field; the first failure wins.
    ///
    /// ## Example
    /// ```rust
    /// use kasa_core::validation::OrderForm;
    /// use kasa_core::Direction;
    ///
    /// let form = OrderForm {
    ///     direction: "sell".into(),
    ///     currency: "eur".into(),
    ///     amount: "200".into(),
    ///     submitted_by: "jana".into(),
    ///     ..Default::default()
    /// };
    /// let request = form.parse("CZK").unwrap();
    /// assert_eq!(request.direction, Direction::Sell);
    /// assert_eq!(request.currency, "EUR");
    /// assert!(request.rate.is_none());
    /// ```
    pub fn parse(&self, base_currency: &str) -> ValidationResult<OrderRequest> {
        let direction = parse_direction(&self.direction)?;
        let currency = validate_currency_code(&self.currency)?;

        if currency.eq_ignore_ascii_case(base_currency) {
            return Err(ValidationError::InvalidFormat {
                field: "currency".to_string(),
                reason: format!("{} is the base currency", base_currency),
            });
        }

        let rate = match self.rate.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Some(parse_rate(raw)?),
            _ => None,
        };

        Ok(OrderRequest {
            direction,
            currency,
            rate,
            amount: parse_amount(&self.amount)?,
            discount_pct: parse_discount(&self.discount)?,
            vip: self.vip,
            note: validate_note(&self.note)?,
            submitted_by: validate_operator(&self.submitted_by)?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn form() -> OrderForm {
        OrderForm {
            direction: "buy".to_string(),
            currency: "USD".to_string(),
            rate: Some("22,85".to_string()),
            amount: "300".to_string(),
            discount: "1.5".to_string(),
            vip: false,
            note: String::new(),
            submitted_by: "petr".to_string(),
        }
    }

    #[test]
    fn test_parse_decimal_formats() {
        assert_eq!(parse_decimal("x", "25.40").unwrap(), dec!(25.40));
        assert_eq!(parse_decimal("x", "25,40").unwrap(), dec!(25.40));
        assert_eq!(parse_decimal("x", " 1 234,5 ").unwrap(), dec!(1234.5));
        assert_eq!(parse_decimal("x", "1\u{a0}000").unwrap(), dec!(1000));
        assert!(matches!(
            parse_decimal("x", "abc"),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(matches!(
            parse_decimal("x", "  "),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1").unwrap(), 1);
        assert_eq!(parse_amount("500.00").unwrap(), 500);
        assert!(matches!(
            parse_amount("12.5"),
            Err(ValidationError::NotAnInteger { .. })
        ));
        assert!(matches!(
            parse_amount("0"),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(parse_amount("-3").is_err());
        assert!(parse_amount("ten").is_err());
    }

    #[test]
    fn test_parse_rate_rejects_zero() {
        assert_eq!(parse_rate("24.2").unwrap(), dec!(24.2));
        assert!(matches!(
            parse_rate("0"),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(parse_rate("n/a").is_err());
    }

    #[test]
    fn test_parse_discount_bounds() {
        assert_eq!(parse_discount("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_discount("0").unwrap(), Decimal::ZERO);
        assert_eq!(parse_discount("100").unwrap(), dec!(100));
        assert!(parse_discount("100.01").is_err());
        assert!(parse_discount("-1").is_err());
    }

    #[test]
    fn test_validate_currency_code() {
        assert_eq!(validate_currency_code(" eur ").unwrap(), "EUR");
        assert!(validate_currency_code("").is_err());
        assert!(validate_currency_code("EURO").is_err());
        assert!(validate_currency_code("E1R").is_err());
    }

    #[test]
    fn test_form_parse() {
        let request = form().parse("CZK").unwrap();
        assert_eq!(request.direction, Direction::Buy);
        assert_eq!(request.rate, Some(dec!(22.85)));
        assert_eq!(request.amount, 300);
        assert_eq!(request.discount_pct, dec!(1.5));
        assert_eq!(request.submitted_by, "petr");
    }

    #[test]
    fn test_form_rejects_base_currency() {
        let mut f = form();
        f.currency = "czk".to_string();
        assert!(matches!(
            f.parse("CZK"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_form_blank_rate_uses_table() {
        let mut f = form();
        f.rate = Some("  ".to_string());
        assert_eq!(f.parse("CZK").unwrap().rate, None);
    }

    #[test]
    fn test_form_requires_operator_and_direction() {
        let mut f = form();
        f.submitted_by = " ".to_string();
        assert!(f.parse("CZK").is_err());

        let mut f = form();
        f.direction = "swap".to_string();
        assert!(f.parse("CZK").is_err());
    }

    #[test]
    fn test_note_length() {
        assert!(validate_note(&"x".repeat(MAX_NOTE_LEN)).is_ok());
        assert!(validate_note(&"x".repeat(MAX_NOTE_LEN + 1)).is_err());
    }
}
