//! # Pricing Engine
//!
//! Prices one order and decides whether the counter can cover it.
//!
//! ## Decision Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderRequest + CurrencyQuote                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  rate = typed rate, or rate_for(direction, vip)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  totalPaid = round2(amount / rateAmount × (rate − discount% × rate))    │
//! │       │                                                                 │
//! │       ├── Sell: foreign cash on hand ≥ amount ?                         │
//! │       │         (counted in foreign units, not in CZK)                  │
//! │       │                                                                 │
//! │       └── Buy:  base capital ≥ totalPaid ?                              │
//! │                                                                         │
//! │  accepted ──► Settlement { accepted: true }                             │
//! │  rejected ──► Settlement { shortfall: side, required, available }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here reads a store or a clock: same input, same settlement.

use rust_decimal::Decimal;

use crate::catalog::{CashPosition, RateCatalog};
use crate::denominations;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CurrencyQuote, Direction, OrderRequest, Settlement, Shortfall};
use crate::{BASE_CURRENCY, MAX_DISCOUNT_PCT};

fn overflow(field: &str) -> CoreError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
    .into()
}

/// Base-currency total for `amount` units at `rate` with a percent discount.
///
/// ## Example
/// ```rust
/// use kasa_core::pricing::total_paid;
/// use kasa_core::CurrencyQuote;
/// use rust_decimal::Decimal;
///
/// let huf = CurrencyQuote {
///     code: "HUF".into(),
///     flag: None,
///     rate_amount: Decimal::from(100),
///     buy_rate: Decimal::new(690, 2),
///     sell_rate: Decimal::new(610, 2),
///     buy_rate_vip: Decimal::new(680, 2),
///     sell_rate_vip: Decimal::new(620, 2),
///     cash_limit: Decimal::ZERO,
/// };
/// // 12 345 HUF at 6.90 per 100 = 851.805 → 851.81
/// let total = total_paid(12_345, &huf, Decimal::new(690, 2), Decimal::ZERO).unwrap();
/// assert_eq!(total.hellers(), 85_181);
/// ```
pub fn total_paid(
    amount: i64,
    quote: &CurrencyQuote,
    rate: Decimal,
    discount_pct: Decimal,
) -> CoreResult<Money> {
    let discount = discount_pct
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|pct| pct.checked_mul(rate))
        .ok_or_else(|| overflow("discount"))?;
    let effective_rate = rate - discount;

    let raw = Decimal::from(amount)
        .checked_mul(effective_rate)
        .and_then(|v| v.checked_div(quote.rate_amount))
        .ok_or_else(|| overflow("totalPaid"))?;

    Money::from_decimal(raw).ok_or_else(|| overflow("totalPaid"))
}

/// Prices an order against one quote and the liquidity it needs.
///
/// ## Arguments
/// * `cash_available` - recorded cash in the order's foreign currency
/// * `capital_available` - recorded cash in the base currency
///
/// ## Rules
/// - Sell: accepted when `cash_available ≥ amount`, with `cash_available`
///   rounded to the currency's precision first. The check is on foreign
///   units; `totalPaid` plays no part in it.
/// - Buy: accepted when `capital_available ≥ totalPaid`, both at 2 places.
///
/// A rejection is not an error: the settlement comes back with
/// `accepted == false` and a [`Shortfall`]. Use [`Settlement::into_result`]
/// to turn it into `CoreError::InsufficientLiquidity`.
pub fn compute_settlement(
    request: &OrderRequest,
    quote: &CurrencyQuote,
    cash_available: Decimal,
    capital_available: Decimal,
) -> CoreResult<Settlement> {
    if quote.code != request.currency {
        return Err(CoreError::missing("rate quote", &request.currency));
    }

    if request.amount <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        }
        .into());
    }

    if request.discount_pct < Decimal::ZERO || request.discount_pct > Decimal::from(MAX_DISCOUNT_PCT) {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: MAX_DISCOUNT_PCT,
        }
        .into());
    }

    let rate = request
        .rate
        .unwrap_or_else(|| quote.rate_for(request.direction, request.vip));

    if rate <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "rate".to_string(),
        }
        .into());
    }

    let total = total_paid(request.amount, quote, rate, request.discount_pct)?;

    let (side, required, available) = match request.direction {
        Direction::Sell => {
            let precision = denominations::precision(&request.currency)?;
            (
                request.currency.clone(),
                Decimal::from(request.amount),
                precision.round(cash_available),
            )
        }
        Direction::Buy => {
            let capital = Money::from_decimal(capital_available).ok_or_else(|| overflow("capital"))?;
            (
                BASE_CURRENCY.to_string(),
                total.to_decimal(),
                capital.to_decimal(),
            )
        }
    };

    let accepted = available >= required;
    let shortfall = if accepted {
        None
    } else {
        let missing = required
            .checked_sub(available)
            .ok_or_else(|| overflow("shortfall"))?;
        Some(Shortfall {
            side,
            required,
            available,
            missing,
        })
    };

    Ok(Settlement {
        direction: request.direction,
        currency: request.currency.clone(),
        amount: request.amount,
        rate,
        total_paid: total,
        accepted,
        shortfall,
    })
}

/// Resolves quote and liquidity from the snapshots, then prices.
///
/// Missing rate quote, missing foreign balance or missing base balance are
/// all `MissingReferenceData`: the order is not priced on guesses.
pub fn quote_order(
    catalog: &RateCatalog,
    position: &CashPosition,
    request: &OrderRequest,
) -> CoreResult<Settlement> {
    let quote = catalog.quote(&request.currency)?;
    let cash = position.balance(&request.currency)?;
    let capital = position.capital(BASE_CURRENCY)?;

    compute_settlement(request, quote, cash, capital)
}

impl Settlement {
    /// Accepted settlements pass through; rejections become an error that
    /// carries side, required, available and shortfall.
    pub fn into_result(self) -> CoreResult<Settlement> {
        match self.shortfall {
            Some(gap) if !self.accepted => Err(CoreError::InsufficientLiquidity {
                side: gap.side,
                required: gap.required,
                available: gap.available,
                shortfall: gap.missing,
            }),
            _ => Ok(self),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CashFlowRow, RateRow};
    use rust_decimal_macros::dec;

    fn eur() -> CurrencyQuote {
        CurrencyQuote {
            code: "EUR".to_string(),
            flag: None,
            rate_amount: dec!(1),
            buy_rate: dec!(25.50),
            sell_rate: dec!(24.20),
            buy_rate_vip: dec!(25.20),
            sell_rate_vip: dec!(24.50),
            cash_limit: dec!(0),
        }
    }

    fn request(direction: Direction, amount: i64) -> OrderRequest {
        OrderRequest {
            direction,
            currency: "EUR".to_string(),
            rate: None,
            amount,
            discount_pct: Decimal::ZERO,
            vip: false,
            note: String::new(),
            submitted_by: "jana".to_string(),
        }
    }

    #[test]
    fn test_total_without_discount() {
        let total = total_paid(200, &eur(), dec!(24.20), Decimal::ZERO).unwrap();
        assert_eq!(total.to_decimal(), dec!(4840.00));
    }

    #[test]
    fn test_total_with_discount_rounds_to_hellers() {
        // 37 × (25.50 − 2.5% × 25.50) = 37 × 24.8625 = 919.9125
        let total = total_paid(37, &eur(), dec!(25.50), dec!(2.5)).unwrap();
        assert_eq!(total.hellers(), 91_991);
    }

    #[test]
    fn test_total_uses_rate_amount() {
        let mut jpy = eur();
        jpy.code = "JPY".to_string();
        jpy.rate_amount = dec!(100);
        let total = total_paid(5_000, &jpy, dec!(15.37), Decimal::ZERO).unwrap();
        assert_eq!(total.to_decimal(), dec!(768.50));
    }

    #[test]
    fn test_full_discount_is_free() {
        let total = total_paid(10, &eur(), dec!(25.50), dec!(100)).unwrap();
        assert!(total.is_zero());
    }

    #[test]
    fn test_rate_comes_from_table_by_tier() {
        let mut req = request(Direction::Sell, 10);
        req.vip = true;
        let s = compute_settlement(&req, &eur(), dec!(100), dec!(0)).unwrap();
        assert_eq!(s.rate, dec!(24.50));

        req.rate = Some(dec!(24.00));
        let s = compute_settlement(&req, &eur(), dec!(100), dec!(0)).unwrap();
        assert_eq!(s.rate, dec!(24.00));
        assert_eq!(s.total_paid.to_decimal(), dec!(240.00));
    }

    #[test]
    fn test_sell_accepted_when_cash_equals_amount() {
        let s = compute_settlement(&request(Direction::Sell, 200), &eur(), dec!(200), dec!(0)).unwrap();
        assert!(s.accepted);
        assert!(s.shortfall.is_none());
    }

    #[test]
    fn test_sell_rejected_when_amount_exceeds_cash() {
        let s = compute_settlement(&request(Direction::Sell, 201), &eur(), dec!(200), dec!(1_000_000))
            .unwrap();
        assert!(!s.accepted);
        let gap = s.shortfall.unwrap();
        assert_eq!(gap.side, "EUR");
        assert_eq!(gap.required, dec!(201));
        assert_eq!(gap.available, dec!(200));
        assert_eq!(gap.missing, dec!(1));
    }

    #[test]
    fn test_buy_capital_boundary() {
        let mut req = request(Direction::Buy, 40);
        req.rate = Some(dec!(25)); // totalPaid = 1000.00

        let s = compute_settlement(&req, &eur(), dec!(0), dec!(1000)).unwrap();
        assert!(s.accepted);
        assert_eq!(s.total_paid.to_decimal(), dec!(1000.00));

        let s = compute_settlement(&req, &eur(), dec!(0), dec!(999.99)).unwrap();
        assert!(!s.accepted);
        let gap = s.shortfall.clone().unwrap();
        assert_eq!(gap.side, "CZK");
        assert_eq!(gap.missing, dec!(0.01));

        let err = s.into_result().unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientLiquidity { ref side, shortfall, .. }
                if side == "CZK" && shortfall == dec!(0.01)
        ));
    }

    #[test]
    fn test_buy_ignores_foreign_cash() {
        let s = compute_settlement(&request(Direction::Buy, 10), &eur(), dec!(0), dec!(10_000)).unwrap();
        assert!(s.accepted);
    }

    #[test]
    fn test_rejects_malformed_numbers() {
        let mut req = request(Direction::Sell, 0);
        assert!(compute_settlement(&req, &eur(), dec!(10), dec!(10)).is_err());

        req.amount = 5;
        req.rate = Some(Decimal::ZERO);
        assert!(compute_settlement(&req, &eur(), dec!(10), dec!(10)).is_err());

        req.rate = None;
        req.discount_pct = dec!(150);
        assert!(compute_settlement(&req, &eur(), dec!(10), dec!(10)).is_err());
    }

    #[test]
    fn test_sell_rounds_cash_to_currency_precision() {
        let s = compute_settlement(&request(Direction::Sell, 100), &eur(), dec!(99.996), dec!(0)).unwrap();
        assert!(s.accepted);

        let s = compute_settlement(&request(Direction::Sell, 100), &eur(), dec!(99.994), dec!(0)).unwrap();
        assert!(!s.accepted);
        let gap = s.shortfall.unwrap();
        assert_eq!(gap.available, dec!(99.99));
        assert_eq!(gap.missing, dec!(0.01));
    }

    #[test]
    fn test_sell_needs_denomination_table() {
        let mut quote = eur();
        quote.code = "XAU".to_string();
        let mut req = request(Direction::Sell, 1);
        req.currency = "XAU".to_string();

        let err = compute_settlement(&req, &quote, dec!(10), dec!(10)).unwrap_err();
        assert!(matches!(err, CoreError::MissingReferenceData { ref currency, .. } if currency == "XAU"));
    }

    #[test]
    fn test_total_out_of_range_is_an_error() {
        let mut req = request(Direction::Sell, 9_000_000_000_000_000_000);
        req.rate = Some(dec!(1_000_000_000));

        let err = compute_settlement(&req, &eur(), dec!(0), dec!(0)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "totalPaid"
        ));

        let mut buy = request(Direction::Buy, 1);
        buy.rate = Some(dec!(1));
        let err = compute_settlement(&buy, &eur(), dec!(0), Decimal::MAX).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "capital"
        ));
    }

    #[test]
    fn test_shortfall_overflow_is_an_error() {
        let err = compute_settlement(&request(Direction::Sell, 1), &eur(), Decimal::MIN, dec!(0)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "shortfall"
        ));
    }

    #[test]
    fn test_zero_table_rate_is_rejected() {
        let mut quote = eur();
        quote.sell_rate = Decimal::ZERO;
        let err = compute_settlement(&request(Direction::Sell, 1), &quote, dec!(10), dec!(10))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_quote_order_requires_reference_data() {
        let row = RateRow::from_columns(
            &["", "EUR", "1", "25.5", "24.2", "25.2", "24.5"]
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>(),
        )
        .unwrap();
        let catalog = RateCatalog::from_rows("CZK", vec![row]).unwrap();

        let only_eur = CashPosition::from_rows(vec![CashFlowRow {
            currency: "EUR".into(),
            balance: dec!(500),
        }]);
        let err = quote_order(&catalog, &only_eur, &request(Direction::Sell, 10)).unwrap_err();
        assert!(matches!(err, CoreError::MissingReferenceData { ref currency, .. } if currency == "CZK"));

        let full = CashPosition::from_rows(vec![
            CashFlowRow { currency: "EUR".into(), balance: dec!(500) },
            CashFlowRow { currency: "CZK".into(), balance: dec!(80_000) },
        ]);
        let s = quote_order(&catalog, &full, &request(Direction::Sell, 10)).unwrap();
        assert!(s.accepted);
        assert_eq!(s.total_paid.to_decimal(), dec!(242.00));

        let mut usd = request(Direction::Buy, 10);
        usd.currency = "USD".to_string();
        assert!(quote_order(&catalog, &full, &usd).is_err());
    }
}
