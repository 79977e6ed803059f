//! # Domain Types
//!
//! Core domain types of the exchange counter.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CurrencyQuote   │   │  OrderRequest   │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  code           │──►│  direction      │──►│  order_number   │       │
//! │  │  buy/sell rates │   │  amount         │   │  total_paid     │       │
//! │  │  rate_amount    │   │  discount_pct   │   │  created_at     │       │
//! │  └─────────────────┘   └────────┬────────┘   └────────┬────────┘       │
//! │                                 ▼                     ▼                 │
//! │                        ┌─────────────────┐   ┌─────────────────┐       │
//! │                        │   Settlement    │   │   LedgerRow     │       │
//! │                        │ accepted/short  │   │  12 columns     │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  DenominationCount ──► ReconciliationResult { classification, lines }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decimal fields are serialized as strings so no precision is lost on the
//! way to the host UI.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::{Money, Precision};

// =============================================================================
// Direction
// =============================================================================

/// Which way the foreign currency moves, named from the rate table's side.
///
/// - `Buy`: the customer buys foreign currency; the counter releases foreign
///   notes and receives base currency. Priced at the buy rate.
/// - `Sell`: the customer sells foreign currency; the counter receives foreign
///   notes and pays base currency out. Priced at the sell rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Currency Quote
// =============================================================================

/// One row of the rate table, validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyQuote {
    /// Currency code, never the base currency.
    pub code: String,

    /// Display flag from the rate sheet (usually an emoji).
    pub flag: Option<String>,

    /// Units of `code` the rates apply to (1, 100, ...). Always > 0.
    #[ts(as = "String")]
    pub rate_amount: Decimal,

    #[ts(as = "String")]
    pub buy_rate: Decimal,

    #[ts(as = "String")]
    pub sell_rate: Decimal,

    #[ts(as = "String")]
    pub buy_rate_vip: Decimal,

    #[ts(as = "String")]
    pub sell_rate_vip: Decimal,

    /// Most foreign cash the counter wants to hold in this currency.
    #[ts(as = "String")]
    pub cash_limit: Decimal,
}

impl CurrencyQuote {
    /// Picks the rate tier for an order.
    ///
    /// ## Example
    /// ```rust
    /// use kasa_core::{CurrencyQuote, Direction};
    /// use rust_decimal::Decimal;
    ///
    /// let quote = CurrencyQuote {
    ///     code: "EUR".into(),
    ///     flag: None,
    ///     rate_amount: Decimal::ONE,
    ///     buy_rate: Decimal::new(2550, 2),
    ///     sell_rate: Decimal::new(2420, 2),
    ///     buy_rate_vip: Decimal::new(2520, 2),
    ///     sell_rate_vip: Decimal::new(2450, 2),
    ///     cash_limit: Decimal::from(50_000),
    /// };
    /// assert_eq!(quote.rate_for(Direction::Sell, true), Decimal::new(2450, 2));
    /// ```
    pub fn rate_for(&self, direction: Direction, vip: bool) -> Decimal {
        match (direction, vip) {
            (Direction::Buy, false) => self.buy_rate,
            (Direction::Buy, true) => self.buy_rate_vip,
            (Direction::Sell, false) => self.sell_rate,
            (Direction::Sell, true) => self.sell_rate_vip,
        }
    }
}

// =============================================================================
// Order Request
// =============================================================================

/// A parsed order form, before pricing and before it has an order number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub direction: Direction,
    pub currency: String,

    /// Rate typed by the operator. `None` means "use the rate table".
    #[ts(as = "Option<String>")]
    pub rate: Option<Decimal>,

    /// Whole units of `currency`, always > 0.
    pub amount: i64,

    /// Percent in [0, 100].
    #[ts(as = "String")]
    pub discount_pct: Decimal,

    pub vip: bool,
    pub note: String,
    pub submitted_by: String,
}

// =============================================================================
// Settlement
// =============================================================================

/// The side and size of a liquidity gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Shortfall {
    /// Currency code of the side that could not be covered.
    pub side: String,
    #[ts(as = "String")]
    pub required: Decimal,
    #[ts(as = "String")]
    pub available: Decimal,
    /// `required - available`, always > 0.
    #[ts(as = "String")]
    pub missing: Decimal,
}

/// Result of pricing one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub direction: Direction,
    pub currency: String,
    pub amount: i64,

    /// Rate the order was priced at.
    #[ts(as = "String")]
    pub rate: Decimal,

    /// Base-currency cost or proceeds, rounded to 2 places.
    pub total_paid: Money,

    pub accepted: bool,
    pub shortfall: Option<Shortfall>,
}

// =============================================================================
// Order
// =============================================================================

/// A persisted order. Immutable once written to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Row identifier (UUID v4).
    pub id: String,

    /// Business identifier, unique and increasing ("000042").
    pub order_number: String,

    pub direction: Direction,
    pub currency: String,
    #[ts(as = "String")]
    pub rate: Decimal,
    pub amount: i64,
    #[ts(as = "String")]
    pub discount_pct: Decimal,
    pub vip: bool,
    pub note: String,
    pub submitted_by: String,
    pub total_paid: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Ledger Row
// =============================================================================

/// The outbound row shape the ledger collaborator receives, with named fields.
///
/// Only [`LedgerRow::to_columns`] knows the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    pub order_number: String,
    pub direction: Direction,
    pub currency: String,
    #[ts(as = "String")]
    pub rate: Decimal,
    pub amount: i64,
    #[ts(as = "String")]
    pub discount_pct: Decimal,
    pub vip: bool,
    pub submitted_by: String,
    /// `dd.mm.yyyy`
    pub date: String,
    /// `HH:MM:SS`
    pub time: String,
    pub total_paid: Money,
    pub note: String,
}

impl LedgerRow {
    pub fn from_order(order: &Order) -> Self {
        LedgerRow {
            order_number: order.order_number.clone(),
            direction: order.direction,
            currency: order.currency.clone(),
            rate: order.rate,
            amount: order.amount,
            discount_pct: order.discount_pct,
            vip: order.vip,
            submitted_by: order.submitted_by.clone(),
            date: order.created_at.format("%d.%m.%Y").to_string(),
            time: order.created_at.format("%H:%M:%S").to_string(),
            total_paid: order.total_paid,
            note: order.note.clone(),
        }
    }

    /// `[orderNumber, direction, currency, rate, amount, discountPct,
    /// vipYesNo, submittedBy, date, time, totalPaid, note]`
    pub fn to_columns(&self) -> Vec<String> {
        vec![
            self.order_number.clone(),
            self.direction.to_string(),
            self.currency.clone(),
            self.rate.normalize().to_string(),
            self.amount.to_string(),
            self.discount_pct.normalize().to_string(),
            if self.vip { "yes" } else { "no" }.to_string(),
            self.submitted_by.clone(),
            self.date.clone(),
            self.time.clone(),
            Precision::BASE.format(self.total_paid.to_decimal()),
            self.note.clone(),
        ]
    }
}

// =============================================================================
// Denomination Count
// =============================================================================

/// How many notes or coins of one face value were counted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DenominationCount {
    #[ts(as = "String")]
    pub face_value: Decimal,
    pub quantity: i64,
}

impl DenominationCount {
    pub fn new(face_value: Decimal, quantity: i64) -> Self {
        DenominationCount {
            face_value,
            quantity,
        }
    }
}

// =============================================================================
// Reconciliation Result
// =============================================================================

/// Outcome of comparing counted cash to the recorded balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Match,
    Surplus,
    Deficit,
}

/// One audit line: `faceValue × quantity = subtotal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownLine {
    #[ts(as = "String")]
    pub face_value: Decimal,
    pub quantity: i64,
    /// Rounded to the currency precision.
    #[ts(as = "String")]
    pub subtotal: Decimal,
}

impl fmt::Display for BreakdownLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} × {} = {}",
            self.face_value.normalize(),
            self.quantity,
            self.subtotal
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    pub currency: String,
    #[ts(as = "String")]
    pub counted_total: Decimal,
    /// Recorded balance rounded to `precision`.
    #[ts(as = "String")]
    pub recorded_balance: Decimal,
    /// `counted_total - recorded_balance`.
    #[ts(as = "String")]
    pub difference: Decimal,
    pub precision: Precision,
    pub classification: Classification,
    /// Counted denominations in input order, zero quantities left out.
    pub breakdown: Vec<BreakdownLine>,
}

impl ReconciliationResult {
    /// Audit text shown on the result card.
    ///
    /// ```text
    /// 100 × 5 = 500
    /// 20 × 1 = 20
    /// Counted: 532.00 EUR
    /// Recorded: 532.50 EUR
    /// Difference: -0.50 EUR (deficit)
    /// ```
    pub fn breakdown_text(&self) -> String {
        let mut lines: Vec<String> = self.breakdown.iter().map(|l| l.to_string()).collect();
        let p = self.precision;
        lines.push(format!("Counted: {} {}", p.format(self.counted_total), self.currency));
        lines.push(format!(
            "Recorded: {} {}",
            p.format(self.recorded_balance),
            self.currency
        ));
        let sign = if self.difference > Decimal::ZERO { "+" } else { "" };
        let verdict = match self.classification {
            Classification::Match => "match",
            Classification::Surplus => "surplus",
            Classification::Deficit => "deficit",
        };
        lines.push(format!(
            "Difference: {}{} {} ({})",
            sign,
            p.format(self.difference),
            self.currency,
            verdict
        ));
        lines.join("\n")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
