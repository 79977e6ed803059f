//! # Reference Data Snapshots
//!
//! The host UI hands over two raw tables: the rate table and the cash-flow
//! ledger. Both arrive as positional string rows. This module is the only
//! place that knows the column positions; everything downstream works with
//! named, validated records.
//!
//! ```text
//! rate table row   (flag, code, rateAmount, buy, sell, buyVip, sellVip[, cashLimit])
//!                        │
//!                        ▼  RateRow::from_columns
//!                  RateCatalog { CurrencyQuote, ... }
//!
//! cash-flow row    (.., .., code, .., .., balance, ..)
//!                        │
//!                        ▼  CashFlowRow::from_columns
//!                  CashPosition { code → balance }
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::CurrencyQuote;
use crate::validation::{parse_decimal, validate_currency_code, ValidationResult};

// =============================================================================
// Rate Table
// =============================================================================

/// One parsed rate table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRow {
    pub flag: Option<String>,
    pub code: String,
    pub rate_amount: Decimal,
    pub buy_rate: Decimal,
    pub sell_rate: Decimal,
    pub buy_rate_vip: Decimal,
    pub sell_rate_vip: Decimal,
    /// Optional eighth column. Zero or missing means no limit.
    pub cash_limit: Decimal,
}

impl RateRow {
    const MIN_COLUMNS: usize = 7;

    pub fn from_columns(cols: &[String]) -> ValidationResult<Self> {
        if cols.len() < Self::MIN_COLUMNS {
            return Err(ValidationError::InvalidFormat {
                field: "rate table row".to_string(),
                reason: format!("expected {} columns, got {}", Self::MIN_COLUMNS, cols.len()),
            });
        }

        let flag = cols[0].trim();
        let cash_limit = match cols.get(7) {
            Some(raw) if !raw.trim().is_empty() => parse_decimal("cashLimit", raw)?,
            _ => Decimal::ZERO,
        };

        Ok(RateRow {
            flag: (!flag.is_empty()).then(|| flag.to_string()),
            code: validate_currency_code(&cols[1])?,
            rate_amount: parse_decimal("rateAmount", &cols[2])?,
            buy_rate: parse_decimal("buyRate", &cols[3])?,
            sell_rate: parse_decimal("sellRate", &cols[4])?,
            buy_rate_vip: parse_decimal("buyRateVip", &cols[5])?,
            sell_rate_vip: parse_decimal("sellRateVip", &cols[6])?,
            cash_limit,
        })
    }

    /// Parses a whole sheet, skipping rows whose code cell is blank.
    pub fn parse_table(rows: &[Vec<String>]) -> ValidationResult<Vec<Self>> {
        rows.iter()
            .filter(|cols| cols.get(1).map_or(false, |c| !c.trim().is_empty()))
            .map(|cols| Self::from_columns(cols))
            .collect()
    }
}

/// Validated rate table, in sheet order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateCatalog {
    quotes: Vec<CurrencyQuote>,
}

impl RateCatalog {
    /// Builds the catalog, enforcing the quote invariants.
    ///
    /// ## Rules
    /// - `rateAmount > 0`
    /// - every rate and the cash limit are non-negative
    /// - the code is not the base currency and appears once
    pub fn from_rows(base_currency: &str, rows: Vec<RateRow>) -> CoreResult<Self> {
        let mut quotes: Vec<CurrencyQuote> = Vec::with_capacity(rows.len());

        for row in rows {
            if row.code.eq_ignore_ascii_case(base_currency) {
                return Err(ValidationError::InvalidFormat {
                    field: "rate table".to_string(),
                    reason: format!("{} is the base currency and cannot be quoted", row.code),
                }
                .into());
            }

            if quotes.iter().any(|q| q.code == row.code) {
                return Err(CoreError::DuplicateCurrency(row.code));
            }

            if row.rate_amount <= Decimal::ZERO {
                return Err(ValidationError::MustBePositive {
                    field: format!("{} rateAmount", row.code),
                }
                .into());
            }

            let non_negative = [
                ("buyRate", row.buy_rate),
                ("sellRate", row.sell_rate),
                ("buyRateVip", row.buy_rate_vip),
                ("sellRateVip", row.sell_rate_vip),
                ("cashLimit", row.cash_limit),
            ];
            if let Some((field, _)) = non_negative.iter().find(|(_, v)| *v < Decimal::ZERO) {
                return Err(ValidationError::InvalidFormat {
                    field: format!("{} {}", row.code, field),
                    reason: "must not be negative".to_string(),
                }
                .into());
            }

            quotes.push(CurrencyQuote {
                code: row.code,
                flag: row.flag,
                rate_amount: row.rate_amount,
                buy_rate: row.buy_rate,
                sell_rate: row.sell_rate,
                buy_rate_vip: row.buy_rate_vip,
                sell_rate_vip: row.sell_rate_vip,
                cash_limit: row.cash_limit,
            });
        }

        Ok(RateCatalog { quotes })
    }

    /// Looks up a quote. Absent currencies are never priced.
    pub fn quote(&self, code: &str) -> CoreResult<&CurrencyQuote> {
        self.quotes
            .iter()
            .find(|q| q.code == code)
            .ok_or_else(|| CoreError::missing("rate quote", code))
    }

    pub fn quotes(&self) -> &[CurrencyQuote] {
        &self.quotes
    }

    pub fn codes(&self) -> Vec<&str> {
        self.quotes.iter().map(|q| q.code.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Currencies whose recorded cash is above their configured limit.
    ///
    /// Informational only: a breach never blocks an order.
    pub fn limit_breaches(&self, position: &CashPosition) -> Vec<LimitBreach> {
        self.quotes
            .iter()
            .filter(|q| q.cash_limit > Decimal::ZERO)
            .filter_map(|q| {
                let balance = position.balance(&q.code).ok()?;
                (balance > q.cash_limit).then(|| LimitBreach {
                    currency: q.code.clone(),
                    balance,
                    limit: q.cash_limit,
                })
            })
            .collect()
    }
}

/// A currency holding more cash than its limit allows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LimitBreach {
    pub currency: String,
    #[ts(as = "String")]
    pub balance: Decimal,
    #[ts(as = "String")]
    pub limit: Decimal,
}

// =============================================================================
// Cash Flow
// =============================================================================

/// Named view of one cash-flow ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowRow {
    pub currency: String,
    pub balance: Decimal,
}

impl CashFlowRow {
    const CURRENCY_COLUMN: usize = 2;
    const BALANCE_COLUMN: usize = 5;

    pub fn from_columns(cols: &[String]) -> ValidationResult<Self> {
        if cols.len() <= Self::BALANCE_COLUMN {
            return Err(ValidationError::InvalidFormat {
                field: "cash-flow row".to_string(),
                reason: format!(
                    "expected at least {} columns, got {}",
                    Self::BALANCE_COLUMN + 1,
                    cols.len()
                ),
            });
        }

        Ok(CashFlowRow {
            currency: validate_currency_code(&cols[Self::CURRENCY_COLUMN])?,
            balance: parse_decimal("balance", &cols[Self::BALANCE_COLUMN])?,
        })
    }

    /// Parses a whole sheet, skipping rows whose currency cell is blank.
    pub fn parse_table(rows: &[Vec<String>]) -> ValidationResult<Vec<Self>> {
        rows.iter()
            .filter(|cols| {
                cols.get(Self::CURRENCY_COLUMN)
                    .map_or(false, |c| !c.trim().is_empty())
            })
            .map(|cols| Self::from_columns(cols))
            .collect()
    }
}

/// Recorded cash per currency, base currency included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashPosition {
    balances: BTreeMap<String, Decimal>,
}

impl CashPosition {
    /// Later rows win: the ledger carries a running balance.
    pub fn from_rows(rows: impl IntoIterator<Item = CashFlowRow>) -> Self {
        let balances = rows
            .into_iter()
            .map(|row| (row.currency, row.balance))
            .collect();
        CashPosition { balances }
    }

    pub fn balance(&self, code: &str) -> CoreResult<Decimal> {
        self.balances
            .get(code)
            .copied()
            .ok_or_else(|| CoreError::missing("cash-flow balance", code))
    }

    /// Base-currency cash available for buying foreign notes.
    pub fn capital(&self, base_currency: &str) -> CoreResult<Decimal> {
        self.balance(base_currency)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.balances.iter().map(|(code, bal)| (code.as_str(), *bal))
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
