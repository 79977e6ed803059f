//! # Reconciliation Engine
//!
//! Compares a physical cash count with the recorded balance of one currency.
//!
//! ## Rounding
//! ```text
//! precision(currency)   from the smallest face value in the denomination table
//!
//! countedTotal    = round(Σ face × qty for qty > 0, precision)
//! difference      = countedTotal − round(recordedBalance, precision)
//!
//! |difference| <  10^-precision   → Match
//! difference    >  0              → Surplus
//! otherwise                       → Deficit
//! ```
//!
//! Faces must come from the currency's denomination table, so every
//! subtotal is already exact at `precision` and the breakdown lines add up to
//! the counted total without drift.

use rust_decimal::Decimal;

use crate::denominations::denominations;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{BreakdownLine, Classification, DenominationCount, ReconciliationResult};

/// Reconciles counted notes and coins against a recorded balance.
///
/// Entries with a quantity of zero or less are ignored; they neither add to
/// the total nor appear in the breakdown. The order of `counted` does not
/// change the total or the classification.
///
/// ## Errors
/// - `MissingReferenceData` when the currency has no denomination table
/// - `UnknownDenomination` when a face value is not in that table
pub fn reconcile(
    currency: &str,
    recorded_balance: Decimal,
    counted: &[DenominationCount],
) -> CoreResult<ReconciliationResult> {
    let table = denominations(currency)?;
    let precision = table.precision();

    let mut breakdown = Vec::new();
    let mut sum = Decimal::ZERO;

    for entry in counted {
        if !table.contains(entry.face_value) {
            return Err(CoreError::UnknownDenomination {
                currency: currency.to_string(),
                face: entry.face_value,
            });
        }

        if entry.quantity <= 0 {
            continue;
        }

        let subtotal = entry
            .face_value
            .checked_mul(Decimal::from(entry.quantity))
            .map(|v| precision.round(v))
            .ok_or_else(|| too_many(entry))?;

        sum = sum.checked_add(subtotal).ok_or_else(|| too_many(entry))?;

        breakdown.push(BreakdownLine {
            face_value: entry.face_value,
            quantity: entry.quantity,
            subtotal,
        });
    }

    let counted_total = precision.round(sum);
    let recorded = precision.round(recorded_balance);
    let difference = counted_total.checked_sub(recorded).ok_or_else(|| {
        CoreError::from(ValidationError::OutOfRange {
            field: "recorded balance".to_string(),
            min: 0,
            max: i64::MAX,
        })
    })?;

    let classification = if difference.abs() < precision.tolerance() {
        Classification::Match
    } else if difference > Decimal::ZERO {
        Classification::Surplus
    } else {
        Classification::Deficit
    };

    Ok(ReconciliationResult {
        currency: currency.to_string(),
        counted_total,
        recorded_balance: recorded,
        difference,
        precision,
        classification,
        breakdown,
    })
}

fn too_many(entry: &DenominationCount) -> CoreError {
    ValidationError::OutOfRange {
        field: format!("quantity of {}", entry.face_value.normalize()),
        min: 0,
        max: i64::MAX,
    }
    .into()
}

/// Blank count sheet: one zero-quantity row per face, notes first.
pub fn count_sheet(currency: &str) -> CoreResult<Vec<DenominationCount>> {
    Ok(denominations(currency)?
        .faces()
        .into_iter()
        .map(|face| DenominationCount::new(face, 0))
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================
