//! # Denomination Tables
//!
//! Fixed note and coin face values per currency. These are reference data,
//! not operator settings: the count form offers exactly these rows.
//!
//! The mapping is total: a currency missing here is rejected with
//! `MissingReferenceData` instead of falling back to a default precision.

use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult};
use crate::money::Precision;

/// Notes and coins of one currency, each list in descending face value.
///
/// Face values are stored as `(mantissa, scale)` so the table stays `const`.
#[derive(Debug, Clone, Copy)]
pub struct DenominationSet {
    pub code: &'static str,
    notes: &'static [(i64, u32)],
    coins: &'static [(i64, u32)],
}

impl DenominationSet {
    pub fn notes(&self) -> Vec<Decimal> {
        self.notes.iter().map(|&(m, s)| Decimal::new(m, s)).collect()
    }

    pub fn coins(&self) -> Vec<Decimal> {
        self.coins.iter().map(|&(m, s)| Decimal::new(m, s)).collect()
    }

    /// Notes followed by coins, descending.
    pub fn faces(&self) -> Vec<Decimal> {
        let mut faces = self.notes();
        faces.extend(self.coins());
        faces
    }

    /// Smallest coin (or note, for note-only sets).
    pub fn smallest_face(&self) -> Decimal {
        self.faces().into_iter().min().unwrap_or(Decimal::ONE)
    }

    pub fn precision(&self) -> Precision {
        Precision::from_smallest_face(self.smallest_face())
    }

    pub fn contains(&self, face: Decimal) -> bool {
        self.faces().contains(&face)
    }
}

const fn whole(v: i64) -> (i64, u32) {
    (v, 0)
}

const fn cents(v: i64) -> (i64, u32) {
    (v, 2)
}

static TABLE: &[DenominationSet] = &[
    DenominationSet {
        code: "CZK",
        notes: &[whole(5000), whole(2000), whole(1000), whole(500), whole(200), whole(100)],
        coins: &[whole(50), whole(20), whole(10), whole(5), whole(2), whole(1)],
    },
    DenominationSet {
        code: "EUR",
        notes: &[whole(500), whole(200), whole(100), whole(50), whole(20), whole(10), whole(5)],
        coins: &[
            whole(2),
            whole(1),
            cents(50),
            cents(20),
            cents(10),
            cents(5),
            cents(2),
            cents(1),
        ],
    },
    DenominationSet {
        code: "USD",
        notes: &[whole(100), whole(50), whole(20), whole(10), whole(5), whole(2), whole(1)],
        coins: &[cents(50), cents(25), cents(10), cents(5), cents(1)],
    },
    DenominationSet {
        code: "GBP",
        notes: &[whole(50), whole(20), whole(10), whole(5)],
        coins: &[
            whole(2),
            whole(1),
            cents(50),
            cents(20),
            cents(10),
            cents(5),
            cents(2),
            cents(1),
        ],
    },
    DenominationSet {
        code: "CHF",
        notes: &[whole(1000), whole(200), whole(100), whole(50), whole(20), whole(10)],
        coins: &[whole(5), whole(2), whole(1), cents(50), cents(20), cents(10), cents(5)],
    },
    DenominationSet {
        code: "PLN",
        notes: &[whole(500), whole(200), whole(100), whole(50), whole(20), whole(10)],
        coins: &[
            whole(5),
            whole(2),
            whole(1),
            cents(50),
            cents(20),
            cents(10),
            cents(5),
            cents(2),
            cents(1),
        ],
    },
    DenominationSet {
        code: "HUF",
        notes: &[
            whole(20000),
            whole(10000),
            whole(5000),
            whole(2000),
            whole(1000),
            whole(500),
        ],
        coins: &[whole(200), whole(100), whole(50), whole(20), whole(10), whole(5)],
    },
    DenominationSet {
        code: "DKK",
        notes: &[whole(1000), whole(500), whole(200), whole(100), whole(50)],
        coins: &[whole(20), whole(10), whole(5), whole(2), whole(1), cents(50)],
    },
    DenominationSet {
        code: "SEK",
        notes: &[whole(1000), whole(500), whole(200), whole(100), whole(50), whole(20)],
        coins: &[whole(10), whole(5), whole(2), whole(1)],
    },
    DenominationSet {
        code: "NOK",
        notes: &[whole(1000), whole(500), whole(200), whole(100)],
        coins: &[whole(20), whole(10), whole(5), whole(1)],
    },
    DenominationSet {
        code: "JPY",
        notes: &[whole(10000), whole(5000), whole(2000), whole(1000)],
        coins: &[whole(500), whole(100), whole(50), whole(10), whole(5), whole(1)],
    },
];

/// Looks up the denomination set of a currency.
pub fn denominations(code: &str) -> CoreResult<&'static DenominationSet> {
    TABLE
        .iter()
        .find(|set| set.code == code)
        .ok_or_else(|| CoreError::missing("denomination table", code))
}

/// Canonical precision of a currency.
///
/// ## Example
/// ```rust
/// use kasa_core::denominations::precision;
///
/// assert_eq!(precision("CZK").unwrap().places(), 0);
/// assert_eq!(precision("DKK").unwrap().places(), 1);
/// assert_eq!(precision("EUR").unwrap().places(), 2);
/// assert!(precision("XXX").is_err());
/// ```
pub fn precision(code: &str) -> CoreResult<Precision> {
    Ok(denominations(code)?.precision())
}

/// Whether `face` is a note or coin of `code`. Unknown currencies are never
/// a match.
pub fn is_known_face(code: &str, face: Decimal) -> bool {
    denominations(code).map(|set| set.contains(face)).unwrap_or(false)
}

/// Codes with a denomination table, in table order.
pub fn supported_currencies() -> Vec<&'static str> {
    TABLE.iter().map(|set| set.code).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_precision_per_currency() {
        for code in ["CZK", "HUF", "SEK", "NOK", "JPY"] {
            assert_eq!(precision(code).unwrap().places(), 0, "{code}");
        }
        assert_eq!(precision("DKK").unwrap().places(), 1);
        for code in ["EUR", "USD", "GBP", "CHF", "PLN"] {
            assert_eq!(precision(code).unwrap().places(), 2, "{code}");
        }
    }

    #[test]
    fn test_unknown_currency_is_rejected() {
        let err = precision("XAU").unwrap_err();
        assert!(matches!(err, CoreError::MissingReferenceData { .. }));
    }

    #[test]
    fn test_faces_are_descending() {
        for code in supported_currencies() {
            let faces = denominations(code).unwrap().faces();
            assert!(
                faces.windows(2).all(|w| w[0] > w[1]),
                "{code} faces not strictly descending"
            );
        }
    }

    #[test]
    fn test_contains_matches_numerically() {
        let eur = denominations("EUR").unwrap();
        assert!(eur.contains(dec!(0.5)));
        assert!(eur.contains(dec!(0.50)));
        assert!(eur.contains(dec!(100)));
        assert!(!eur.contains(dec!(0.03)));
        assert_eq!(eur.smallest_face(), dec!(0.01));
        assert!(is_known_face("CZK", dec!(2000)));
        assert!(!is_known_face("CZK", dec!(0.5)));
        assert!(!is_known_face("XAU", dec!(1)));
    }
}
