//! # Promo Module
//!
//! Promotional codes and the discounts they grant.
//!
//! ## Lookup Rules
//! ```text
//! apply(₹1000, "SUMMER25")
//!      │
//!      ▼
//! exact, case-sensitive lookup ──► not found ──► { valid: false, discount: ₹0,
//!      │                                          discounted_amount: ₹1000 }
//!      ▼
//! discount = amount × 25 / 100 (rounded half up to the paisa)
//!      │
//!      ▼
//! { valid: true, discount: ₹250, discounted_amount: ₹750 }
//! ```
//!
//! An unknown code is a value, not an error. The table is loaded once at
//! start-up and never mutated, so the same call always yields the same
//! outcome and codes never stack.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Promo Outcome
// =============================================================================

/// Result of applying a promo code to an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PromoOutcome {
    /// Amount after the discount (unchanged when the code is invalid).
    pub discounted_amount: Money,

    /// Amount taken off (zero when the code is invalid).
    pub discount: Money,

    /// Whether the code exists in the table.
    pub valid: bool,
}

impl PromoOutcome {
    fn rejected(amount: Money) -> Self {
        PromoOutcome {
            discounted_amount: amount,
            discount: Money::zero(),
            valid: false,
        }
    }
}

// =============================================================================
// Promo Table
// =============================================================================

/// Immutable mapping of promo code to whole-number percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromoTable {
    codes: BTreeMap<String, u32>,
}

impl PromoTable {
    /// Codes the resort advertises by default.
    pub const DEFAULT_CODES: [(&'static str, u32); 4] = [
        ("SUMMER25", 25),
        ("WELCOME15", 15),
        ("MONSOON20", 20),
        ("EARLYBIRD10", 10),
    ];

    /// Builds a table from `(code, percent)` pairs.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        PromoTable {
            codes: codes.into_iter().map(|(c, p)| (c.into(), p)).collect(),
        }
    }

    /// Percentage granted by `code`, if it exists.
    pub fn percentage(&self, code: &str) -> Option<u32> {
        self.codes.get(code).copied()
    }

    /// Number of codes in the table.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Iterates over `(code, percent)` in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.codes.iter().map(|(c, p)| (c.as_str(), *p))
    }

    /// Applies `code` to `amount`.
    ///
    /// ## Example
    /// ```rust
    /// use dandeli_core::money::Money;
    /// use dandeli_core::promo::PromoTable;
    ///
    /// let table = PromoTable::default();
    /// let outcome = table.apply(Money::from_rupees(1000), "SUMMER25");
    /// assert!(outcome.valid);
    /// assert_eq!(outcome.discount.rupees(), 250);
    /// assert_eq!(outcome.discounted_amount.rupees(), 750);
    /// ```
    pub fn apply(&self, amount: Money, code: &str) -> PromoOutcome {
        match self.percentage(code) {
            Some(percent) => {
                let discount = amount.percentage(percent);
                PromoOutcome {
                    discounted_amount: amount - discount,
                    discount,
                    valid: true,
                }
            }
            None => PromoOutcome::rejected(amount),
        }
    }

    /// Codes whose percentage is outside `1..=100`.
    ///
    /// A table loaded from configuration is checked with this before use.
    pub fn invalid_codes(&self) -> Vec<&str> {
        self.codes
            .iter()
            .filter(|(_, p)| !(1..=100).contains(*p))
            .map(|(c, _)| c.as_str())
            .collect()
    }
}

impl Default for PromoTable {
    fn default() -> Self {
        PromoTable::new(Self::DEFAULT_CODES)
    }
}

/// Applies `code` against the default promo table.
pub fn apply_promo(amount: Money, code: &str) -> PromoOutcome {
    PromoTable::default().apply(amount, code)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_summer25_on_1000() {
        let outcome = apply_promo(Money::from_paise(1000), "SUMMER25");
        assert!(outcome.valid);
        assert_eq!(outcome.discount, Money::from_paise(250));
        assert_eq!(outcome.discounted_amount, Money::from_paise(750));
    }

    #[test]
    fn test_default_codes() {
        let table = PromoTable::default();
        assert_eq!(table.len(), 4);
        assert_eq!(table.percentage("WELCOME15"), Some(15));
        assert_eq!(table.percentage("MONSOON20"), Some(20));
        assert_eq!(table.percentage("EARLYBIRD10"), Some(10));
        assert!(table.invalid_codes().is_empty());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let outcome = apply_promo(Money::from_rupees(500), "summer25");
        assert!(!outcome.valid);
        assert_eq!(outcome.discounted_amount, Money::from_rupees(500));
        assert_eq!(outcome.discount, Money::zero());
    }

    #[test]
    fn test_applying_twice_does_not_stack() {
        let table = PromoTable::default();
        let amount = Money::from_rupees(200);
        assert_eq!(table.apply(amount, "WELCOME15"), table.apply(amount, "WELCOME15"));
    }

    #[test]
    fn test_custom_table_and_validation() {
        let table = PromoTable::new([("DIWALI30", 30), ("BROKEN", 0), ("TOOMUCH", 150)]);
        assert_eq!(table.apply(Money::from_rupees(100), "DIWALI30").discount.rupees(), 30);
        assert!(!table.apply(Money::from_rupees(100), "SUMMER25").valid);
        assert_eq!(table.invalid_codes(), vec!["BROKEN", "TOOMUCH"]);
    }

    #[test]
    fn test_table_deserializes_from_map() {
        let table: PromoTable = serde_json::from_str(r#"{"FLASH5": 5}"#).unwrap();
        assert_eq!(table.iter().collect::<Vec<_>>(), vec![("FLASH5", 5)]);
    }

    proptest! {
        #[test]
        fn prop_invalid_code_leaves_amount_unchanged(
            paise in 0i64..100_000_000,
            code in "[a-z0-9]{0,12}",
        ) {
            // Default codes are all upper case, so these never match
            let amount = Money::from_paise(paise);
            let outcome = apply_promo(amount, &code);
            prop_assert!(!outcome.valid);
            prop_assert_eq!(outcome.discounted_amount, amount);
            prop_assert_eq!(outcome.discount, Money::zero());
        }

        #[test]
        fn prop_valid_code_never_increases_amount(
            paise in 0i64..100_000_000,
            idx in 0usize..4,
        ) {
            let (code, _) = PromoTable::DEFAULT_CODES[idx];
            let amount = Money::from_paise(paise);
            let outcome = apply_promo(amount, code);
            prop_assert!(outcome.valid);
            prop_assert!(outcome.discounted_amount <= amount);
            prop_assert_eq!(outcome.discount + outcome.discounted_amount, amount);
        }
    }
}
