//! # Money Module
//!
//! Provides the `Money` type for every amount the booking flow quotes or
//! charges.
//!
//! ## Why Integer Paise?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    ₹200 × 0.15 = 30.000000000000004  ❌ WRONG!                          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise (1 rupee = 100 paise)                      │
//! │    20000 paise × 15 / 100 = 3000 paise (₹30.00)                        │
//! │    Fractions of a paisa are rounded half up, explicitly                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use dandeli_core::money::Money;
//!
//! let room = Money::from_rupees(150);
//! let total = room + Money::from_rupees(20) * 2u32;
//! assert_eq!(total.rupees(), 190);
//! assert_eq!(total.to_string(), "₹190.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (the smallest INR unit).
///
/// ## Where Money is Used
/// ```text
/// RoomCategory.base_rate ──┬──► calculate_price() ──► PricingQuote.base_amount
///                          │                                  │
///  per-adult / per-child ──┘                        PromoTable.apply()
///                                                             │
///                                     PricingQuote.final_amount ──► PaymentGateway
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ## Example
    /// ```rust
    /// use dandeli_core::money::Money;
    ///
    /// let fee = Money::from_paise(12_550); // ₹125.50
    /// assert_eq!(fee.paise(), 12_550);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    ///
    /// ## Example
    /// ```rust
    /// use dandeli_core::money::Money;
    ///
    /// assert_eq!(Money::from_paise(18_775).rupees(), 187);
    /// ```
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Returns `percent`% of this amount, rounded half up to the paisa.
    ///
    /// ## Implementation
    /// Integer math: `(amount * percent + 50) / 100`. The +50 provides the
    /// rounding (50/100 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use dandeli_core::money::Money;
    ///
    /// let amount = Money::from_rupees(1000);
    /// assert_eq!(amount.percentage(25).rupees(), 250);
    ///
    /// // ₹1.01 × 15% = 15.15 paise → 15 paise
    /// assert_eq!(Money::from_paise(101).percentage(15).paise(), 15);
    /// ```
    pub fn percentage(&self, percent: u32) -> Money {
        // i128 so large amounts cannot overflow
        let part = (self.0 as i128 * percent as i128 + 50) / 100;
        Money::from_paise(part as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount the way the booking page prints it, e.g. `₹1250.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Multiplication by a guest count.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        Money(self.0 * qty as i64)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
