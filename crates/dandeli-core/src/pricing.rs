//! # Pricing Module
//!
//! Room rates and the base price of a stay.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  price = base(category) + per_adult × adults + per_child × children    │
//! │                                                                         │
//! │  Category      Base      Per adult   Per child                          │
//! │  ──────────    ──────    ─────────   ─────────                          │
//! │  standard      ₹100      ₹20         ₹10                                │
//! │  deluxe        ₹150      ₹20         ₹10                                │
//! │  suite         ₹250      ₹20         ₹10                                │
//! │  (unknown)     ₹100      ₹20         ₹10                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The calculator never rejects input. Guest counts are validated by the
//! form, not here, and an unrecognised category silently gets the default
//! base rate.

use crate::money::Money;
use crate::promo::PromoTable;
use crate::types::{BookingRequest, PricingQuote, RoomCategory};

// =============================================================================
// Rate Card
// =============================================================================

/// The resort's published rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateCard {
    pub standard: Money,
    pub deluxe: Money,
    pub suite: Money,
    /// Base rate for category codes the resort does not offer.
    pub fallback: Money,
    pub per_adult: Money,
    pub per_child: Money,
}

impl RateCard {
    /// Published rates.
    pub const STANDARD: RateCard = RateCard {
        standard: Money::from_rupees(100),
        deluxe: Money::from_rupees(150),
        suite: Money::from_rupees(250),
        fallback: Money::from_rupees(100),
        per_adult: Money::from_rupees(20),
        per_child: Money::from_rupees(10),
    };

    /// Base rate for a category code.
    pub fn base_rate(&self, category: &str) -> Money {
        match RoomCategory::from_code(category) {
            Some(RoomCategory::Standard) => self.standard,
            Some(RoomCategory::Deluxe) => self.deluxe,
            Some(RoomCategory::Suite) => self.suite,
            None => self.fallback,
        }
    }

    /// Base price for the given occupancy.
    pub fn price(&self, category: &str, adults: u32, children: u32) -> Money {
        self.base_rate(category) + self.per_adult * adults + self.per_child * children
    }
}

impl Default for RateCard {
    fn default() -> Self {
        RateCard::STANDARD
    }
}

// =============================================================================
// Public Operations
// =============================================================================

/// Base price of a stay at the published rates.
///
/// ## Example
/// ```rust
/// use dandeli_core::pricing::calculate_price;
///
/// assert_eq!(calculate_price("suite", 1, 0).rupees(), 270);
/// assert_eq!(calculate_price("cabin", 0, 0).rupees(), 100);
/// ```
pub fn calculate_price(category: &str, adults: u32, children: u32) -> Money {
    RateCard::STANDARD.price(category, adults, children)
}

/// Prices a request and applies its promo code, if any.
///
/// ## User Workflow
/// ```text
/// BookingRequest ──► rates.price() ──► base_amount
///                                         │
///               request.promo_code ──► promos.apply()
///                                         │
///                                         ▼
///                                    PricingQuote
/// ```
pub fn quote(request: &BookingRequest, rates: &RateCard, promos: &PromoTable) -> PricingQuote {
    let base = rates.price(
        &request.room_category,
        request.adult_count,
        request.child_count,
    );

    let Some(code) = request.promo_code.as_deref() else {
        return PricingQuote::undiscounted(base);
    };

    let outcome = promos.apply(base, code);
    if !outcome.valid {
        return PricingQuote::undiscounted(base);
    }

    PricingQuote {
        base_amount: base,
        discount_amount: outcome.discount,
        final_amount: outcome.discounted_amount,
        promo_code: Some(code.to_string()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
