//! # Domain Types
//!
//! Core domain types used throughout the booking flow.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │ BookingRequest  │   │  PricingQuote   │   │ BookingConfirmation │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  guest_name     │──►│  base_amount    │   │  booking_reference  │   │
//! │  │  email, phone   │   │  discount_amount│   │  transaction_id     │   │
//! │  │  adults/children│   │  final_amount   │   │  confirmed_at       │   │
//! │  │  check_in/out   │   │  promo_code?    │   └─────────────────────┘   │
//! │  │  room_category  │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │  RoomCategory   │   │  PaymentMethod  │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  Standard       │   │  Card {..}      │                              │
//! │  │  Deluxe         │   │  Upi {..}       │                              │
//! │  │  Suite          │   │  BankTransfer   │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entity here is transient: it lives for one visit to the booking
//! page and is never persisted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Room Category
// =============================================================================

/// The room types offered on the booking form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RoomCategory {
    Standard,
    Deluxe,
    Suite,
}

impl RoomCategory {
    /// All categories, in the order the booking form lists them.
    pub const ALL: [RoomCategory; 3] = [
        RoomCategory::Standard,
        RoomCategory::Deluxe,
        RoomCategory::Suite,
    ];

    /// Resolves the form value (`"standard"`, `"deluxe"`, `"suite"`).
    ///
    /// Matching is exact, like the form's select values.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "standard" => Some(RoomCategory::Standard),
            "deluxe" => Some(RoomCategory::Deluxe),
            "suite" => Some(RoomCategory::Suite),
            _ => None,
        }
    }

    /// The form value for this category.
    pub const fn code(&self) -> &'static str {
        match self {
            RoomCategory::Standard => "standard",
            RoomCategory::Deluxe => "deluxe",
            RoomCategory::Suite => "suite",
        }
    }

    /// Name printed in confirmation emails.
    pub const fn display_name(&self) -> &'static str {
        match self {
            RoomCategory::Standard => "Standard Room",
            RoomCategory::Deluxe => "Deluxe Room",
            RoomCategory::Suite => "Luxury Suite",
        }
    }
}

impl fmt::Display for RoomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Booking Request
// =============================================================================

/// A validated booking, as handed to the payment step.
///
/// ## Invariants
/// - `check_out > check_in`
/// - `adult_count >= 1`
///
/// Only [`crate::validation::validate_form`] builds one from raw input, so
/// the invariants hold for every request the flow carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookingRequest {
    /// Guest's full name, trimmed.
    pub guest_name: String,

    pub email: String,

    /// Phone number as entered (validated, not normalised).
    pub phone: String,

    pub adult_count: u32,

    pub child_count: u32,

    #[ts(as = "String")]
    pub check_in: NaiveDate,

    #[ts(as = "String")]
    pub check_out: NaiveDate,

    /// Room code from the form. Unknown codes are priced at the default rate.
    pub room_category: String,

    /// Promotional code forwarded from a `?promo=` link, if any.
    pub promo_code: Option<String>,
}

impl BookingRequest {
    /// Number of nights between check-in and check-out.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Adults plus children.
    pub fn total_guests(&self) -> u32 {
        self.adult_count + self.child_count
    }

    /// Resolved room category, if the code is one the resort offers.
    pub fn room(&self) -> Option<RoomCategory> {
        RoomCategory::from_code(&self.room_category)
    }

    /// Room name for messages, falling back to the raw code.
    pub fn room_display_name(&self) -> &str {
        match self.room() {
            Some(room) => room.display_name(),
            None => &self.room_category,
        }
    }

    /// Whether a phone number was supplied for text notifications.
    pub fn has_phone(&self) -> bool {
        !self.phone.trim().is_empty()
    }
}

// =============================================================================
// Pricing Quote
// =============================================================================

/// The amounts shown on the payment step.
///
/// Derived deterministically from a [`BookingRequest`] and an optional promo
/// code; recomputed whenever either changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingQuote {
    pub base_amount: Money,

    pub discount_amount: Money,

    /// `base_amount - discount_amount`; what the guest is charged.
    pub final_amount: Money,

    /// The promo code that produced the discount. `None` when no code was
    /// given or the code was not recognised.
    pub promo_code: Option<String>,
}

impl PricingQuote {
    /// A quote without any discount.
    pub fn undiscounted(base_amount: Money) -> Self {
        PricingQuote {
            base_amount,
            discount_amount: Money::zero(),
            final_amount: base_amount,
            promo_code: None,
        }
    }

    /// Whether a promo code reduced the price.
    pub fn has_discount(&self) -> bool {
        self.discount_amount.is_positive()
    }
}

// =============================================================================
// Booking Confirmation
// =============================================================================

/// Proof of a paid booking, shown on the confirmation screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookingConfirmation {
    /// `BK` followed by a timestamp-derived suffix.
    pub booking_reference: String,

    /// Identifier returned by the payment collaborator. Never empty.
    pub transaction_id: String,

    #[ts(as = "String")]
    pub confirmed_at: DateTime<Utc>,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the guest chose to pay.
///
/// Detail checks (card number length, CVV, UPI id) belong to the payment
/// collaborator, which reports them as a failed payment.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PaymentMethod {
    /// Credit or debit card.
    #[serde(rename = "creditCard")]
    Card {
        number: String,
        holder: String,
        expiry: String,
        cvv: String,
    },

    /// UPI collect request against a virtual payment address.
    Upi { vpa: String },

    /// Offline bank transfer.
    BankTransfer,
}

impl PaymentMethod {
    /// Wire code used in payment metadata.
    pub const fn code(&self) -> &'static str {
        match self {
            PaymentMethod::Card { .. } => "creditCard",
            PaymentMethod::Upi { .. } => "upi",
            PaymentMethod::BankTransfer => "bankTransfer",
        }
    }

    /// Label printed in confirmation emails.
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Card { .. } => "Credit/Debit Card",
            PaymentMethod::Upi { .. } => "UPI Payment",
            PaymentMethod::BankTransfer => "Bank Transfer",
        }
    }
}

/// Card number and CVV never reach the logs.
impl fmt::Debug for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Card { number, holder, .. } => {
                let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
                let last4 = &digits[digits.len().saturating_sub(4)..];
                f.debug_struct("Card")
                    .field("number", &format!("****{last4}"))
                    .field("holder", holder)
                    .finish_non_exhaustive()
            }
            PaymentMethod::Upi { vpa } => f.debug_struct("Upi").field("vpa", vpa).finish(),
            PaymentMethod::BankTransfer => f.write_str("BankTransfer"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn request(room: &str) -> BookingRequest {
        BookingRequest {
            guest_name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            phone: "+919876543210".to_string(),
            adult_count: 2,
            child_count: 1,
            check_in: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 11, 4).unwrap(),
            room_category: room.to_string(),
            promo_code: None,
        }
    }

    #[test]
    fn test_room_category_codes() {
        for room in RoomCategory::ALL {
            assert_eq!(RoomCategory::from_code(room.code()), Some(room));
        }
        assert_eq!(RoomCategory::from_code("Deluxe"), None);
        assert_eq!(RoomCategory::from_code("penthouse"), None);
        assert_eq!(RoomCategory::Suite.display_name(), "Luxury Suite");
    }

    #[test]
    fn test_request_helpers() {
        let req = request("deluxe");
        assert_eq!(req.nights(), 3);
        assert_eq!(req.total_guests(), 3);
        assert_eq!(req.room(), Some(RoomCategory::Deluxe));
        assert_eq!(req.room_display_name(), "Deluxe Room");
        assert!(req.has_phone());

        let odd = request("treehouse");
        assert_eq!(odd.room(), None);
        assert_eq!(odd.room_display_name(), "treehouse");
    }

    #[test]
    fn test_undiscounted_quote() {
        let quote = PricingQuote::undiscounted(Money::from_rupees(190));
        assert_eq!(quote.final_amount, quote.base_amount);
        assert!(!quote.has_discount());
        assert_eq!(quote.promo_code, None);
    }

    #[test]
    fn test_payment_method_labels() {
        let upi = PaymentMethod::Upi {
            vpa: "jane@okbank".to_string(),
        };
        assert_eq!(upi.code(), "upi");
        assert_eq!(upi.label(), "UPI Payment");
        assert_eq!(PaymentMethod::BankTransfer.label(), "Bank Transfer");
    }

    #[test]
    fn test_card_debug_is_masked() {
        let card = PaymentMethod::Card {
            number: "4111 1111 1111 1234".to_string(),
            holder: "Jane Doe".to_string(),
            expiry: "12/28".to_string(),
            cvv: "321".to_string(),
        };
        let debug = format!("{card:?}");
        assert!(debug.contains("****1234"));
        assert!(!debug.contains("4111"));
        assert!(!debug.contains("321"));
    }

    #[test]
    fn test_payment_method_serde_tag() {
        let json = serde_json::to_string(&PaymentMethod::BankTransfer).unwrap();
        assert_eq!(json, r#"{"type":"bankTransfer"}"#);

        let card: PaymentMethod = serde_json::from_str(
            r#"{"type":"creditCard","number":"4111111111111111","holder":"J","expiry":"01/30","cvv":"123"}"#,
        )
        .unwrap();
        assert_eq!(card.code(), "creditCard");
    }
}
