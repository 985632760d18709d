//! # dandeli-core: Pure Booking Logic for Dandeli Adventures
//!
//! This crate is the **heart** of the resort's booking engine. It contains
//! all business logic as pure functions and plain state machines, with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Dandeli Booking Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Website (booking page)                       │   │
//! │  │    Form ──► OTP dialog ──► Payment form ──► Confirmation       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              dandeli-booking (BookingCoordinator)               │   │
//! │  │    payment gateway, email/SMS notifier, configuration           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ dandeli-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐  │   │
//! │  │  │ pricing │ │  promo  │ │   otp   │ │validation│ │   flow   │  │   │
//! │  │  │ RateCard│ │PromoTbl │ │Verifier │ │ form     │ │BookingFlw│  │   │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └─────────┘ └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO NETWORK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (BookingRequest, PricingQuote, BookingConfirmation)
//! - [`money`] - Money type with integer arithmetic (paise, no floating point)
//! - [`pricing`] - Room rates and the base price calculation
//! - [`promo`] - Promotional code table and discount resolution
//! - [`otp`] - One-time passcode challenge state machine
//! - [`validation`] - Booking form rules
//! - [`flow`] - The booking step state machine
//! - [`reference`] - Booking references and transaction ids
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use dandeli_core::pricing::calculate_price;
//! use dandeli_core::promo::PromoTable;
//!
//! // Deluxe room for two adults and one child
//! let base = calculate_price("deluxe", 2, 1);
//! assert_eq!(base.rupees(), 200);
//!
//! let outcome = PromoTable::default().apply(base, "MONSOON20");
//! assert!(outcome.valid);
//! assert_eq!(outcome.discounted_amount.rupees(), 160);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod flow;
pub mod money;
pub mod otp;
pub mod pricing;
pub mod promo;
pub mod reference;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, FormErrors, OtpError, ValidationError};
pub use flow::{BookingFlow, BookingStep, StepKind};
pub use money::Money;
pub use otp::{OtpSettings, OtpStatus, OtpVerifier};
pub use pricing::{calculate_price, RateCard};
pub use promo::{apply_promo, PromoOutcome, PromoTable};
pub use types::*;
pub use validation::BookingForm;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// ISO 4217 code of the currency every amount is charged in.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Prefix of every booking reference handed to guests.
pub const BOOKING_REFERENCE_PREFIX: &str = "BK";

/// Prefix of transaction ids issued by the simulated gateway.
pub const TRANSACTION_ID_PREFIX: &str = "TXN";

/// Minimum length of the guest's name, in characters.
pub const MIN_GUEST_NAME_CHARS: usize = 2;
