//! # Error Types
//!
//! Domain-specific error types for dandeli-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  dandeli-core errors (this file)                                       │
//! │  ├── ValidationError  - One booking form field failed a rule           │
//! │  ├── FormErrors       - Every failing field of one submission          │
//! │  ├── OtpError         - Passcode mismatch / expiry / lockout           │
//! │  └── CoreError        - Booking flow violations (wraps the above)      │
//! │                                                                         │
//! │  dandeli-booking errors (separate crate)                               │
//! │  ├── PaymentError     - Gateway declined or rejected the charge        │
//! │  ├── NotifyError      - Email / SMS could not be handed off            │
//! │  └── BookingError     - What the website sees                          │
//! │                                                                         │
//! │  Flow: ValidationError → FormErrors → CoreError → BookingError         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include the offending field in validation errors so the UI can show
//!    the message inline
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use std::fmt;

use thiserror::Error;

use crate::flow::StepKind;

// =============================================================================
// Core Error
// =============================================================================

/// Booking flow errors.
///
/// None of these are fatal: the flow stays in the step it was in and the
/// guest is re-prompted.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The requested action is not available in the current step.
    ///
    /// ## When This Occurs
    /// - Paying while still on the form
    /// - Cancelling from the confirmation screen
    /// - Verifying a phone number when verification is not part of the flow
    #[error("Cannot {action} while on the {step} step")]
    InvalidTransition { step: StepKind, action: &'static str },

    /// The phone number must be verified before payment.
    #[error("Please verify your phone number before continuing to payment")]
    VerificationRequired,

    /// The payment collaborator reported success without a transaction id.
    #[error("Payment response did not include a transaction id")]
    MissingTransactionId,

    /// Form validation failed (wraps FormErrors).
    #[error("{0}")]
    Validation(#[from] FormErrors),

    /// Phone verification failed (wraps OtpError).
    #[error("{0}")]
    Verification(#[from] OtpError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single booking form field that failed its rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Invalid format (e.g., malformed email, non-numeric guest count).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value must be positive.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: String },

    /// A date must fall strictly after another date.
    #[error("{field} must be after {other}")]
    NotAfter { field: String, other: String },
}

impl ValidationError {
    /// Returns the name of the field this error belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::NotAfter { field, .. } => field,
        }
    }
}

// =============================================================================
// Form Errors
// =============================================================================

/// Every field error produced by one form submission.
///
/// The website renders each entry next to its field, so validation keeps
/// going after the first failure instead of bailing out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub struct FormErrors {
    errors: Vec<ValidationError>,
}

impl FormErrors {
    /// Creates an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a field error.
    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Returns true if no field failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns the error recorded for `field`, if any.
    pub fn for_field(&self, field: &str) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.field() == field)
    }

    /// Iterates over the recorded errors in field order.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl From<ValidationError> for FormErrors {
    fn from(error: ValidationError) -> Self {
        FormErrors {
            errors: vec![error],
        }
    }
}

// =============================================================================
// OTP Error
// =============================================================================

/// One-time passcode failures.
///
/// ## User Workflow
/// ```text
/// Enter code "123456"
///      │
///      ▼
/// verify_code() ──► Mismatch ──► "Invalid OTP. Please try again."
///      │                          (dialog stays open, guest retries)
///      │
///      ├──► Expired ──► "code has expired" (resend is now enabled)
///      │
///      └──► Verified ──► continue to payment
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OtpError {
    /// No challenge is active (never sent, already used, or expired).
    #[error("No verification code is active. Please request a new code.")]
    NoActiveChallenge,

    /// The entered code does not match the active challenge.
    #[error("Invalid OTP. Please try again.")]
    Mismatch { attempts: u32 },

    /// The active challenge ran out of time.
    #[error("The verification code has expired. Please request a new code.")]
    Expired,

    /// Too many wrong codes were entered for this challenge.
    #[error("Too many incorrect attempts ({attempts}). Please request a new code.")]
    LockedOut { attempts: u32 },

    /// Resend was requested while the countdown is still running.
    #[error("You can request a new code in {remaining_secs} seconds")]
    ResendUnavailable { remaining_secs: u32 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
