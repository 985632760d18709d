//! # Booking Error Types
//!
//! Error types for the booking coordinator and its collaborators.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Booking Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Payment      │  │     Notification        │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  InvalidCard..  │  │  EmailFailed            │ │
//! │  │  ConfigLoad..   │  │  InvalidUpiId   │  │  SmsFailed              │ │
//! │  │  ConfigSave..   │  │  Declined       │  │  (never fatal)          │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Flow (from dandeli-core): Validation, Verification, ...       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use dandeli_core::CoreError;
use thiserror::Error;

/// Result type alias for booking operations.
pub type BookingResult<T> = Result<T, BookingError>;

// =============================================================================
// Payment Error
// =============================================================================

/// Why the payment collaborator refused a charge.
///
/// Messages are shown to the guest as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// Card number, expiry or CVV missing.
    #[error("Invalid card details")]
    InvalidCardDetails,

    /// Card number is not 16 digits.
    #[error("Invalid card number")]
    InvalidCardNumber,

    /// CVV is not 3 digits.
    #[error("Invalid CVV")]
    InvalidCvv,

    /// UPI id has no `@`.
    #[error("Invalid UPI ID")]
    InvalidUpiId,

    /// The processor declined the charge.
    #[error("Payment declined: {reason}")]
    Declined { reason: String },

    /// The processor could not be reached or answered nonsense.
    #[error("Payment processing failed. Please try again.")]
    Unavailable { detail: String },
}

// =============================================================================
// Notification Error
// =============================================================================

/// A confirmation message that could not be handed off.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("Failed to send email to {to}: {reason}")]
    EmailFailed { to: String, reason: String },

    #[error("Failed to send SMS to {to}: {reason}")]
    SmsFailed { to: String, reason: String },
}

// =============================================================================
// Booking Error
// =============================================================================

/// Everything a booking operation can report back to the website.
#[derive(Debug, Error)]
pub enum BookingError {
    // =========================================================================
    // Flow Errors
    // =========================================================================
    /// Validation, verification or an out-of-order step.
    #[error(transparent)]
    Flow(#[from] CoreError),

    // =========================================================================
    // Payment Errors
    // =========================================================================
    /// The charge failed. The booking stays on the payment step.
    #[error("{0}")]
    Payment(#[from] PaymentError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid booking configuration.
    #[error("Invalid booking configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for BookingError {
    fn from(err: std::io::Error) -> Self {
        BookingError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for BookingError {
    fn from(err: toml::de::Error) -> Self {
        BookingError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for BookingError {
    fn from(err: toml::ser::Error) -> Self {
        BookingError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl BookingError {
    /// Returns true if the guest can fix this by changing what they entered.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            BookingError::Flow(CoreError::Validation(_))
                | BookingError::Flow(CoreError::Verification(_))
                | BookingError::Payment(_)
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BookingError::InvalidConfig(_)
                | BookingError::ConfigLoadFailed(_)
                | BookingError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dandeli_core::OtpError;

    #[test]
    fn test_payment_messages_are_guest_facing() {
        assert_eq!(PaymentError::InvalidCardNumber.to_string(), "Invalid card number");
        assert_eq!(PaymentError::InvalidUpiId.to_string(), "Invalid UPI ID");
        let err: BookingError = PaymentError::InvalidCvv.into();
        assert_eq!(err.to_string(), "Invalid CVV");
    }

    #[test]
    fn test_flow_errors_pass_through() {
        let err: BookingError = CoreError::from(OtpError::Mismatch { attempts: 1 }).into();
        assert_eq!(err.to_string(), "Invalid OTP. Please try again.");
        assert!(err.is_user_correctable());
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_config_errors() {
        let err = BookingError::InvalidConfig("currency".into());
        assert!(err.is_config_error());
        assert!(!err.is_user_correctable());
    }
}
