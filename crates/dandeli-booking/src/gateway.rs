//! # Payment Gateway
//!
//! The payment collaborator seam and its simulated implementation.
//!
//! ## Call Shape
//! ```text
//! BookingCoordinator::pay()
//!      │
//!      ▼
//! PaymentGateway::process_payment(PaymentRequest)
//!      │       amount, currency, method, description, metadata
//!      │
//!      ├──► Ok(PaymentReceipt { transaction_id, .. })  ──► Confirmation
//!      │
//!      └──► Err(PaymentError)  ──► guest stays on Payment, sees the message
//! ```
//!
//! A single opaque request/response call. No retries, no idempotency key,
//! no timeout: a hung gateway leaves the caller waiting.

use async_trait::async_trait;
use chrono::Utc;
use dandeli_core::reference::transaction_id;
use dandeli_core::{Money, PaymentMethod};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::PaymentError;

// =============================================================================
// Request / Receipt
// =============================================================================

/// One charge, as handed to the payment collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub amount: Money,
    /// ISO 4217 code.
    pub currency: String,
    pub method: PaymentMethod,
    /// Human-readable line shown on the guest's statement.
    pub description: String,
    /// Free-form key/value pairs forwarded to the processor.
    pub metadata: BTreeMap<String, String>,
}

/// A successful charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    /// Processor-issued id. The coordinator rejects an empty one.
    pub transaction_id: String,
    pub amount: Money,
}

// =============================================================================
// Gateway Trait
// =============================================================================

/// Abstraction over a payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charges the guest once.
    ///
    /// # Errors
    ///
    /// Returns the processor's refusal, with a guest-facing message.
    async fn process_payment(&self, request: PaymentRequest) -> Result<PaymentReceipt, PaymentError>;
}

// =============================================================================
// Simulated Gateway
// =============================================================================

/// Stand-in processor for development and the demo website.
///
/// Waits for the configured latency, applies basic card and UPI checks, and
/// issues a `TXN` transaction id. Bank transfers always succeed;
/// [`DECLINED_TEST_CARD`] is always declined.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    latency: Duration,
}

impl SimulatedGateway {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Creates an Arc-wrapped instance for sharing.
    pub fn shared(latency: Duration) -> Arc<dyn PaymentGateway> {
        Arc::new(Self::new(latency))
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000))
    }
}

/// Card number the simulated processor always declines.
pub const DECLINED_TEST_CARD: &str = "4000000000000002";

/// Card and UPI checks the simulated processor applies.
pub fn check_payment_method(method: &PaymentMethod) -> Result<(), PaymentError> {
    match method {
        PaymentMethod::Card {
            number,
            expiry,
            cvv,
            ..
        } => {
            if number.trim().is_empty() || expiry.trim().is_empty() || cvv.trim().is_empty() {
                return Err(PaymentError::InvalidCardDetails);
            }

            let digits: String = number.chars().filter(|c| !c.is_whitespace()).collect();
            if digits.len() != 16 || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(PaymentError::InvalidCardNumber);
            }

            let cvv = cvv.trim();
            if cvv.len() != 3 || !cvv.chars().all(|c| c.is_ascii_digit()) {
                return Err(PaymentError::InvalidCvv);
            }

            if digits == DECLINED_TEST_CARD {
                return Err(PaymentError::Declined {
                    reason: "insufficient funds".to_string(),
                });
            }

            Ok(())
        }
        PaymentMethod::Upi { vpa } => {
            if !vpa.contains('@') {
                return Err(PaymentError::InvalidUpiId);
            }
            Ok(())
        }
        PaymentMethod::BankTransfer => Ok(()),
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn process_payment(&self, request: PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        // Simulate network delay
        tokio::time::sleep(self.latency).await;

        if let Err(e) = check_payment_method(&request.method) {
            warn!(
                method = request.method.code(),
                error = %e,
                "Simulated payment rejected"
            );
            return Err(e);
        }

        let transaction_id = transaction_id(Utc::now());

        info!(
            amount = request.amount.paise(),
            currency = %request.currency,
            method = request.method.code(),
            description = %request.description,
            transaction_id = %transaction_id,
            "Simulated payment processed successfully"
        );

        Ok(PaymentReceipt {
            transaction_id,
            amount: request.amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(number: &str, cvv: &str) -> PaymentMethod {
        PaymentMethod::Card {
            number: number.to_string(),
            holder: "Jane Doe".to_string(),
            expiry: "12/28".to_string(),
            cvv: cvv.to_string(),
        }
    }

    fn request(method: PaymentMethod) -> PaymentRequest {
        PaymentRequest {
            amount: Money::from_rupees(190),
            currency: "INR".to_string(),
            method,
            description: "Booking for deluxe room".to_string(),
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn test_card_checks() {
        assert_eq!(check_payment_method(&card("4111 1111 1111 1111", "123")), Ok(()));
        assert_eq!(
            check_payment_method(&card("", "123")),
            Err(PaymentError::InvalidCardDetails)
        );
        assert_eq!(
            check_payment_method(&card("4111 1111 1111", "123")),
            Err(PaymentError::InvalidCardNumber)
        );
        assert_eq!(
            check_payment_method(&card("4111-1111-1111-1111", "123")),
            Err(PaymentError::InvalidCardNumber)
        );
        assert_eq!(
            check_payment_method(&card("4111111111111111", "12")),
            Err(PaymentError::InvalidCvv)
        );
    }

    #[test]
    fn test_declined_test_card() {
        let err = check_payment_method(&card("4000 0000 0000 0002", "123")).unwrap_err();
        assert_eq!(
            err,
            PaymentError::Declined {
                reason: "insufficient funds".to_string()
            }
        );
        assert_eq!(err.to_string(), "Payment declined: insufficient funds");
    }

    #[test]
    fn test_upi_and_bank_transfer_checks() {
        let upi = |vpa: &str| PaymentMethod::Upi {
            vpa: vpa.to_string(),
        };
        assert_eq!(check_payment_method(&upi("jane@okaxis")), Ok(()));
        assert_eq!(check_payment_method(&upi("jane")), Err(PaymentError::InvalidUpiId));
        assert_eq!(check_payment_method(&PaymentMethod::BankTransfer), Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_payment_success() {
        let gateway = SimulatedGateway::default();
        let receipt = gateway
            .process_payment(request(card("4111 1111 1111 1111", "123")))
            .await
            .unwrap();

        assert!(receipt.transaction_id.starts_with("TXN"));
        assert!(receipt.transaction_id.len() > 3);
        assert_eq!(receipt.amount, Money::from_rupees(190));
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_payment_waits_for_latency() {
        let gateway = SimulatedGateway::new(Duration::from_millis(2000));
        let started = tokio::time::Instant::now();
        gateway
            .process_payment(request(PaymentMethod::BankTransfer))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_payment_rejects_bad_upi() {
        let gateway = SimulatedGateway::new(Duration::ZERO);
        let err = gateway
            .process_payment(request(PaymentMethod::Upi {
                vpa: "not-a-vpa".to_string(),
            }))
            .await
            .unwrap_err();
        assert_eq!(err, PaymentError::InvalidUpiId);
    }
}
