//! # Booking Flow
//!
//! The step state machine behind the booking page.
//!
//! ## Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────┐  submit()   ┌──────────────┐  verify_code()  ┌─────────┐     │
//! │  │ Form │────────────►│ Verification │────────────────►│ Payment │     │
//! │  └──────┘             │  (optional)  │                 └────┬────┘     │
//! │    ▲  ▲               └──────┬───────┘                      │          │
//! │    │  │     cancel()         │                confirm()     │          │
//! │    │  └──────────────────────┘                              ▼          │
//! │    │                         ▲               ┌──────────────────┐      │
//! │    │  cancel() (fields kept) │               │   Confirmation   │      │
//! │    ├─────────────────────────┴───────────────┤                  │      │
//! │    │                                         └────────┬─────────┘      │
//! │    └──────────────── reset() (empty form) ────────────┘                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Without phone verification `submit()` goes straight to Payment.
//!
//! Each step carries exactly the data that exists at that point, so a
//! confirmation without a transaction id, or a payment without a validated
//! request, cannot be represented. Every transition is a method on
//! [`BookingFlow`]; a method called in the wrong step returns
//! `CoreError::InvalidTransition` and leaves the flow untouched.
//!
//! The flow does no I/O. Payment and notifications are driven by the
//! coordinator in `dandeli-booking`, which reports outcomes back here.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, OtpError};
use crate::otp::{OtpSettings, OtpVerifier};
use crate::pricing::{self, RateCard};
use crate::promo::PromoTable;
use crate::types::{BookingConfirmation, BookingRequest, PricingQuote};
use crate::validation::{validate_form, BookingForm};

// =============================================================================
// Step Kind
// =============================================================================

/// Which step the booking page is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum StepKind {
    Form,
    Verification,
    Payment,
    Confirmation,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::Form => "form",
            StepKind::Verification => "verification",
            StepKind::Payment => "payment",
            StepKind::Confirmation => "confirmation",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Booking Step
// =============================================================================

/// A step together with the data it owns.
///
/// The raw form is carried through Verification and Payment so that
/// cancelling restores exactly what the guest typed.
#[derive(Debug, Clone)]
pub enum BookingStep {
    Form {
        form: BookingForm,
    },
    Verification {
        form: BookingForm,
        request: BookingRequest,
        quote: PricingQuote,
        verifier: OtpVerifier,
    },
    Payment {
        form: BookingForm,
        request: BookingRequest,
        quote: PricingQuote,
        /// Payment attempts started so far.
        attempts: u32,
        /// Message from the last failed attempt.
        last_error: Option<String>,
        /// A charge has been started and not yet settled.
        in_flight: bool,
    },
    Confirmation {
        request: BookingRequest,
        quote: PricingQuote,
        confirmation: BookingConfirmation,
    },
}

impl BookingStep {
    pub fn kind(&self) -> StepKind {
        match self {
            BookingStep::Form { .. } => StepKind::Form,
            BookingStep::Verification { .. } => StepKind::Verification,
            BookingStep::Payment { .. } => StepKind::Payment,
            BookingStep::Confirmation { .. } => StepKind::Confirmation,
        }
    }
}

/// What the coordinator needs to charge the guest once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAttempt {
    pub request: BookingRequest,
    pub quote: PricingQuote,
    /// 1 for the first attempt, 2 for the first resubmission, and so on.
    pub attempt: u32,
    /// Failure message of the previous attempt, if this is a resubmission.
    pub previous_error: Option<String>,
}

// =============================================================================
// Booking Flow
// =============================================================================

/// One guest's pass through the booking page.
#[derive(Debug, Clone)]
pub struct BookingFlow {
    step: BookingStep,
    require_verification: bool,
    otp_settings: OtpSettings,
    rates: RateCard,
    promos: PromoTable,
}

impl BookingFlow {
    /// Starts on an empty form with published rates and default promo codes.
    pub fn new() -> Self {
        BookingFlow {
            step: BookingStep::Form {
                form: BookingForm::default(),
            },
            require_verification: false,
            otp_settings: OtpSettings::default(),
            rates: RateCard::STANDARD,
            promos: PromoTable::default(),
        }
    }

    /// Inserts a phone verification step between Form and Payment.
    pub fn with_phone_verification(mut self, settings: OtpSettings) -> Self {
        self.require_verification = true;
        self.otp_settings = settings;
        self
    }

    pub fn with_promos(mut self, promos: PromoTable) -> Self {
        self.promos = promos;
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn step(&self) -> &BookingStep {
        &self.step
    }

    pub fn kind(&self) -> StepKind {
        self.step.kind()
    }

    pub fn requires_verification(&self) -> bool {
        self.require_verification
    }

    pub fn promos(&self) -> &PromoTable {
        &self.promos
    }

    /// The raw form, in every step that still has one.
    pub fn form(&self) -> Option<&BookingForm> {
        match &self.step {
            BookingStep::Form { form }
            | BookingStep::Verification { form, .. }
            | BookingStep::Payment { form, .. } => Some(form),
            BookingStep::Confirmation { .. } => None,
        }
    }

    /// The validated request, once the form has been submitted.
    pub fn request(&self) -> Option<&BookingRequest> {
        match &self.step {
            BookingStep::Form { .. } => None,
            BookingStep::Verification { request, .. }
            | BookingStep::Payment { request, .. }
            | BookingStep::Confirmation { request, .. } => Some(request),
        }
    }

    pub fn quote(&self) -> Option<&PricingQuote> {
        match &self.step {
            BookingStep::Form { .. } => None,
            BookingStep::Verification { quote, .. }
            | BookingStep::Payment { quote, .. }
            | BookingStep::Confirmation { quote, .. } => Some(quote),
        }
    }

    pub fn verifier(&self) -> Option<&OtpVerifier> {
        match &self.step {
            BookingStep::Verification { verifier, .. } => Some(verifier),
            _ => None,
        }
    }

    pub fn confirmation(&self) -> Option<&BookingConfirmation> {
        match &self.step {
            BookingStep::Confirmation { confirmation, .. } => Some(confirmation),
            _ => None,
        }
    }

    /// Message from the last failed payment, while on the Payment step.
    pub fn last_payment_error(&self) -> Option<&str> {
        match &self.step {
            BookingStep::Payment { last_error, .. } => last_error.as_deref(),
            _ => None,
        }
    }

    fn invalid(&self, action: &'static str) -> CoreError {
        CoreError::InvalidTransition {
            step: self.kind(),
            action,
        }
    }

    // -------------------------------------------------------------------------
    // Form
    // -------------------------------------------------------------------------

    /// Mutable access to the form while it is being filled in.
    pub fn form_mut(&mut self) -> CoreResult<&mut BookingForm> {
        let step = self.kind();
        match &mut self.step {
            BookingStep::Form { form } => Ok(form),
            _ => Err(CoreError::InvalidTransition {
                step,
                action: "edit the booking form",
            }),
        }
    }

    /// Live price for the form as currently filled in.
    ///
    /// Guest counts that do not parse count as zero, so the displayed price
    /// never disappears while the guest is typing.
    pub fn preview_quote(&self) -> Option<PricingQuote> {
        let BookingStep::Form { form } = &self.step else {
            return None;
        };

        let adults = form.adults.trim().parse().unwrap_or(0);
        let children = form.children.trim().parse().unwrap_or(0);
        let base = self.rates.price(form.room_category.trim(), adults, children);

        let code = form.promo_code.as_deref().map(str::trim).unwrap_or("");
        let outcome = self.promos.apply(base, code);
        if !outcome.valid {
            return Some(PricingQuote::undiscounted(base));
        }
        Some(PricingQuote {
            base_amount: base,
            discount_amount: outcome.discount,
            final_amount: outcome.discounted_amount,
            promo_code: Some(code.to_string()),
        })
    }

    /// Validates the form and moves to Verification or Payment.
    ///
    /// ## Errors
    /// - `Validation` with every failing field (the flow stays on Form)
    /// - `InvalidTransition` outside the Form step
    pub fn submit(&mut self) -> CoreResult<StepKind> {
        let BookingStep::Form { form } = &self.step else {
            return Err(self.invalid("submit the booking form"));
        };

        let request = validate_form(form)?;
        let quote = pricing::quote(&request, &self.rates, &self.promos);
        let form = form.clone();

        self.step = if self.require_verification {
            BookingStep::Verification {
                form,
                request,
                quote,
                verifier: OtpVerifier::new(self.otp_settings.clone()),
            }
        } else {
            BookingStep::Payment {
                form,
                request,
                quote,
                attempts: 0,
                last_error: None,
                in_flight: false,
            }
        };
        Ok(self.kind())
    }

    // -------------------------------------------------------------------------
    // Verification
    // -------------------------------------------------------------------------

    /// Issues a code for the submitted phone number.
    ///
    /// Returns the phone number and the code to deliver.
    ///
    /// ## Errors
    /// `ResendUnavailable` while a previously sent code is still live; a
    /// live challenge is only ever replaced through the countdown.
    pub fn send_code<R: Rng + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> CoreResult<(String, String)> {
        let step = self.kind();
        match &mut self.step {
            BookingStep::Verification {
                request, verifier, ..
            } => {
                let remaining_secs = verifier.remaining_secs(now);
                if remaining_secs > 0 {
                    return Err(OtpError::ResendUnavailable { remaining_secs }.into());
                }
                let code = verifier.send_code(&request.phone, now, rng);
                Ok((request.phone.clone(), code))
            }
            _ => Err(CoreError::InvalidTransition {
                step,
                action: "send a verification code",
            }),
        }
    }

    /// Replaces the code once the resend countdown has reached zero.
    pub fn resend_code<R: Rng + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> CoreResult<(String, String)> {
        let step = self.kind();
        match &mut self.step {
            BookingStep::Verification {
                request, verifier, ..
            } => {
                let code = verifier.resend_code(&request.phone, now, rng)?;
                Ok((request.phone.clone(), code))
            }
            _ => Err(CoreError::InvalidTransition {
                step,
                action: "resend a verification code",
            }),
        }
    }

    /// Checks the code and, on a match, moves to Payment.
    ///
    /// ## Errors
    /// `Verification` for a wrong, expired or missing code; the flow stays
    /// on Verification so the guest can retry or resend.
    pub fn verify_code(&mut self, input: &str, now: DateTime<Utc>) -> CoreResult<()> {
        let step = self.kind();
        let BookingStep::Verification {
            form,
            request,
            quote,
            verifier,
        } = &mut self.step
        else {
            return Err(CoreError::InvalidTransition {
                step,
                action: "verify a code",
            });
        };

        verifier.verify_code(input, now)?;

        self.step = BookingStep::Payment {
            form: form.clone(),
            request: request.clone(),
            quote: quote.clone(),
            attempts: 0,
            last_error: None,
            in_flight: false,
        };
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Payment
    // -------------------------------------------------------------------------

    /// Starts a payment attempt and returns what to charge.
    ///
    /// There is no idempotency key: each call is a fresh charge.
    pub fn start_payment(&mut self) -> CoreResult<PaymentAttempt> {
        let step = self.kind();
        match &mut self.step {
            BookingStep::Payment {
                request,
                quote,
                attempts,
                last_error,
                in_flight,
                ..
            } => {
                *attempts += 1;
                *in_flight = true;
                Ok(PaymentAttempt {
                    request: request.clone(),
                    quote: quote.clone(),
                    attempt: *attempts,
                    previous_error: last_error.clone(),
                })
            }
            BookingStep::Verification { .. } => Err(CoreError::VerificationRequired),
            _ => Err(CoreError::InvalidTransition {
                step,
                action: "pay",
            }),
        }
    }

    /// Records a failed payment. The guest stays on Payment.
    ///
    /// Only valid while an attempt started by [`start_payment`](Self::start_payment)
    /// is in flight.
    pub fn record_payment_failure(&mut self, message: impl Into<String>) -> CoreResult<()> {
        let step = self.kind();
        match &mut self.step {
            BookingStep::Payment {
                last_error,
                in_flight,
                ..
            } if *in_flight => {
                *last_error = Some(message.into());
                *in_flight = false;
                Ok(())
            }
            _ => Err(CoreError::InvalidTransition {
                step,
                action: "record a payment failure",
            }),
        }
    }

    /// Moves to Confirmation after a successful payment.
    ///
    /// ## Errors
    /// - `MissingTransactionId` if `transaction_id` is blank; the flow stays
    ///   on Payment with the attempt still in flight
    /// - `InvalidTransition` when no payment attempt has been started
    pub fn confirm(
        &mut self,
        booking_reference: String,
        transaction_id: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<BookingConfirmation> {
        let step = self.kind();
        let BookingStep::Payment {
            request,
            quote,
            in_flight: true,
            ..
        } = &self.step
        else {
            return Err(CoreError::InvalidTransition {
                step,
                action: "confirm a booking",
            });
        };

        let transaction_id = transaction_id.trim();
        if transaction_id.is_empty() {
            return Err(CoreError::MissingTransactionId);
        }

        let confirmation = BookingConfirmation {
            booking_reference,
            transaction_id: transaction_id.to_string(),
            confirmed_at: now,
        };
        self.step = BookingStep::Confirmation {
            request: request.clone(),
            quote: quote.clone(),
            confirmation: confirmation.clone(),
        };
        Ok(confirmation)
    }

    // -------------------------------------------------------------------------
    // Leaving the flow
    // -------------------------------------------------------------------------

    /// Returns to the form with the submitted fields retained.
    ///
    /// Allowed from Verification (closing the code dialog abandons the
    /// challenge) and from Payment. The request and quote are discarded.
    pub fn cancel(&mut self) -> CoreResult<()> {
        match &self.step {
            BookingStep::Verification { form, .. } | BookingStep::Payment { form, .. } => {
                self.step = BookingStep::Form { form: form.clone() };
                Ok(())
            }
            _ => Err(self.invalid("cancel")),
        }
    }

    /// Discards everything and starts over on an empty form.
    pub fn reset(&mut self) {
        self.step = BookingStep::Form {
            form: BookingForm::default(),
        };
    }
}

impl Default for BookingFlow {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
