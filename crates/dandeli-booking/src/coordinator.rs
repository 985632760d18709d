//! # Booking Coordinator
//!
//! Drives one guest's booking from the submitted form to a confirmation.
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BookingCoordinator                               │
//! │                                                                         │
//! │  1. Guest fills the form        form_mut(), preview_quote()            │
//! │  2. Guest submits               submit()                               │
//! │       └─ verification on? ──►   code sent by SMS automatically         │
//! │  3. Guest types the code        verify_code() / resend_code()          │
//! │  4. Guest pays                  pay(method)                            │
//! │       ├─ gateway refuses   ──►  stays on Payment, error shown          │
//! │       └─ gateway accepts   ──►  Confirmation                           │
//! │                                   ├─ email to the resort               │
//! │                                   ├─ email to the guest                │
//! │                                   └─ SMS to the guest (if phone)       │
//! │  5. "Make another booking"      reset()                                │
//! │                                                                         │
//! │  cancel() at step 3 or 4 returns to the form with the fields kept.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! The coordinator owns its [`BookingFlow`]. Every mutating operation takes
//! `&mut self`, so a second payment cannot start while one is in flight.
//! Collaborator calls are awaited one at a time with no timeout.

use chrono::{DateTime, Utc};
use dandeli_core::reference::booking_reference;
use dandeli_core::{
    BookingConfirmation, BookingFlow, BookingForm, BookingRequest, CoreError, OtpError,
    OtpStatus, PaymentMethod, PricingQuote, StepKind,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::BookingConfig;
use crate::error::{BookingResult, PaymentError};
use crate::gateway::{PaymentGateway, PaymentRequest, SimulatedGateway};
use crate::notify::{ConsoleNotifier, Notifier};
use crate::templates::{self, BookingMessage};

/// Shown when the booking went through but a confirmation message did not.
pub const NOTIFICATION_WARNING: &str =
    "Booking succeeded, notification may be delayed. Please note your booking reference.";

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

// =============================================================================
// Booking Outcome
// =============================================================================

/// Result of a successful payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingOutcome {
    pub confirmation: BookingConfirmation,
    pub request: BookingRequest,
    pub quote: PricingQuote,
    /// Set when at least one confirmation message could not be sent.
    pub notification_warning: Option<String>,
    /// One line per message that failed.
    pub failed_notifications: Vec<String>,
}

impl BookingOutcome {
    pub fn fully_notified(&self) -> bool {
        self.failed_notifications.is_empty()
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// One guest session on the booking page.
pub struct BookingCoordinator {
    session_id: Uuid,
    flow: BookingFlow,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
    config: Arc<BookingConfig>,
    rng: StdRng,
    clock: Clock,
}

impl BookingCoordinator {
    pub fn new(
        config: Arc<BookingConfig>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let session_id = Uuid::new_v4();
        debug!(
            %session_id,
            verification = config.flow.require_phone_verification,
            "Booking session started"
        );

        Self {
            session_id,
            flow: config.build_flow(),
            gateway,
            notifier,
            config,
            rng: StdRng::from_entropy(),
            clock: Arc::new(Utc::now),
        }
    }

    /// Coordinator backed by the simulated gateway and console notifier.
    pub fn simulated(config: BookingConfig) -> Self {
        let gateway = SimulatedGateway::shared(config.simulation.payment_latency());
        let notifier = ConsoleNotifier::shared(config.simulation.notify_latency());
        Self::new(Arc::new(config), gateway, notifier)
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Makes verification codes reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn flow(&self) -> &BookingFlow {
        &self.flow
    }

    pub fn kind(&self) -> StepKind {
        self.flow.kind()
    }

    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    // =========================================================================
    // Form
    // =========================================================================

    pub fn form_mut(&mut self) -> BookingResult<&mut BookingForm> {
        Ok(self.flow.form_mut()?)
    }

    pub fn preview_quote(&self) -> Option<PricingQuote> {
        self.flow.preview_quote()
    }

    /// Validates the form and advances.
    ///
    /// When phone verification is on, the first code is sent right away.
    pub async fn submit(&mut self) -> BookingResult<StepKind> {
        let step = match self.flow.submit() {
            Ok(step) => step,
            Err(e) => {
                if let CoreError::Validation(errors) = &e {
                    debug!(
                        session_id = %self.session_id,
                        errors = errors.len(),
                        "Booking form rejected"
                    );
                }
                return Err(e.into());
            }
        };

        info!(session_id = %self.session_id, next = %step, "Booking form submitted");

        if step == StepKind::Verification {
            self.send_code().await?;
        }
        Ok(step)
    }

    // =========================================================================
    // Verification
    // =========================================================================

    /// Issues the first code on entering Verification and texts it.
    async fn send_code(&mut self) -> BookingResult<()> {
        let now = self.now();
        let (phone, code) = self.flow.send_code(now, &mut self.rng)?;
        self.deliver_code(&phone, &code).await;
        Ok(())
    }

    /// Replaces the code once the countdown has run out.
    pub async fn resend_code(&mut self) -> BookingResult<()> {
        let now = self.now();
        let (phone, code) = self.flow.resend_code(now, &mut self.rng)?;
        info!(session_id = %self.session_id, "Verification code resent");
        self.deliver_code(&phone, &code).await;
        Ok(())
    }

    async fn deliver_code(&self, phone: &str, code: &str) {
        let expiry = self.config.otp.expiry_secs;
        let text = templates::otp_sms(&self.config.resort, code, expiry);

        if let Err(e) = self.notifier.send_sms(phone, &text).await {
            // The guest can still resend once the countdown ends
            warn!(session_id = %self.session_id, error = %e, "Failed to deliver verification code");
        }
    }

    /// Checks the code the guest typed.
    pub fn verify_code(&mut self, input: &str) -> BookingResult<()> {
        let now = self.now();
        match self.flow.verify_code(input, now) {
            Ok(()) => {
                info!(session_id = %self.session_id, "Phone number verified");
                Ok(())
            }
            Err(e) => {
                match &e {
                    CoreError::Verification(OtpError::Mismatch { attempts }) => {
                        warn!(session_id = %self.session_id, attempts, "Verification code mismatch");
                    }
                    CoreError::Verification(OtpError::LockedOut { attempts }) => {
                        warn!(session_id = %self.session_id, attempts, "Verification locked out");
                    }
                    CoreError::Verification(OtpError::Expired) => {
                        debug!(session_id = %self.session_id, "Verification code expired");
                    }
                    _ => {}
                }
                Err(e.into())
            }
        }
    }

    /// Seconds until the code expires and resend unlocks.
    pub fn code_remaining_secs(&self) -> Option<u32> {
        let now = self.now();
        self.flow.verifier().map(|v| v.remaining_secs(now))
    }

    pub fn can_resend(&self) -> bool {
        let now = self.now();
        self.flow.verifier().is_some_and(|v| v.can_resend(now))
    }

    pub fn verification_status(&self) -> Option<OtpStatus> {
        self.flow.verifier().map(|v| v.status())
    }

    // =========================================================================
    // Payment
    // =========================================================================

    /// Charges the guest and, on success, confirms and notifies.
    ///
    /// ## Errors
    /// - `Payment` when the gateway refuses; the flow stays on Payment
    /// - `Flow(VerificationRequired)` before the phone is verified
    /// - `Flow(InvalidTransition)` outside the Payment step
    pub async fn pay(&mut self, method: PaymentMethod) -> BookingResult<BookingOutcome> {
        let attempt = self.flow.start_payment()?;
        let reference = booking_reference(self.now());

        if let Some(previous) = &attempt.previous_error {
            warn!(
                session_id = %self.session_id,
                attempt = attempt.attempt,
                previous_error = %previous,
                "Resubmitting payment without an idempotency key; a lost response may cause a double charge"
            );
        }

        let request = PaymentRequest {
            amount: attempt.quote.final_amount,
            currency: self.config.currency().to_string(),
            method: method.clone(),
            description: format!("Booking for {} room", attempt.request.room_category),
            metadata: payment_metadata(&attempt.request, &reference, attempt.attempt),
        };

        info!(
            session_id = %self.session_id,
            booking_reference = %reference,
            amount = %attempt.quote.final_amount,
            method = method.code(),
            attempt = attempt.attempt,
            "Processing payment"
        );

        let receipt = match self.gateway.process_payment(request).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(session_id = %self.session_id, error = %e, "Payment failed");
                self.flow.record_payment_failure(e.to_string())?;
                return Err(e.into());
            }
        };

        let confirmed_at = self.now();
        let confirmation = match self
            .flow
            .confirm(reference, &receipt.transaction_id, confirmed_at)
        {
            Ok(confirmation) => confirmation,
            Err(CoreError::MissingTransactionId) => {
                error!(session_id = %self.session_id, "Gateway accepted payment without a transaction id");
                let err = PaymentError::Unavailable {
                    detail: "missing transaction id".to_string(),
                };
                self.flow.record_payment_failure(err.to_string())?;
                return Err(err.into());
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            session_id = %self.session_id,
            booking_reference = %confirmation.booking_reference,
            transaction_id = %confirmation.transaction_id,
            "Booking confirmed"
        );

        let failed_notifications = self
            .notify_confirmation(&attempt.request, &attempt.quote, &confirmation, &method)
            .await;
        let notification_warning =
            (!failed_notifications.is_empty()).then(|| NOTIFICATION_WARNING.to_string());

        Ok(BookingOutcome {
            confirmation,
            request: attempt.request,
            quote: attempt.quote,
            notification_warning,
            failed_notifications,
        })
    }

    /// Sends the confirmation messages one after another.
    ///
    /// Returns a line for every message that failed.
    async fn notify_confirmation(
        &self,
        request: &BookingRequest,
        quote: &PricingQuote,
        confirmation: &BookingConfirmation,
        method: &PaymentMethod,
    ) -> Vec<String> {
        let msg = BookingMessage {
            request,
            quote,
            confirmation,
            method,
            resort: &self.config.resort,
        };
        let body = templates::booking_email(&msg);
        let mut failures = Vec::new();

        let operator = self.config.operator_email();
        if let Err(e) = self
            .notifier
            .send_email(operator, &templates::operator_subject(&msg), &body)
            .await
        {
            warn!(session_id = %self.session_id, error = %e, "Operator notification failed");
            failures.push(e.to_string());
        }

        if let Err(e) = self
            .notifier
            .send_email(&request.email, &templates::guest_subject(msg.resort), &body)
            .await
        {
            warn!(session_id = %self.session_id, error = %e, "Guest confirmation email failed");
            failures.push(e.to_string());
        }

        if request.has_phone() {
            if let Err(e) = self
                .notifier
                .send_sms(&request.phone, &templates::booking_sms(&msg))
                .await
            {
                warn!(session_id = %self.session_id, error = %e, "Guest confirmation SMS failed");
                failures.push(e.to_string());
            }
        }

        failures
    }

    // =========================================================================
    // Leaving the flow
    // =========================================================================

    /// Back to the form with the guest's fields kept.
    pub fn cancel(&mut self) -> BookingResult<()> {
        let from = self.kind();
        self.flow.cancel()?;
        info!(session_id = %self.session_id, from = %from, "Booking cancelled");
        Ok(())
    }

    /// Starts a new booking on an empty form.
    pub fn reset(&mut self) {
        self.flow.reset();
        debug!(session_id = %self.session_id, "Booking flow reset");
    }
}

fn payment_metadata(
    request: &BookingRequest,
    reference: &str,
    attempt: u32,
) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("guestName".to_string(), request.guest_name.clone()),
        ("checkInDate".to_string(), request.check_in.to_string()),
        ("roomType".to_string(), request.room_category.clone()),
        ("bookingReference".to_string(), reference.to_string()),
        ("attempt".to_string(), attempt.to_string()),
    ])
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BookingError, NotifyError};
    use crate::gateway::PaymentReceipt;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use dandeli_core::{Money, OtpSettings};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    struct FakeGateway {
        responses: Mutex<VecDeque<Result<PaymentReceipt, PaymentError>>>,
        requests: Mutex<Vec<PaymentRequest>>,
    }

    impl FakeGateway {
        fn with(responses: Vec<Result<PaymentReceipt, PaymentError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<PaymentRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn process_payment(
            &self,
            request: PaymentRequest,
        ) -> Result<PaymentReceipt, PaymentError> {
            let amount = request.amount;
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Ok(PaymentReceipt {
                        transaction_id: "TXNDEFAULT".to_string(),
                        amount,
                    })
                })
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Sent {
        Email { to: String, subject: String },
        Sms { to: String, message: String },
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<Sent>>,
        fail_email: bool,
        fail_sms: bool,
    }

    impl RecordingNotifier {
        fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }

        fn last_sms(&self) -> Option<String> {
            self.sent().into_iter().rev().find_map(|s| match s {
                Sent::Sms { message, .. } => Some(message),
                _ => None,
            })
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_email(&self, to: &str, subject: &str, _body: &str) -> Result<(), NotifyError> {
            if self.fail_email {
                return Err(NotifyError::EmailFailed {
                    to: to.to_string(),
                    reason: "smtp down".to_string(),
                });
            }
            self.sent.lock().unwrap().push(Sent::Email {
                to: to.to_string(),
                subject: subject.to_string(),
            });
            Ok(())
        }

        async fn send_sms(&self, to: &str, message: &str) -> Result<(), NotifyError> {
            if self.fail_sms {
                return Err(NotifyError::SmsFailed {
                    to: to.to_string(),
                    reason: "no signal".to_string(),
                });
            }
            self.sent.lock().unwrap().push(Sent::Sms {
                to: to.to_string(),
                message: message.to_string(),
            });
            Ok(())
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 8, 30, 0).unwrap()
    }

    fn receipt(id: &str) -> Result<PaymentReceipt, PaymentError> {
        Ok(PaymentReceipt {
            transaction_id: id.to_string(),
            amount: Money::zero(),
        })
    }

    fn coordinator(
        config: BookingConfig,
        gateway: Arc<FakeGateway>,
        notifier: Arc<RecordingNotifier>,
    ) -> BookingCoordinator {
        BookingCoordinator::new(Arc::new(config), gateway, notifier)
            .with_clock(start)
            .with_rng_seed(7)
    }

    fn fill_jane_doe(coordinator: &mut BookingCoordinator) {
        let tomorrow = start().date_naive() + Duration::days(1);
        let form = coordinator.form_mut().unwrap();
        form.name = "Jane Doe".to_string();
        form.email = "jane@x.com".to_string();
        form.phone = "+919876543210".to_string();
        form.adults = "2".to_string();
        form.children = "0".to_string();
        form.check_in = Some(tomorrow);
        form.check_out = Some(tomorrow + Duration::days(2));
        form.room_category = "standard".to_string();
    }

    fn card() -> PaymentMethod {
        PaymentMethod::Card {
            number: "4111 1111 1111 1111".to_string(),
            holder: "Jane Doe".to_string(),
            expiry: "12/28".to_string(),
            cvv: "123".to_string(),
        }
    }

    // -------------------------------------------------------------------------
    // Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_jane_doe_books_end_to_end() {
        let gateway = FakeGateway::with(vec![receipt("TXNMG7Q2X3F")]);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut coordinator =
            coordinator(BookingConfig::default(), gateway.clone(), notifier.clone());

        fill_jane_doe(&mut coordinator);
        assert_eq!(coordinator.submit().await.unwrap(), StepKind::Payment);

        let outcome = coordinator.pay(card()).await.unwrap();
        assert_eq!(coordinator.kind(), StepKind::Confirmation);
        assert!(outcome.confirmation.booking_reference.starts_with("BK"));
        assert_eq!(outcome.confirmation.transaction_id, "TXNMG7Q2X3F");
        assert_eq!(outcome.quote.final_amount.rupees(), 140);
        assert!(outcome.fully_notified());
        assert_eq!(outcome.notification_warning, None);

        let requests = gateway.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].currency, "INR");
        assert_eq!(requests[0].description, "Booking for standard room");
        assert_eq!(requests[0].metadata["guestName"], "Jane Doe");
        assert_eq!(requests[0].metadata["checkInDate"], "2026-10-18");
        assert_eq!(requests[0].metadata["attempt"], "1");

        let sent = notifier.sent();
        assert_eq!(sent.len(), 3);
        assert!(matches!(
            &sent[0],
            Sent::Email { to, subject } if to == "bookings@dandeliadventures.com"
                && subject.starts_with("New Booking: Jane Doe")
        ));
        assert!(matches!(&sent[1], Sent::Email { to, .. } if to == "jane@x.com"));
        assert!(matches!(&sent[2], Sent::Sms { to, .. } if to == "+919876543210"));
    }

    #[tokio::test]
    async fn test_notification_failure_is_soft() {
        let gateway = FakeGateway::with(vec![receipt("TXN1")]);
        let notifier = Arc::new(RecordingNotifier {
            fail_email: true,
            ..Default::default()
        });
        let mut coordinator = coordinator(BookingConfig::default(), gateway, notifier.clone());

        fill_jane_doe(&mut coordinator);
        coordinator.submit().await.unwrap();
        let outcome = coordinator.pay(PaymentMethod::BankTransfer).await.unwrap();

        assert_eq!(coordinator.kind(), StepKind::Confirmation);
        assert_eq!(outcome.failed_notifications.len(), 2);
        assert_eq!(
            outcome.notification_warning.as_deref(),
            Some(NOTIFICATION_WARNING)
        );
        // SMS still goes out after the emails fail
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_payment_failure_stays_on_payment() {
        let gateway = FakeGateway::with(vec![
            Err(PaymentError::InvalidCardNumber),
            receipt("TXN2"),
        ]);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut coordinator =
            coordinator(BookingConfig::default(), gateway.clone(), notifier.clone());

        fill_jane_doe(&mut coordinator);
        coordinator.submit().await.unwrap();

        let err = coordinator.pay(card()).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::Payment(PaymentError::InvalidCardNumber)
        ));
        assert_eq!(coordinator.kind(), StepKind::Payment);
        assert_eq!(
            coordinator.flow().last_payment_error(),
            Some("Invalid card number")
        );
        assert!(notifier.sent().is_empty());

        let outcome = coordinator.pay(card()).await.unwrap();
        assert_eq!(outcome.confirmation.transaction_id, "TXN2");
        assert_eq!(gateway.requests()[1].metadata["attempt"], "2");
    }

    #[tokio::test]
    async fn test_blank_transaction_id_is_a_failure() {
        let gateway = FakeGateway::with(vec![receipt("   ")]);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut coordinator = coordinator(BookingConfig::default(), gateway, notifier);

        fill_jane_doe(&mut coordinator);
        coordinator.submit().await.unwrap();

        let err = coordinator.pay(card()).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::Payment(PaymentError::Unavailable { .. })
        ));
        assert_eq!(coordinator.kind(), StepKind::Payment);
    }

    #[tokio::test]
    async fn test_cancel_retains_fields() {
        let mut coordinator = coordinator(
            BookingConfig::default(),
            FakeGateway::with(vec![]),
            Arc::new(RecordingNotifier::default()),
        );

        fill_jane_doe(&mut coordinator);
        coordinator.submit().await.unwrap();
        coordinator.cancel().unwrap();

        assert_eq!(coordinator.kind(), StepKind::Form);
        assert!(coordinator.flow().quote().is_none());
        let form = coordinator.form_mut().unwrap();
        assert_eq!(form.name, "Jane Doe");
        assert_eq!(form.adults, "2");
    }

    #[tokio::test]
    async fn test_invalid_form_is_rejected() {
        let gateway = FakeGateway::with(vec![]);
        let mut coordinator = coordinator(
            BookingConfig::default(),
            gateway.clone(),
            Arc::new(RecordingNotifier::default()),
        );

        fill_jane_doe(&mut coordinator);
        coordinator.form_mut().unwrap().email = "jane".to_string();

        let err = coordinator.submit().await.unwrap_err();
        assert!(err.is_user_correctable());
        assert_eq!(coordinator.kind(), StepKind::Form);
        assert!(coordinator.pay(card()).await.is_err());
        assert!(gateway.requests().is_empty());
    }

    #[tokio::test]
    async fn test_verification_path() {
        let mut config = BookingConfig::default();
        config.flow.require_phone_verification = true;
        let gateway = FakeGateway::with(vec![receipt("TXN3")]);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut coordinator = coordinator(config, gateway, notifier.clone());

        fill_jane_doe(&mut coordinator);
        assert_eq!(coordinator.submit().await.unwrap(), StepKind::Verification);
        assert_eq!(coordinator.verification_status(), Some(OtpStatus::Sent));
        assert_eq!(coordinator.code_remaining_secs(), Some(60));
        assert!(!coordinator.can_resend());

        // Payment is refused until the phone is verified
        assert!(matches!(
            coordinator.pay(card()).await,
            Err(BookingError::Flow(CoreError::VerificationRequired))
        ));

        let sms = notifier.last_sms().unwrap();
        let code: String = sms.chars().take(6).collect();
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        assert!(coordinator.verify_code("000000x").is_err());
        assert_eq!(coordinator.kind(), StepKind::Verification);

        coordinator.verify_code(&code).unwrap();
        assert_eq!(coordinator.kind(), StepKind::Payment);

        coordinator.pay(PaymentMethod::BankTransfer).await.unwrap();
        assert_eq!(coordinator.kind(), StepKind::Confirmation);
    }

    #[tokio::test]
    async fn test_code_expiry_and_resend() {
        let mut config = BookingConfig::default();
        config.flow.require_phone_verification = true;
        let notifier = Arc::new(RecordingNotifier::default());

        let clock = Arc::new(Mutex::new(start()));
        let handle = clock.clone();
        let mut coordinator = BookingCoordinator::new(
            Arc::new(config),
            FakeGateway::with(vec![]),
            notifier.clone(),
        )
        .with_clock(move || *handle.lock().unwrap())
        .with_rng_seed(11);

        fill_jane_doe(&mut coordinator);
        coordinator.submit().await.unwrap();
        let first: String = notifier.last_sms().unwrap().chars().take(6).collect();

        assert!(coordinator.resend_code().await.is_err());

        *clock.lock().unwrap() = start() + Duration::seconds(61);
        assert!(matches!(
            coordinator.verify_code(&first),
            Err(BookingError::Flow(CoreError::Verification(OtpError::Expired)))
        ));
        assert!(coordinator.can_resend());

        coordinator.resend_code().await.unwrap();
        let second: String = notifier.last_sms().unwrap().chars().take(6).collect();
        coordinator.verify_code(&second).unwrap();
        assert_eq!(coordinator.kind(), StepKind::Payment);
    }

    #[tokio::test]
    async fn test_code_delivery_failure_is_not_fatal() {
        let mut config = BookingConfig::default();
        config.flow.require_phone_verification = true;
        let notifier = Arc::new(RecordingNotifier {
            fail_sms: true,
            ..Default::default()
        });
        let mut coordinator = coordinator(config, FakeGateway::with(vec![]), notifier);

        fill_jane_doe(&mut coordinator);
        assert_eq!(coordinator.submit().await.unwrap(), StepKind::Verification);
    }

    #[tokio::test]
    async fn test_reset_after_confirmation() {
        let mut coordinator = coordinator(
            BookingConfig::default(),
            FakeGateway::with(vec![receipt("TXN4")]),
            Arc::new(RecordingNotifier::default()),
        );

        fill_jane_doe(&mut coordinator);
        coordinator.submit().await.unwrap();
        coordinator.pay(PaymentMethod::BankTransfer).await.unwrap();
        assert!(coordinator.cancel().is_err());

        coordinator.reset();
        assert_eq!(coordinator.kind(), StepKind::Form);
        assert_eq!(coordinator.flow().form(), Some(&BookingForm::default()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_coordinator() {
        let mut coordinator = BookingCoordinator::simulated(BookingConfig::default());
        fill_jane_doe(&mut coordinator);
        coordinator.form_mut().unwrap().promo_code = Some("SUMMER25".to_string());
        coordinator.submit().await.unwrap();

        let outcome = coordinator.pay(card()).await.unwrap();
        assert!(outcome.confirmation.transaction_id.starts_with("TXN"));
        assert_eq!(outcome.quote.final_amount.paise(), 10_500);
    }

    #[tokio::test]
    async fn test_live_code_is_not_replaced_on_submit_path() {
        let mut config = BookingConfig::default();
        config.flow.require_phone_verification = true;
        let notifier = Arc::new(RecordingNotifier::default());
        let mut coordinator = coordinator(config, FakeGateway::with(vec![]), notifier.clone());

        fill_jane_doe(&mut coordinator);
        coordinator.submit().await.unwrap();
        let live: String = notifier.last_sms().unwrap().chars().take(6).collect();

        assert!(matches!(
            coordinator.send_code().await,
            Err(BookingError::Flow(CoreError::Verification(
                OtpError::ResendUnavailable { remaining_secs: 60 }
            )))
        ));
        assert_eq!(notifier.sent().len(), 1);

        coordinator.verify_code(&live).unwrap();
        assert_eq!(coordinator.kind(), StepKind::Payment);
    }

    #[tokio::test]
    async fn test_otp_settings_flow_through() {
        let mut config = BookingConfig::default();
        config.flow.require_phone_verification = true;
        config.otp = OtpSettings {
            code_length: 4,
            expiry_secs: 30,
            max_attempts: Some(2),
        };
        let notifier = Arc::new(RecordingNotifier::default());
        let mut coordinator = coordinator(config, FakeGateway::with(vec![]), notifier.clone());

        fill_jane_doe(&mut coordinator);
        coordinator.submit().await.unwrap();

        let sms = notifier.last_sms().unwrap();
        let (code, rest) = sms.split_once(' ').unwrap();
        assert_eq!(code.len(), 4);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
        assert!(rest.contains("30 seconds"));
        assert_eq!(coordinator.code_remaining_secs(), Some(30));

        let wrong = if code == "0000" { "1111" } else { "0000" };
        assert!(matches!(
            coordinator.verify_code(wrong),
            Err(BookingError::Flow(CoreError::Verification(OtpError::Mismatch { attempts: 1 })))
        ));
        assert!(matches!(
            coordinator.verify_code(wrong),
            Err(BookingError::Flow(CoreError::Verification(OtpError::LockedOut { attempts: 2 })))
        ));
        assert_eq!(coordinator.verification_status(), Some(OtpStatus::Failed));
        assert!(coordinator.verify_code(code).is_err());
    }
}
