//! # dandeli-booking: Booking Coordinator for Dandeli Adventures
//!
//! Runs a guest's booking against the payment and messaging collaborators.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         BookingCoordinator                              │
//! │                                                                         │
//! │   owns ──► BookingFlow (dandeli-core)                                   │
//! │              Form ─► Verification ─► Payment ─► Confirmation            │
//! │                                                                         │
//! │   calls ─► Arc<dyn PaymentGateway>   SimulatedGateway (2 s, TXN ids)    │
//! │        ─► Arc<dyn Notifier>         ConsoleNotifier (logs messages)    │
//! │                                                                         │
//! │   reads ─► BookingConfig            booking.toml + DANDELI_* env vars   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`coordinator`] - Step coordinator and booking outcome
//! - [`gateway`] - Payment collaborator trait and simulated processor
//! - [`notify`] - Email/SMS collaborator trait and console delivery
//! - [`templates`] - Confirmation email, SMS and verification texts
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use dandeli_booking::{BookingConfig, BookingCoordinator};
//! use dandeli_core::PaymentMethod;
//!
//! # async fn run() -> dandeli_booking::BookingResult<()> {
//! let config = BookingConfig::load(None)?;
//! let mut booking = BookingCoordinator::simulated(config);
//!
//! let form = booking.form_mut()?;
//! form.name = "Jane Doe".to_string();
//! // ... remaining fields ...
//!
//! booking.submit().await?;
//! let outcome = booking.pay(PaymentMethod::BankTransfer).await?;
//! println!("Booked: {}", outcome.confirmation.booking_reference);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod templates;

pub use config::BookingConfig;
pub use coordinator::{BookingCoordinator, BookingOutcome, NOTIFICATION_WARNING};
pub use error::{BookingError, BookingResult, NotifyError, PaymentError};
pub use gateway::{PaymentGateway, PaymentReceipt, PaymentRequest, SimulatedGateway};
pub use notify::{ConsoleNotifier, Notifier};
