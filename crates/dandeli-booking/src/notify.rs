//! # Notifications
//!
//! The email/SMS collaborator seam and a console implementation.
//!
//! Delivery is best effort. The coordinator logs a failed message and carries
//! on; a booking is never rolled back because a notification did not go out.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::NotifyError;

// =============================================================================
// Notifier Trait
// =============================================================================

/// Sends email and text messages on behalf of the resort.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends an HTML email.
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;

    /// Sends a text message.
    async fn send_sms(&self, to: &str, message: &str) -> Result<(), NotifyError>;
}

// =============================================================================
// Console Notifier
// =============================================================================

/// Logs messages instead of sending them.
///
/// Useful for development and the demo website, where no mail or SMS
/// provider is configured. Always succeeds.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier {
    latency: Duration,
}

impl ConsoleNotifier {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Creates an Arc-wrapped instance for sharing.
    pub fn shared(latency: Duration) -> Arc<dyn Notifier> {
        Arc::new(Self::new(latency))
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        tokio::time::sleep(self.latency).await;
        info!(
            to = %to,
            subject = %subject,
            body_len = body.len(),
            "Email (console delivery)"
        );
        Ok(())
    }

    async fn send_sms(&self, to: &str, message: &str) -> Result<(), NotifyError> {
        tokio::time::sleep(self.latency).await;
        info!(to = %to, message = %message, "SMS (console delivery)");
        Ok(())
    }
}
