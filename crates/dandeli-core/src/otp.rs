//! # One-Time Passcode Module
//!
//! Phone verification for the booking flow.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────┐  send_code   ┌──────┐  verify_code(match)   ┌──────────┐    │
//! │   │ Idle │─────────────►│ Sent │──────────────────────►│ Verified │    │
//! │   └──────┘              └──┬───┘                       └──────────┘    │
//! │                            │  ▲                                         │
//! │        verify_code(miss)   │  │  resend_code (countdown at zero)        │
//! │        stays Sent ─────────┘  │                                         │
//! │                            │  │                                         │
//! │          ┌─────────────────┼──┴──────────────────┐                      │
//! │          ▼                 ▼                     │                      │
//! │   ┌─────────┐       ┌─────────┐                  │                      │
//! │   │ Failed  │       │ Expired │──────────────────┘                      │
//! │   └─────────┘       └─────────┘                                         │
//! │   (lockout, only                                                        │
//! │    if max_attempts)                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one challenge is active. Sending a new code replaces the old
//!   one, which can never verify again.
//! - A challenge verifies at most once; success destroys it.
//!
//! The verifier does not read the clock or own a random source. Callers pass
//! `now` and an RNG, which keeps every transition reproducible in tests.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::OtpError;

// =============================================================================
// Settings
// =============================================================================

/// Tunables for phone verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpSettings {
    /// Number of digits in a code.
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Seconds before a code expires and resend unlocks.
    #[serde(default = "default_expiry_secs")]
    pub expiry_secs: u32,

    /// Wrong guesses allowed per challenge. `None` means unlimited.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

fn default_code_length() -> usize {
    6
}

fn default_expiry_secs() -> u32 {
    60
}

impl Default for OtpSettings {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            expiry_secs: default_expiry_secs(),
            max_attempts: None,
        }
    }
}

// =============================================================================
// Status
// =============================================================================

/// Where phone verification stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum OtpStatus {
    /// No code has been requested.
    Idle,
    /// A code is out and can be verified.
    Sent,
    /// The guest entered the right code.
    Verified,
    /// Too many wrong codes for the last challenge.
    Failed,
    /// The last code ran out of time.
    Expired,
}

// =============================================================================
// Challenge
// =============================================================================

/// The single code currently accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationChallenge {
    code: String,
    issued_at: DateTime<Utc>,
    expiry_secs: u32,
    attempts: u32,
}

impl VerificationChallenge {
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Wrong guesses so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + Duration::seconds(i64::from(self.expiry_secs))
    }

    /// Whole seconds left, rounded up, so zero only once the code has expired.
    fn remaining_secs(&self, now: DateTime<Utc>) -> u32 {
        let left_ms = (self.expires_at() - now).num_milliseconds();
        if left_ms <= 0 {
            return 0;
        }
        let left = (left_ms + 999) / 1000;
        left.min(i64::from(self.expiry_secs)) as u32
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

// =============================================================================
// Verifier
// =============================================================================

/// Issues and checks one-time passcodes for a single phone number.
#[derive(Debug, Clone)]
pub struct OtpVerifier {
    settings: OtpSettings,
    status: OtpStatus,
    challenge: Option<VerificationChallenge>,
    phone: Option<String>,
}

impl OtpVerifier {
    pub fn new(settings: OtpSettings) -> Self {
        Self {
            settings,
            status: OtpStatus::Idle,
            challenge: None,
            phone: None,
        }
    }

    pub fn settings(&self) -> &OtpSettings {
        &self.settings
    }

    /// Current status as last recorded. See [`Self::poll`] to apply expiry.
    pub fn status(&self) -> OtpStatus {
        self.status
    }

    /// Phone number the last code was sent to.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn challenge(&self) -> Option<&VerificationChallenge> {
        self.challenge.as_ref()
    }

    pub fn is_verified(&self) -> bool {
        self.status == OtpStatus::Verified
    }

    /// Issues a fresh code for `phone` and returns it for delivery.
    ///
    /// Any previous challenge is discarded.
    pub fn send_code<R: Rng + ?Sized>(
        &mut self,
        phone: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> String {
        let code = generate_code(self.settings.code_length, rng);
        self.challenge = Some(VerificationChallenge {
            code: code.clone(),
            issued_at: now,
            expiry_secs: self.settings.expiry_secs,
            attempts: 0,
        });
        self.phone = Some(phone.to_string());
        self.status = OtpStatus::Sent;
        code
    }

    /// Replaces the active challenge, once the countdown has reached zero.
    ///
    /// ## Errors
    /// `ResendUnavailable` while the current code is still live.
    pub fn resend_code<R: Rng + ?Sized>(
        &mut self,
        phone: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<String, OtpError> {
        let remaining = self.remaining_secs(now);
        if remaining > 0 {
            return Err(OtpError::ResendUnavailable {
                remaining_secs: remaining,
            });
        }
        Ok(self.send_code(phone, now, rng))
    }

    /// Checks `input` against the active challenge.
    ///
    /// ## Errors
    /// - `NoActiveChallenge` if nothing was sent or the code was already used
    /// - `Expired` once the countdown is over
    /// - `Mismatch` on a wrong code (the challenge stays active)
    /// - `LockedOut` when `max_attempts` is set and reached
    pub fn verify_code(&mut self, input: &str, now: DateTime<Utc>) -> Result<(), OtpError> {
        self.poll(now);

        let challenge = match (self.status, self.challenge.as_mut()) {
            (OtpStatus::Sent, Some(challenge)) => challenge,
            (OtpStatus::Expired, _) => return Err(OtpError::Expired),
            _ => return Err(OtpError::NoActiveChallenge),
        };

        if input == challenge.code {
            self.challenge = None;
            self.status = OtpStatus::Verified;
            return Ok(());
        }

        challenge.attempts += 1;
        let attempts = challenge.attempts;

        if let Some(max) = self.settings.max_attempts {
            if attempts >= max {
                self.challenge = None;
                self.status = OtpStatus::Failed;
                return Err(OtpError::LockedOut { attempts });
            }
        }

        Err(OtpError::Mismatch { attempts })
    }

    /// Seconds left on the resend countdown (zero when resend is allowed).
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u32 {
        match (&self.challenge, self.status) {
            (Some(challenge), OtpStatus::Sent) => challenge.remaining_secs(now),
            _ => 0,
        }
    }

    pub fn can_resend(&self, now: DateTime<Utc>) -> bool {
        self.remaining_secs(now) == 0
    }

    /// Applies expiry as of `now` and returns the resulting status.
    pub fn poll(&mut self, now: DateTime<Utc>) -> OtpStatus {
        if self.status == OtpStatus::Sent
            && self.challenge.as_ref().is_some_and(|c| c.is_expired(now))
        {
            self.challenge = None;
            self.status = OtpStatus::Expired;
        }
        self.status
    }

    /// Forgets the challenge and phone number.
    pub fn reset(&mut self) {
        self.status = OtpStatus::Idle;
        self.challenge = None;
        self.phone = None;
    }
}

impl Default for OtpVerifier {
    fn default() -> Self {
        Self::new(OtpSettings::default())
    }
}

/// Uniformly random string of `length` decimal digits.
pub fn generate_code<R: Rng + ?Sized>(length: usize, rng: &mut R) -> String {
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
