//! # Booking Configuration
//!
//! Configuration management for the booking coordinator.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     DANDELI_OPERATOR_EMAIL=desk@dandeliadventures.com                  │
//! │     DANDELI_REQUIRE_PHONE_VERIFICATION=true                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/booking/booking.toml (Linux)                             │
//! │     ~/Library/Application Support/com.dandeli.booking/booking.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     INR, 6 digit codes valid for 60 s, four promo codes                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # booking.toml
//! [resort]
//! name = "Dandeli Adventures"
//! operator_email = "bookings@dandeliadventures.com"
//! contact_phone = "+91 9876543210"
//! currency = "INR"
//!
//! [otp]
//! code_length = 6
//! expiry_secs = 60
//! max_attempts = 5     # omit for unlimited attempts
//!
//! [flow]
//! require_phone_verification = true
//!
//! [promo]
//! SUMMER25 = 25
//! MONSOON20 = 20
//!
//! [simulation]
//! payment_latency_ms = 2000
//! notify_latency_ms = 0
//! ```

use dandeli_core::validation::validate_email;
use dandeli_core::{BookingFlow, OtpSettings, PromoTable};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{BookingError, BookingResult};

// =============================================================================
// Resort Settings
// =============================================================================

/// Who the resort is and where booking notifications go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResortSettings {
    /// Name used in message subjects and signatures.
    #[serde(default = "default_resort_name")]
    pub name: String,

    /// Address that receives a copy of every booking.
    #[serde(default = "default_operator_email")]
    pub operator_email: String,

    /// Phone number printed in confirmation messages.
    #[serde(default = "default_contact_phone")]
    pub contact_phone: String,

    /// Postal address printed in the email footer.
    #[serde(default = "default_address")]
    pub address: String,

    /// ISO 4217 code sent to the payment collaborator.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_resort_name() -> String {
    "Dandeli Adventures".to_string()
}

fn default_operator_email() -> String {
    "bookings@dandeliadventures.com".to_string()
}

fn default_contact_phone() -> String {
    "+91 9876543210".to_string()
}

fn default_address() -> String {
    "Kali River Front, Dandeli, Karnataka 581325, India".to_string()
}

fn default_currency() -> String {
    dandeli_core::DEFAULT_CURRENCY.to_string()
}

impl Default for ResortSettings {
    fn default() -> Self {
        ResortSettings {
            name: default_resort_name(),
            operator_email: default_operator_email(),
            contact_phone: default_contact_phone(),
            address: default_address(),
            currency: default_currency(),
        }
    }
}

// =============================================================================
// Flow Settings
// =============================================================================

/// Which optional steps the booking page shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSettings {
    /// Ask for a one-time passcode before payment.
    #[serde(default)]
    pub require_phone_verification: bool,
}

// =============================================================================
// Simulation Settings
// =============================================================================

/// Artificial latency of the simulated collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "default_payment_latency")]
    pub payment_latency_ms: u64,

    #[serde(default)]
    pub notify_latency_ms: u64,
}

fn default_payment_latency() -> u64 {
    2000
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            payment_latency_ms: default_payment_latency(),
            notify_latency_ms: 0,
        }
    }
}

impl SimulationSettings {
    pub fn payment_latency(&self) -> Duration {
        Duration::from_millis(self.payment_latency_ms)
    }

    pub fn notify_latency(&self) -> Duration {
        Duration::from_millis(self.notify_latency_ms)
    }
}

// =============================================================================
// Main Booking Configuration
// =============================================================================

/// Complete booking configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    #[serde(default)]
    pub resort: ResortSettings,

    /// Phone verification tunables.
    #[serde(default)]
    pub otp: OtpSettings,

    #[serde(default)]
    pub flow: FlowSettings,

    /// Promo code table. Replaces the built-in codes when present.
    #[serde(default)]
    pub promo: PromoTable,

    #[serde(default)]
    pub simulation: SimulationSettings,
}

impl BookingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (booking.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> BookingResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading booking config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load booking config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> BookingResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| BookingError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| BookingError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| BookingError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Booking config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> BookingResult<()> {
        if validate_email(&self.resort.operator_email).is_err() {
            return Err(BookingError::InvalidConfig(format!(
                "operator_email is not a valid address: '{}'",
                self.resort.operator_email
            )));
        }

        let currency = &self.resort.currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(BookingError::InvalidConfig(format!(
                "currency must be a three letter ISO code, got: '{}'",
                currency
            )));
        }

        if !(4..=10).contains(&self.otp.code_length) {
            return Err(BookingError::InvalidConfig(
                "otp.code_length must be between 4 and 10".into(),
            ));
        }

        if self.otp.expiry_secs == 0 {
            return Err(BookingError::InvalidConfig(
                "otp.expiry_secs must be greater than 0".into(),
            ));
        }

        if self.otp.max_attempts == Some(0) {
            return Err(BookingError::InvalidConfig(
                "otp.max_attempts must be greater than 0 (omit it for no limit)".into(),
            ));
        }

        let bad_codes = self.promo.invalid_codes();
        if !bad_codes.is_empty() {
            return Err(BookingError::InvalidConfig(format!(
                "promo percentages must be between 1 and 100: {}",
                bad_codes.join(", ")
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(email) = lookup("DANDELI_OPERATOR_EMAIL") {
            debug!(operator_email = %email, "Overriding operator email from environment");
            self.resort.operator_email = email;
        }

        if let Some(currency) = lookup("DANDELI_CURRENCY") {
            self.resort.currency = currency.to_uppercase();
        }

        if let Some(flag) = lookup("DANDELI_REQUIRE_PHONE_VERIFICATION") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.flow.require_phone_verification = true,
                "0" | "false" | "no" => self.flow.require_phone_verification = false,
                _ => warn!(value = %flag, "Unknown DANDELI_REQUIRE_PHONE_VERIFICATION value"),
            }
        }

        if let Some(secs) = lookup("DANDELI_OTP_EXPIRY_SECS") {
            if let Ok(s) = secs.parse::<u32>() {
                debug!(expiry_secs = s, "Overriding OTP expiry from environment");
                self.otp.expiry_secs = s;
            }
        }

        if let Some(max) = lookup("DANDELI_OTP_MAX_ATTEMPTS") {
            if let Ok(m) = max.parse::<u32>() {
                self.otp.max_attempts = Some(m);
            }
        }

        if let Some(ms) = lookup("DANDELI_PAYMENT_LATENCY_MS") {
            if let Ok(ms) = ms.parse::<u64>() {
                self.simulation.payment_latency_ms = ms;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "dandeli", "booking")
            .map(|dirs| dirs.config_dir().join("booking.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// A fresh booking flow with these settings.
    pub fn build_flow(&self) -> BookingFlow {
        let flow = BookingFlow::new().with_promos(self.promo.clone());
        if self.flow.require_phone_verification {
            flow.with_phone_verification(self.otp.clone())
        } else {
            flow
        }
    }

    pub fn operator_email(&self) -> &str {
        &self.resort.operator_email
    }

    pub fn currency(&self) -> &str {
        &self.resort.currency
    }
}
