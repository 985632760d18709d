//! # Validation Module
//!
//! Booking form rules.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Booking Form Submission                            │
//! │                                                                         │
//! │  BookingForm (raw strings as typed by the guest)                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  validate_form()  ← THIS MODULE                                        │
//! │  ├── name       ≥ 2 characters (after trimming)                        │
//! │  ├── email      something@domain.tld                                   │
//! │  ├── phone      optional country prefix + 8 to 12 digits               │
//! │  ├── adults     whole number ≥ 1                                       │
//! │  ├── children   whole number ≥ 0 (blank means 0)                       │
//! │  └── dates      check-out strictly after check-in                      │
//! │           │                                                             │
//! │           ├──► Err(FormErrors)  every failing field, shown inline      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Ok(BookingRequest)  invariants hold from here on                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use dandeli_core::validation::{validate_email, validate_phone};
//!
//! assert!(validate_email("jane@x.com").is_ok());
//! assert!(validate_phone("+91 9876543210").is_ok());
//! assert!(validate_phone("12345").is_err());
//! ```

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use ts_rs::TS;

use crate::error::{FormErrors, ValidationError};
use crate::types::BookingRequest;
use crate::MIN_GUEST_NAME_CHARS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// Form field names, as reported in errors.
pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PHONE: &str = "phone";
pub const FIELD_ADULTS: &str = "adults";
pub const FIELD_CHILDREN: &str = "children";
pub const FIELD_CHECK_IN: &str = "check_in";
pub const FIELD_CHECK_OUT: &str = "check_out";
pub const FIELD_ROOM: &str = "room_category";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

// Group 1: "+CC " / "CC-" style prefix, group 2: subscriber digits.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\+?\d{1,4})[\s-]|\+)?(\d{8,12})$").expect("phone pattern compiles")
});

// =============================================================================
// Booking Form
// =============================================================================

/// The booking form exactly as the guest filled it in.
///
/// Guest counts stay strings so that a half-typed value can be reported
/// against its field instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookingForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub adults: String,
    pub children: String,
    #[ts(as = "Option<String>")]
    pub check_in: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub check_out: Option<NaiveDate>,
    pub room_category: String,
    pub promo_code: Option<String>,
}

impl Default for BookingForm {
    /// The form as first shown: one adult, no children, standard room.
    fn default() -> Self {
        BookingForm {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            adults: "1".to_string(),
            children: "0".to_string(),
            check_in: None,
            check_out: None,
            room_category: "standard".to_string(),
            promo_code: None,
        }
    }
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates the guest's name and returns it trimmed.
///
/// ## Rules
/// - Must not be blank
/// - At least 2 characters (counted as characters, not bytes)
pub fn validate_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: FIELD_NAME.to_string(),
        });
    }

    if name.chars().count() < MIN_GUEST_NAME_CHARS {
        return Err(ValidationError::TooShort {
            field: FIELD_NAME.to_string(),
            min: MIN_GUEST_NAME_CHARS,
        });
    }

    Ok(name.to_string())
}

/// Validates an email address syntactically.
///
/// ## Example
/// ```rust
/// use dandeli_core::validation::validate_email;
///
/// assert!(validate_email("guest@dandeli.in").is_ok());
/// assert!(validate_email("guest@dandeli").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: FIELD_EMAIL.to_string(),
        });
    }

    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidFormat {
            field: FIELD_EMAIL.to_string(),
            reason: "please enter a valid email address".to_string(),
        });
    }

    Ok(email.to_string())
}

/// Validates a phone number.
///
/// ## Accepted Shapes
/// ```text
/// 9876543210         8-12 digits
/// +919876543210      leading + directly on the digits
/// +91 9876543210     1-4 digit prefix, then space or hyphen
/// 91-9876543210
/// ```
/// The subscriber digits may not be all zeros.
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: FIELD_PHONE.to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: FIELD_PHONE.to_string(),
        reason: "please enter a valid phone number".to_string(),
    };

    let caps = PHONE_RE.captures(phone).ok_or_else(invalid)?;
    let subscriber = caps.get(2).map_or("", |m| m.as_str());
    if subscriber.chars().all(|c| c == '0') {
        return Err(invalid());
    }

    Ok(phone.to_string())
}

/// Parses a guest count typed into the form.
///
/// `minimum` is 1 for adults and 0 for children. A blank field is an error
/// when `minimum > 0` and counts as zero otherwise.
pub fn parse_guest_count(field: &str, raw: &str, minimum: u32) -> ValidationResult<u32> {
    let raw = raw.trim();

    if raw.is_empty() {
        if minimum == 0 {
            return Ok(0);
        }
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let count: u32 = raw.parse().map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a whole number".to_string(),
    })?;

    if count < minimum {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(count)
}

/// Validates the stay dates.
///
/// ## Rules
/// - Both dates are required
/// - Check-out must be strictly after check-in (a same-day stay is rejected)
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use dandeli_core::validation::validate_stay;
///
/// let d = |day| NaiveDate::from_ymd_opt(2026, 12, day);
/// assert!(validate_stay(d(20), d(22)).is_ok());
/// assert!(validate_stay(d(20), d(20)).is_err());
/// ```
pub fn validate_stay(
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
) -> ValidationResult<(NaiveDate, NaiveDate)> {
    let check_in = check_in.ok_or_else(|| ValidationError::Required {
        field: FIELD_CHECK_IN.to_string(),
    })?;
    let check_out = check_out.ok_or_else(|| ValidationError::Required {
        field: FIELD_CHECK_OUT.to_string(),
    })?;

    if check_out <= check_in {
        return Err(ValidationError::NotAfter {
            field: FIELD_CHECK_OUT.to_string(),
            other: FIELD_CHECK_IN.to_string(),
        });
    }

    Ok((check_in, check_out))
}

// =============================================================================
// Whole Form
// =============================================================================

/// Validates every field and builds the [`BookingRequest`].
///
/// All failing fields are reported together, in form order.
pub fn validate_form(form: &BookingForm) -> Result<BookingRequest, FormErrors> {
    let mut errors = FormErrors::new();

    let name = validate_name(&form.name).map_err(|e| errors.push(e)).ok();
    let email = validate_email(&form.email).map_err(|e| errors.push(e)).ok();
    let phone = validate_phone(&form.phone).map_err(|e| errors.push(e)).ok();
    let adults = parse_guest_count(FIELD_ADULTS, &form.adults, 1)
        .map_err(|e| errors.push(e))
        .ok();
    let children = parse_guest_count(FIELD_CHILDREN, &form.children, 0)
        .map_err(|e| errors.push(e))
        .ok();
    let stay = validate_stay(form.check_in, form.check_out)
        .map_err(|e| errors.push(e))
        .ok();

    let room_category = form.room_category.trim();
    if room_category.is_empty() {
        errors.push(ValidationError::Required {
            field: FIELD_ROOM.to_string(),
        });
    }

    match (name, email, phone, adults, children, stay) {
        (
            Some(guest_name),
            Some(email),
            Some(phone),
            Some(adult_count),
            Some(child_count),
            Some((check_in, check_out)),
        ) if errors.is_empty() => Ok(BookingRequest {
            guest_name,
            email,
            phone,
            adult_count,
            child_count,
            check_in,
            check_out,
            room_category: room_category.to_string(),
            promo_code: form
                .promo_code
                .as_deref()
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_string),
        }),
        _ => Err(errors),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
