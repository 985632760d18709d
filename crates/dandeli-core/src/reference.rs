//! Booking references and transaction ids.
//!
//! Both are a fixed prefix followed by the millisecond timestamp in
//! upper-case base 36, e.g. `BKMG7Q2X1C`.

use chrono::{DateTime, Utc};

use crate::{BOOKING_REFERENCE_PREFIX, TRANSACTION_ID_PREFIX};

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Upper-case base-36 rendering of `n`.
pub fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while n > 0 {
        digits.push(ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    digits.iter().rev().map(|&b| char::from(b)).collect()
}

fn stamp(prefix: &str, now: DateTime<Utc>) -> String {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    format!("{prefix}{}", to_base36(millis))
}

/// Reference quoted to the guest, derived from the time of the payment attempt.
pub fn booking_reference(now: DateTime<Utc>) -> String {
    stamp(BOOKING_REFERENCE_PREFIX, now)
}

/// Transaction id in the format the simulated gateway issues.
pub fn transaction_id(now: DateTime<Utc>) -> String {
    stamp(TRANSACTION_ID_PREFIX, now)
}
