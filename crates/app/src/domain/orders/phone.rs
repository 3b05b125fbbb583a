//! Contact phone normalization.
//!
//! The commerce platform requires E.164-formatted phone numbers and
//! rejects whole orders over a malformed one, so the number is
//! normalized (and validated) before any mirror attempt.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("phone number has fewer than 10 digits")]
pub struct PhoneFormatError;

/// Normalize a free-form phone number to E.164-ish form.
///
/// Strips every non-digit, then: 10 digits get a `+1` country prefix
/// (US assumption carried by the storefront), 11 or more keep their
/// leading country code behind a `+`. Fewer than 10 digits cannot be
/// a deliverable number and is an error.
pub fn format_phone(raw: &str) -> Result<String, PhoneFormatError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    match digits.len() {
        0..=9 => Err(PhoneFormatError),
        10 => Ok(format!("+1{digits}")),
        _ => Ok(format!("+{digits}")),
    }
}
