//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

// International phone number regex (E.164 format)
static E164_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[1-9]\d{9,14}$").expect("E.164 pattern is valid")
});

/// Minimum number of digits accepted by [`normalize_phone_number`]
pub const MIN_PHONE_DIGITS: usize = 10;

/// Maximum number of digits allowed by E.164
pub const MAX_PHONE_DIGITS: usize = 15;

/// Phone number normalization failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneNumberError {
    #[error("Phone number too short: {digits} digits, at least {MIN_PHONE_DIGITS} required")]
    TooShort { digits: usize },

    #[error("Phone number too long: {digits} digits, at most {MAX_PHONE_DIGITS} allowed")]
    TooLong { digits: usize },

    #[error("Phone number is not valid E.164: {normalized}")]
    NotE164 { normalized: String },
}

/// Strip everything but ASCII digits
pub fn digits_only(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize a phone number to E.164.
///
/// Ten digits are treated as a North American number and receive a `+1`
/// prefix. Eleven digits starting with `1` already carry the country code.
/// Any other length between 11 and 15 digits is taken as international.
/// The result must match E.164, so a country code cannot start with `0`.
pub fn normalize_phone_number(phone: &str) -> Result<String, PhoneNumberError> {
    let digits = digits_only(phone);
    let normalized = match digits.len() {
        n if n < MIN_PHONE_DIGITS => return Err(PhoneNumberError::TooShort { digits: n }),
        10 => format!("+1{}", digits),
        n if n > MAX_PHONE_DIGITS => return Err(PhoneNumberError::TooLong { digits: n }),
        _ => format!("+{}", digits),
    };

    if !E164_REGEX.is_match(&normalized) {
        return Err(PhoneNumberError::NotE164 { normalized });
    }
    Ok(normalized)
}
