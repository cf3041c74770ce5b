//! Privacy-preserving display strings for contact details
//!
//! These functions are total: any input yields a displayable string.

use super::phone::digits_only;

/// Number of trailing digits left visible by [`mask_mobile`]
const VISIBLE_MOBILE_DIGITS: usize = 4;

/// Placeholder returned for addresses without an `@`
pub const MASKED_EMAIL_PLACEHOLDER: &str = "***@***";

/// Mask a mobile number for display (e.g. `***-***-8901`)
pub fn mask_mobile(number: &str) -> String {
    let digits = digits_only(number);
    if digits.len() < VISIBLE_MOBILE_DIGITS {
        return "***".to_string();
    }
    format!("***-***-{}", &digits[digits.len() - VISIBLE_MOBILE_DIGITS..])
}

/// Mask an email address for display (e.g. `j***e@parisjc.edu`)
pub fn mask_email(address: &str) -> String {
    let Some((local, domain)) = address.split_once('@') else {
        return MASKED_EMAIL_PLACEHOLDER.to_string();
    };

    let mut chars = local.chars();
    match (chars.next(), chars.next_back()) {
        (None, _) => MASKED_EMAIL_PLACEHOLDER.to_string(),
        (Some(first), None) => format!("{}@{}", first, domain),
        (Some(first), Some(last)) => format!("{}***{}@{}", first, last, domain),
    }
}
