//! Message templates for delivered codes

use crate::domain::entities::verification_code::CODE_TTL_MINUTES;

/// Subject line of verification emails
pub const EMAIL_SUBJECT: &str = "Your verification code";

/// One-click verification link for a URL token
pub fn verification_link(base_url: &str, url_token: &str) -> String {
    format!("{}/verify/{}", base_url.trim_end_matches('/'), url_token)
}

/// Text message carrying a code and, optionally, a one-click link
pub fn sms_message(code: &str, link: Option<&str>) -> String {
    let mut message = format!(
        "Your verification code is {}. It expires in {} minutes.",
        code, CODE_TTL_MINUTES
    );
    if let Some(link) = link {
        message.push_str(&format!(" Or verify instantly: {}", link));
    }
    message
}

/// Plain-text body of a verification email
pub fn email_body(code: &str) -> String {
    format!(
        "Your verification code is: {}\n\nThis code expires in {} minutes.\n\nIf you did not request this code, you can ignore this email.",
        code, CODE_TTL_MINUTES
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_link_trims_trailing_slash() {
        assert_eq!(
            verification_link("https://verify.example.edu/", "abc123"),
            "https://verify.example.edu/verify/abc123"
        );
    }

    #[test]
    fn test_sms_message() {
        let plain = sms_message("482913", None);
        assert!(plain.contains("482913"));
        assert!(!plain.contains("http"));

        let linked = sms_message("482913", Some("https://v.example.edu/verify/abc"));
        assert!(linked.ends_with("https://v.example.edu/verify/abc"));
    }

    #[test]
    fn test_email_body() {
        let body = email_body("482913");
        assert!(body.starts_with("Your verification code is: 482913\n"));
        assert!(body.contains("10 minutes"));
    }
}
