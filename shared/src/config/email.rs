//! Email provider configuration module

use serde::{Deserialize, Serialize};

/// Outbound email provider configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    /// Provider API key; email is mocked when unset
    pub api_key: Option<String>,

    /// Sender address
    pub from_address: String,

    /// Provider send endpoint
    pub api_url: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from_address: String::from("Verification <no-reply@verification.local>"),
            api_url: String::from("https://api.resend.com/emails"),
            request_timeout_secs: 30,
        }
    }
}

impl EmailConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: super::env_opt("EMAIL_API_KEY"),
            from_address: super::env_opt("EMAIL_FROM").unwrap_or(defaults.from_address),
            api_url: super::env_opt("EMAIL_API_URL").unwrap_or(defaults.api_url),
            ..defaults
        }
    }

    /// Whether live delivery is possible
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("from_address", &self.from_address)
            .field("api_url", &self.api_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
