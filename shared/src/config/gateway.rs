//! Internal SMS gateway configuration module

use serde::{Deserialize, Serialize};

/// Target and tenant credentials of the internal SMS gateway
#[derive(Clone, Deserialize, Serialize)]
pub struct SmsGatewayConfig {
    /// Gateway host as seen from the jump host
    pub host: String,

    /// Gateway port as seen from the jump host
    pub port: u16,

    /// Request path of the send endpoint
    pub path: String,

    /// Tenant identifier header value
    pub tenant_id: Option<String>,

    /// Tenant application key header value
    pub application_key: Option<String>,

    /// Provider identifier placed in every envelope
    pub provider_id: String,

    /// End-to-end ceiling on one tunneled exchange, in seconds
    pub request_timeout_secs: u64,
}

impl Default for SmsGatewayConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 80,
            path: String::from("/api/sms/send"),
            tenant_id: None,
            application_key: None,
            provider_id: String::from("default"),
            request_timeout_secs: 30,
        }
    }
}

impl SmsGatewayConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: super::env_opt("SMS_GATEWAY_HOST").unwrap_or(defaults.host),
            port: super::env_parse("SMS_GATEWAY_PORT", defaults.port),
            path: super::env_opt("SMS_GATEWAY_PATH").unwrap_or(defaults.path),
            tenant_id: super::env_opt("SMS_TENANT_ID"),
            application_key: super::env_opt("SMS_APPLICATION_KEY"),
            provider_id: super::env_opt("SMS_PROVIDER_ID").unwrap_or(defaults.provider_id),
            ..defaults
        }
    }
}

impl std::fmt::Debug for SmsGatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsGatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("path", &self.path)
            .field("tenant_id", &self.tenant_id)
            .field("application_key", &self.application_key.as_ref().map(|_| "<redacted>"))
            .field("provider_id", &self.provider_id)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
