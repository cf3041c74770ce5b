//! Configuration for the verification service

use vr_shared::config::{AppConfig, Environment};

use crate::domain::entities::verification_code::CODE_TTL_MINUTES;

/// Sentinel accepted for any student and channel while the bypass is enabled
pub const DEV_BYPASS_CODE: &str = "123456";

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Number of minutes before a verification code expires
    pub code_ttl_minutes: i64,
    /// Code accepted without a store lookup; only set in development
    pub dev_bypass_code: Option<String>,
    /// Base URL for one-click links; no URL token is issued when unset
    pub verify_link_base_url: Option<String>,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            code_ttl_minutes: CODE_TTL_MINUTES,
            dev_bypass_code: None,
            verify_link_base_url: None,
        }
    }
}

impl VerificationServiceConfig {
    /// Defaults for the given runtime mode
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            dev_bypass_code: environment
                .is_development()
                .then(|| DEV_BYPASS_CODE.to_string()),
            ..Default::default()
        }
    }

    /// Derive the service configuration from the application configuration
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            verify_link_base_url: config.verify_link_base_url.clone(),
            ..Self::for_environment(config.environment)
        }
    }
}
