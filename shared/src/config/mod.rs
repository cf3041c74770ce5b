//! Configuration module with relay-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `database` - Record store connection and pool configuration
//! - `email` - Outbound email provider configuration
//! - `environment` - Environment detection and logging configuration
//! - `gateway` - Internal SMS gateway target and tenant credentials
//! - `tunnel` - SSH jump host connection parameters

pub mod database;
pub mod email;
pub mod environment;
pub mod gateway;
pub mod tunnel;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use gateway::SmsGatewayConfig;
pub use tunnel::TunnelConfig;

/// Complete relay configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Runtime mode
    pub environment: Environment,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Record store configuration
    pub database: DatabaseConfig,

    /// SSH jump host configuration
    pub tunnel: TunnelConfig,

    /// Internal SMS gateway configuration
    pub sms_gateway: SmsGatewayConfig,

    /// Email provider configuration
    pub email: EmailConfig,

    /// Base URL for one-click verification links embedded in SMS messages
    #[serde(default)]
    pub verify_link_base_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            logging: LoggingConfig::for_environment(env),
            database: DatabaseConfig::default(),
            tunnel: TunnelConfig::default(),
            sms_gateway: SmsGatewayConfig::default(),
            email: EmailConfig::default(),
            verify_link_base_url: None,
        }
    }
}

impl AppConfig {
    /// Load the complete configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let environment = Environment::from_env();
        dotenvy::from_filename(environment.env_file()).ok();
        Self {
            environment,
            logging: LoggingConfig::from_env(environment),
            database: DatabaseConfig::from_env(),
            tunnel: TunnelConfig::from_env(),
            sms_gateway: SmsGatewayConfig::from_env(),
            email: EmailConfig::from_env(),
            verify_link_base_url: env_opt("VERIFY_LINK_BASE_URL"),
        }
    }
}

/// Read an environment variable, treating unset and blank values alike.
pub(crate) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read and parse an environment variable, falling back to `default`.
pub(crate) fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}
