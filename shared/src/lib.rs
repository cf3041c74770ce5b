//! Shared utilities and common types for the verification relay
//!
//! This crate provides common functionality used across all workspace crates:
//! - Configuration types loaded from the environment
//! - Phone number normalization and contact masking
//! - Tracing subscriber initialisation

pub mod config;
pub mod telemetry;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, DatabaseConfig, EmailConfig, Environment, LogFormat, LoggingConfig,
    SmsGatewayConfig, TunnelConfig,
};
pub use utils::{masking, phone};
