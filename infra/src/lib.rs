//! # Infrastructure Layer
//!
//! Concrete implementations behind the core crate's traits:
//! - **Tunnel**: SSH session to the jump host and the hand-framed HTTP
//!   exchange with the internal SMS gateway
//! - **Delivery**: SMS/email delivery gateway with log-only fallback
//! - **Database**: MySQL repositories using SQLx

pub mod database;
pub mod delivery;
pub mod tunnel;

pub use database::{DatabasePool, MySqlStudentContactRepository, MySqlVerificationCodeRepository};
pub use delivery::{DeliveryGateway, EmailClient, MockDelivery};
pub use tunnel::{TunnelConnection, TunnelError, TunnelHttpExchange};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP request error for the email provider
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Payload serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SSH tunnel or gateway exchange error
    #[error(transparent)]
    Tunnel(#[from] TunnelError),

    /// The SMS gateway answered with a non-2xx status
    #[error("Gateway rejected the request with status {status}: {body}")]
    GatewayRejected { status: u16, body: String },

    /// The email provider refused the message
    #[error("Email provider error: {0}")]
    Email(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
