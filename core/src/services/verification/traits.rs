//! Traits for delivery service integration

use async_trait::async_trait;

/// Trait for the delivery gateway
///
/// Both operations report whether delivery is believed successful. Transport
/// failures are handled inside the implementation and surface only as `false`.
#[async_trait]
pub trait DeliveryServiceTrait: Send + Sync {
    /// Send a text message to a phone number
    async fn send_sms(&self, to: &str, message: &str) -> bool;

    /// Send an email with a plain-text body
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> bool;
}
