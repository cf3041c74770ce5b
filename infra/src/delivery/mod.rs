//! Outbound delivery of verification messages
//!
//! [`DeliveryGateway`] picks, per call, between the live path (SMS through the
//! SSH tunnel, email through the provider's HTTP API) and the log-only
//! [`MockDelivery`] when the channel's credentials are not configured.

pub mod email;
pub mod envelope;
pub mod gateway;
pub mod mock;

pub use email::{render_html, EmailClient};
pub use envelope::SmsEnvelope;
pub use gateway::DeliveryGateway;
pub use mock::MockDelivery;
