//! Verification service module for SMS and email one-time codes
//!
//! This module provides the complete verification code workflow:
//! - Code and URL token generation with a fixed lifetime
//! - Insert-only issuance and atomic single-use consumption
//! - Message rendering and hand-off to a delivery service
//! - Development bypass code for local setups

mod config;
mod lifecycle;
mod messages;
mod service;
mod traits;

#[cfg(test)]
mod tests;

pub use config::{VerificationServiceConfig, DEV_BYPASS_CODE};
pub use lifecycle::CodeLifecycleManager;
pub use messages::{email_body, sms_message, verification_link, EMAIL_SUBJECT};
pub use service::VerificationService;
pub use traits::DeliveryServiceTrait;
