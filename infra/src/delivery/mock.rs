//! Log-only delivery for setups without gateway or provider credentials
//!
//! Messages are written in full to the `delivery` tracing target so a
//! developer can read the code off the log. The unmasked destination only
//! appears at `debug`.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use vr_core::services::verification::DeliveryServiceTrait;
use vr_shared::utils::masking::{mask_email, mask_mobile};

/// Mock delivery that always succeeds
#[derive(Clone, Default)]
pub struct MockDelivery {
    /// Counter for tracking number of messages "sent"
    message_count: Arc<AtomicU64>,
}

impl MockDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages handled so far
    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Reset the message counter
    pub fn reset_counter(&self) {
        self.message_count.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl DeliveryServiceTrait for MockDelivery {
    async fn send_sms(&self, to: &str, message: &str) -> bool {
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            target: "delivery",
            provider = "mock",
            channel = "sms",
            to = %mask_mobile(to),
            message_number = count,
            message = %message,
            "Mock SMS (not sent)"
        );
        tracing::debug!(target: "delivery", provider = "mock", channel = "sms", to = %to, "Mock SMS destination");
        true
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> bool {
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            target: "delivery",
            provider = "mock",
            channel = "email",
            to = %mask_email(to),
            message_number = count,
            subject = %subject,
            body = %body,
            "Mock email (not sent)"
        );
        tracing::debug!(target: "delivery", provider = "mock", channel = "email", to = %to, "Mock email destination");
        true
    }
}
