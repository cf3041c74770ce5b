//! Mock implementations for testing verification service

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::services::verification::traits::DeliveryServiceTrait;

/// A delivered message captured by [`RecordingDelivery`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivered {
    Sms { to: String, message: String },
    Email { to: String, subject: String, body: String },
}

// Delivery double that records every message
pub struct RecordingDelivery {
    pub delivered: Arc<Mutex<Vec<Delivered>>>,
    pub should_fail: bool,
}

impl RecordingDelivery {
    pub fn new(should_fail: bool) -> Self {
        Self {
            delivered: Arc::new(Mutex::new(Vec::new())),
            should_fail,
        }
    }

    pub fn messages(&self) -> Vec<Delivered> {
        self.delivered.lock().unwrap().clone()
    }

    /// Extract the six-digit code from the last delivered message
    pub fn last_code(&self) -> Option<String> {
        let text = match self.messages().last()? {
            Delivered::Sms { message, .. } => message.clone(),
            Delivered::Email { body, .. } => body.clone(),
        };
        text.split(|c: char| !c.is_ascii_digit())
            .find(|part| part.len() == 6)
            .map(str::to_string)
    }
}

#[async_trait]
impl DeliveryServiceTrait for RecordingDelivery {
    async fn send_sms(&self, to: &str, message: &str) -> bool {
        self.delivered.lock().unwrap().push(Delivered::Sms {
            to: to.to_string(),
            message: message.to_string(),
        });
        !self.should_fail
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> bool {
        self.delivered.lock().unwrap().push(Delivered::Email {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        !self.should_fail
    }
}
