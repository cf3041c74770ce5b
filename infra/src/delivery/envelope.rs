//! JSON envelope expected by the internal SMS gateway

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vr_shared::utils::phone::digits_only;

/// Fixed message type tag
pub const SMS_TYPE: &str = "SMS";

/// One SMS in the gateway's request body
///
/// The gateway takes a JSON array; a single send is an array of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsEnvelope {
    /// Correlation id for gateway-side logs
    pub internal_id: String,
    /// Destination, digits only
    pub mobile_number: String,
    pub sms_message: String,
    pub provider_id: String,
    #[serde(rename = "type")]
    pub message_type: String,
}

impl SmsEnvelope {
    pub fn new(to: &str, message: &str, provider_id: &str) -> Self {
        Self {
            internal_id: Uuid::new_v4().to_string(),
            mobile_number: digits_only(to),
            sms_message: message.to_string(),
            provider_id: provider_id.to_string(),
            message_type: SMS_TYPE.to_string(),
        }
    }

    /// Request body: a one-element JSON array
    pub fn to_body(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&[self])
    }
}
