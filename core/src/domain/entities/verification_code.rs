//! Verification code entity shared by the SMS and email channels.

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, Rng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Fixed lifetime of every issued code (10 minutes)
pub const CODE_TTL_MINUTES: i64 = 10;

/// Length of the hex-encoded one-click URL token
pub const URL_TOKEN_LENGTH: usize = 32;

/// Delivery channel a code was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeType {
    Sms,
    Email,
}

impl CodeType {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeType::Sms => "sms",
            CodeType::Email => "email",
        }
    }
}

impl std::fmt::Display for CodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sms" => Ok(CodeType::Sms),
            "email" => Ok(CodeType::Email),
            _ => Err(format!("Invalid verification code type: {}", s)),
        }
    }
}

/// A persisted one-time verification code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    /// Unique identifier of the row
    pub id: Uuid,

    /// Owning subject; not checked for existence
    pub student_id: String,

    /// The 6-digit verification code
    pub code: String,

    /// Channel the code was issued for
    pub code_type: CodeType,

    /// Token for one-click verification links, when the message carries one
    pub url_token: Option<String>,

    /// Timestamp when the code was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the code expires
    pub expires_at: DateTime<Utc>,

    /// Whether the code has been consumed
    pub verified: bool,
}

impl VerificationCode {
    /// Creates a new unverified code with the fixed 10 minute lifetime
    ///
    /// # Arguments
    ///
    /// * `student_id` - The subject the code belongs to
    /// * `code_type` - Channel the code will be delivered through
    /// * `url_token` - Optional one-click token sharing this row's expiry
    pub fn new(student_id: impl Into<String>, code_type: CodeType, url_token: Option<String>) -> Self {
        Self::new_with_ttl(student_id, code_type, url_token, Duration::minutes(CODE_TTL_MINUTES))
    }

    /// Creates a new unverified code with a custom lifetime
    pub fn new_with_ttl(
        student_id: impl Into<String>,
        code_type: CodeType,
        url_token: Option<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            student_id: student_id.into(),
            code: Self::generate_code(),
            code_type,
            url_token,
            created_at: now,
            expires_at: now + ttl,
            verified: false,
        }
    }

    /// Generates a 6-digit code drawn uniformly from [100000, 999999]
    pub fn generate_code() -> String {
        let code: u32 = rand::thread_rng().gen_range(100_000..=999_999);
        code.to_string()
    }

    /// Generates a 32-character hex token from the operating system CSPRNG
    pub fn generate_url_token() -> String {
        let mut bytes = [0u8; URL_TOKEN_LENGTH / 2];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Checks if the code has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Checks if the code has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// A code is usable while unexpired and unconsumed
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.verified && !self.is_expired_at(now)
    }

    /// Whether this row satisfies the consumption predicate
    pub fn matches(&self, student_id: &str, code: &str, code_type: CodeType, now: DateTime<Utc>) -> bool {
        self.student_id == student_id
            && self.code == code
            && self.code_type == code_type
            && self.is_usable_at(now)
    }

    /// Gets the time remaining until expiration, or zero if expired
    pub fn time_until_expiration(&self) -> Duration {
        let now = Utc::now();
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }

    /// Marks the code as consumed
    pub fn mark_verified(&mut self) {
        self.verified = true;
    }
}

/// Whether `code` has the shape of an issued code
pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.chars().all(|c| c.is_ascii_digit())
}
