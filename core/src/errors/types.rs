//! Verification outcome errors
//!
//! These are recorded in logs only. Callers of the verification service see a
//! plain success flag so that a wrong code, an expired code and a consumed code
//! are indistinguishable from outside.

use thiserror::Error;

/// Reasons a verification attempt was refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Verification code is expired or invalid")]
    CodeExpiredOrInvalid,

    #[error("Verification code has already been used")]
    CodeAlreadyConsumed,

    #[error("Verification code has an invalid format")]
    InvalidCodeFormat,
}

impl VerificationError {
    /// Stable identifier used as the `reason` field in logs
    pub fn code(&self) -> &'static str {
        match self {
            VerificationError::CodeExpiredOrInvalid => "CODE_EXPIRED_OR_INVALID",
            VerificationError::CodeAlreadyConsumed => "CODE_ALREADY_CONSUMED",
            VerificationError::InvalidCodeFormat => "INVALID_CODE_FORMAT",
        }
    }
}
