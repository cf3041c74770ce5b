//! Unit tests for domain error types

use crate::errors::{DomainError, VerificationError};

#[test]
fn test_verification_error_messages() {
    assert_eq!(
        VerificationError::CodeExpiredOrInvalid.to_string(),
        "Verification code is expired or invalid"
    );
    assert_eq!(VerificationError::CodeAlreadyConsumed.code(), "CODE_ALREADY_CONSUMED");
}

#[test]
fn test_domain_error_bridges_verification_error() {
    let error: DomainError = VerificationError::InvalidCodeFormat.into();
    assert!(matches!(
        error,
        DomainError::Verification(VerificationError::InvalidCodeFormat)
    ));
    assert_eq!(error.to_string(), "Verification code has an invalid format");
}

#[test]
fn test_domain_error_display() {
    let error = DomainError::NotFound {
        resource: "student S1001".to_string(),
    };
    assert_eq!(error.to_string(), "Resource not found: student S1001");
}
