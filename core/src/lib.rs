//! # Verification Relay Core
//!
//! Domain layer of the verification relay. This crate contains the
//! verification code entity, repository contracts with in-memory
//! implementations, the code lifecycle manager, and the verification service
//! consumed by the presentation layer.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{CodeType, ContactDetails, VerificationCode, VerificationContacts};
pub use errors::*;
pub use repositories::{
    InMemoryStudentContactRepository, InMemoryVerificationCodeRepository, StudentContactRepository,
    VerificationCodeRepository,
};
pub use services::*;
