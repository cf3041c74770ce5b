//! Domain entities representing core business objects.

pub mod contacts;
pub mod verification_code;

// Re-export commonly used types
pub use contacts::{ContactDetails, VerificationContacts};
pub use verification_code::{
    is_well_formed_code, CodeType, VerificationCode, CODE_LENGTH, CODE_TTL_MINUTES,
    URL_TOKEN_LENGTH,
};
