pub mod contacts;
pub mod verification_code;

pub use contacts::{InMemoryStudentContactRepository, StudentContactRepository};
pub use verification_code::{InMemoryVerificationCodeRepository, VerificationCodeRepository};
