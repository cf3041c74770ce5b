//! MySQL repository implementations

pub mod student_contact_repository_impl;
pub mod verification_code_repository_impl;

pub use student_contact_repository_impl::MySqlStudentContactRepository;
pub use verification_code_repository_impl::MySqlVerificationCodeRepository;
