//! Common utility functions

pub mod masking;
pub mod phone;

// Re-export commonly used utilities
pub use masking::{mask_email, mask_mobile};
pub use phone::{digits_only, normalize_phone_number, PhoneNumberError};
