//! Business services containing domain logic and use cases.

pub mod verification;

// Re-export commonly used types
pub use verification::{
    CodeLifecycleManager, DeliveryServiceTrait, VerificationService, VerificationServiceConfig,
    DEV_BYPASS_CODE,
};
