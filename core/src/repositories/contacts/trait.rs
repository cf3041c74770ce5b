//! Student contact repository trait.
//!
//! The record store owns student records; the relay only reads the contact
//! values a code can be delivered to.

use async_trait::async_trait;

use crate::domain::entities::contacts::ContactDetails;
use crate::errors::DomainError;

/// Read access to the contact details of a student
#[async_trait]
pub trait StudentContactRepository: Send + Sync {
    /// Find the contact details of a student
    ///
    /// # Returns
    /// * `Ok(Some(ContactDetails))` - Student found
    /// * `Ok(None)` - No student with this id
    /// * `Err(DomainError)` - Store error
    async fn find_contacts(&self, student_id: &str) -> Result<Option<ContactDetails>, DomainError>;
}
