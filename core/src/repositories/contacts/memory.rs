//! In-memory implementation of StudentContactRepository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::contacts::ContactDetails;
use crate::errors::DomainError;

use super::r#trait::StudentContactRepository;

/// In-memory student contact store
#[derive(Clone, Default)]
pub struct InMemoryStudentContactRepository {
    contacts: Arc<RwLock<HashMap<String, ContactDetails>>>,
}

impl InMemoryStudentContactRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the contact details of a student
    pub async fn upsert(&self, student_id: impl Into<String>, details: ContactDetails) {
        self.contacts.write().await.insert(student_id.into(), details);
    }
}

#[async_trait]
impl StudentContactRepository for InMemoryStudentContactRepository {
    async fn find_contacts(&self, student_id: &str) -> Result<Option<ContactDetails>, DomainError> {
        Ok(self.contacts.read().await.get(student_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_and_find() {
        let repo = InMemoryStudentContactRepository::new();
        assert!(repo.find_contacts("S1001").await.unwrap().is_none());

        repo.upsert(
            "S1001",
            ContactDetails {
                mobile: Some("9035550142".to_string()),
                email: None,
            },
        )
        .await;

        let found = repo.find_contacts("S1001").await.unwrap().unwrap();
        assert_eq!(found.mobile.as_deref(), Some("9035550142"));
        assert!(found.email.is_none());
    }
}
