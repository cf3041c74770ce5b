//! MySQL implementation of the StudentContactRepository trait.
//!
//! Student records belong to the enrollment system; this reads only the
//! `mobile` and `email` columns of `students`.

use async_trait::async_trait;
use sqlx::{MySqlPool, Row};

use vr_core::domain::entities::ContactDetails;
use vr_core::errors::DomainError;
use vr_core::repositories::StudentContactRepository;

/// MySQL-backed student contact lookup
pub struct MySqlStudentContactRepository {
    pool: MySqlPool,
}

impl MySqlStudentContactRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentContactRepository for MySqlStudentContactRepository {
    async fn find_contacts(&self, student_id: &str) -> Result<Option<ContactDetails>, DomainError> {
        let row = sqlx::query("SELECT mobile, email FROM students WHERE id = ?")
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to load student contacts: {}", e),
            })?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mobile: Option<String> = row.try_get("mobile").map_err(|e| DomainError::Internal {
            message: format!("Failed to get mobile: {}", e),
        })?;
        let email: Option<String> = row.try_get("email").map_err(|e| DomainError::Internal {
            message: format!("Failed to get email: {}", e),
        })?;

        // Blank columns count as absent
        Ok(Some(ContactDetails {
            mobile: mobile.filter(|m| !m.trim().is_empty()),
            email: email.filter(|e| !e.trim().is_empty()),
        }))
    }
}
