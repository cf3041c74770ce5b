//! In-memory implementation of VerificationCodeRepository
//!
//! Backs development setups without a database and the test suites. All
//! consumption happens under a single write lock, which makes match-and-flip
//! atomic with respect to concurrent callers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::verification_code::{CodeType, VerificationCode};
use crate::errors::DomainError;

use super::r#trait::VerificationCodeRepository;

/// In-memory verification code store
#[derive(Clone, Default)]
pub struct InMemoryVerificationCodeRepository {
    codes: Arc<RwLock<Vec<VerificationCode>>>,
}

impl InMemoryVerificationCodeRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored row, in insertion order
    pub async fn all(&self) -> Vec<VerificationCode> {
        self.codes.read().await.clone()
    }

    /// Number of stored rows
    pub async fn len(&self) -> usize {
        self.codes.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.codes.read().await.is_empty()
    }

    async fn consume_first<F>(&self, predicate: F) -> Option<VerificationCode>
    where
        F: Fn(&VerificationCode) -> bool,
    {
        let mut codes = self.codes.write().await;
        let row = codes.iter_mut().find(|c| predicate(&**c))?;
        row.mark_verified();
        Some(row.clone())
    }
}

#[async_trait]
impl VerificationCodeRepository for InMemoryVerificationCodeRepository {
    async fn insert(&self, code: VerificationCode) -> Result<VerificationCode, DomainError> {
        let mut codes = self.codes.write().await;

        if codes.iter().any(|c| c.id == code.id) {
            return Err(DomainError::Validation {
                message: format!("Verification code {} already exists", code.id),
            });
        }

        codes.push(code.clone());
        Ok(code)
    }

    async fn consume_matching(
        &self,
        student_id: &str,
        code: &str,
        code_type: CodeType,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>, DomainError> {
        Ok(self
            .consume_first(|c| c.matches(student_id, code, code_type, now))
            .await)
    }

    async fn consume_by_url_token(
        &self,
        url_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>, DomainError> {
        Ok(self
            .consume_first(|c| c.url_token.as_deref() == Some(url_token) && c.is_usable_at(now))
            .await)
    }

    async fn find_by_code(
        &self,
        student_id: &str,
        code: &str,
        code_type: CodeType,
    ) -> Result<Vec<VerificationCode>, DomainError> {
        let codes = self.codes.read().await;
        Ok(codes
            .iter()
            .filter(|c| c.student_id == student_id && c.code == code && c.code_type == code_type)
            .cloned()
            .collect())
    }

    async fn has_verified(&self, student_id: &str, code_type: CodeType) -> Result<bool, DomainError> {
        let codes = self.codes.read().await;
        Ok(codes
            .iter()
            .any(|c| c.student_id == student_id && c.code_type == code_type && c.verified))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut codes = self.codes.write().await;
        let initial_count = codes.len();

        codes.retain(|c| !c.is_expired_at(now));

        Ok((initial_count - codes.len()) as u64)
    }
}
