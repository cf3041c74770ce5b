//! Verification code repository trait defining the interface for code persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::verification_code::{CodeType, VerificationCode};
use crate::errors::DomainError;

/// Repository trait for VerificationCode persistence operations
///
/// # Consumption Guarantees
/// - `consume_matching` and `consume_by_url_token` must match and flip a row in
///   one atomic step. Two concurrent calls presented with the same valid code
///   must yield exactly one `Some`.
/// - Rows are never updated other than to set `verified`; `insert` always
///   creates a new row.
#[async_trait]
pub trait VerificationCodeRepository: Send + Sync {
    /// Insert a newly issued code
    ///
    /// # Arguments
    /// * `code` - The VerificationCode entity to persist
    ///
    /// # Returns
    /// * `Ok(VerificationCode)` - The stored row
    /// * `Err(DomainError)` - Insert failed
    async fn insert(&self, code: VerificationCode) -> Result<VerificationCode, DomainError>;

    /// Atomically consume one row matching
    /// `(student_id, code, code_type, verified = false, expires_at > now)`
    ///
    /// # Returns
    /// * `Ok(Some(VerificationCode))` - The row that was flipped to verified
    /// * `Ok(None)` - No row satisfied the predicate
    /// * `Err(DomainError)` - Store error
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::Utc;
    /// # use vr_core::domain::entities::CodeType;
    /// # use vr_core::repositories::VerificationCodeRepository;
    /// # async fn example(repo: &impl VerificationCodeRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// match repo.consume_matching("S1001", "482913", CodeType::Sms, Utc::now()).await? {
    ///     Some(row) => println!("Consumed code {}", row.id),
    ///     None => println!("No usable code"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn consume_matching(
        &self,
        student_id: &str,
        code: &str,
        code_type: CodeType,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>, DomainError>;

    /// Atomically consume the usable row carrying `url_token`
    async fn consume_by_url_token(
        &self,
        url_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>, DomainError>;

    /// Find every row with the given code regardless of state
    ///
    /// Used only to classify refused attempts in logs.
    async fn find_by_code(
        &self,
        student_id: &str,
        code: &str,
        code_type: CodeType,
    ) -> Result<Vec<VerificationCode>, DomainError>;

    /// Whether the student has ever consumed a code on this channel
    async fn has_verified(&self, student_id: &str, code_type: CodeType) -> Result<bool, DomainError>;

    /// Delete rows that expired before `now`
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of rows deleted
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;
}
