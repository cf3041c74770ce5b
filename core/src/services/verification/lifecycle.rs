//! Verification code lifecycle: issue, consume, purge

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use std::sync::Arc;

use crate::domain::entities::verification_code::{
    is_well_formed_code, CodeType, VerificationCode, URL_TOKEN_LENGTH,
};
use crate::errors::{DomainError, DomainResult, VerificationError};
use crate::repositories::VerificationCodeRepository;

use super::config::VerificationServiceConfig;

/// Issues verification codes and consumes them against the store
pub struct CodeLifecycleManager<R: VerificationCodeRepository> {
    /// Persistent code store
    repository: Arc<R>,
    /// Service configuration
    config: VerificationServiceConfig,
}

impl<R: VerificationCodeRepository> CodeLifecycleManager<R> {
    /// Create a new lifecycle manager
    pub fn new(repository: Arc<R>, config: VerificationServiceConfig) -> Self {
        Self { repository, config }
    }

    /// Generate a one-click URL token
    pub fn generate_url_token() -> String {
        VerificationCode::generate_url_token()
    }

    /// Issue a new code for `(student_id, code_type)`.
    ///
    /// Always inserts a new row; earlier unexpired codes stay usable.
    pub async fn issue(
        &self,
        student_id: &str,
        code_type: CodeType,
        url_token: Option<String>,
    ) -> DomainResult<VerificationCode> {
        let code = VerificationCode::new_with_ttl(
            student_id,
            code_type,
            url_token,
            Duration::minutes(self.config.code_ttl_minutes),
        );

        let stored = self.repository.insert(code).await.map_err(|e| {
            tracing::error!(
                student_id = student_id,
                code_type = %code_type,
                error = %e,
                event = "code_storage_failed",
                "Failed to store verification code"
            );
            e
        })?;

        tracing::info!(
            student_id = student_id,
            code_type = %code_type,
            code_id = %stored.id,
            expires_at = %stored.expires_at,
            with_url_token = stored.url_token.is_some(),
            event = "code_issued",
            "Issued verification code"
        );

        Ok(stored)
    }

    /// Verify and consume a code
    ///
    /// Returns `true` exactly once per issued code. Every refusal and every
    /// store error yields `false`.
    pub async fn verify(&self, student_id: &str, code: &str, code_type: CodeType) -> bool {
        self.verify_at(student_id, code, code_type, Utc::now()).await
    }

    /// [`verify`](Self::verify) evaluated against an explicit clock
    pub async fn verify_at(
        &self,
        student_id: &str,
        code: &str,
        code_type: CodeType,
        now: DateTime<Utc>,
    ) -> bool {
        match self.try_verify(student_id, code, code_type, now).await {
            Ok(()) => true,
            Err(DomainError::Verification(reason)) => {
                tracing::warn!(
                    student_id = student_id,
                    code_type = %code_type,
                    reason = reason.code(),
                    event = "verification_failed",
                    "Verification code refused"
                );
                false
            }
            Err(e) => {
                tracing::error!(
                    student_id = student_id,
                    code_type = %code_type,
                    error = %e,
                    event = "verification_error",
                    "Verification code could not be checked"
                );
                false
            }
        }
    }

    async fn try_verify(
        &self,
        student_id: &str,
        code: &str,
        code_type: CodeType,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.is_bypass_code(code) {
            tracing::warn!(
                student_id = student_id,
                code_type = %code_type,
                event = "dev_bypass_used",
                "Development bypass code accepted"
            );
            return Ok(());
        }

        if !is_well_formed_code(code) {
            return Err(VerificationError::InvalidCodeFormat.into());
        }

        match self
            .repository
            .consume_matching(student_id, code, code_type, now)
            .await?
        {
            Some(row) => {
                tracing::info!(
                    student_id = student_id,
                    code_type = %code_type,
                    code_id = %row.id,
                    event = "code_verified",
                    "Verification code consumed"
                );
                Ok(())
            }
            None => Err(self.classify_refusal(student_id, code, code_type).await.into()),
        }
    }

    // Distinguishes a replayed code from a wrong or expired one, for logs only.
    async fn classify_refusal(
        &self,
        student_id: &str,
        code: &str,
        code_type: CodeType,
    ) -> VerificationError {
        match self.repository.find_by_code(student_id, code, code_type).await {
            Ok(rows) if rows.iter().any(|row| row.verified) => VerificationError::CodeAlreadyConsumed,
            _ => VerificationError::CodeExpiredOrInvalid,
        }
    }

    fn is_bypass_code(&self, code: &str) -> bool {
        self.config
            .dev_bypass_code
            .as_deref()
            .map_or(false, |bypass| constant_time_eq(bypass.as_bytes(), code.as_bytes()))
    }

    /// Consume the code carrying a one-click URL token
    ///
    /// Returns the consumed row, or `None` when the token is malformed,
    /// unknown, expired, already used, or the store failed.
    pub async fn verify_url_token(&self, url_token: &str) -> Option<VerificationCode> {
        if url_token.len() != URL_TOKEN_LENGTH || !url_token.chars().all(|c| c.is_ascii_hexdigit()) {
            tracing::warn!(
                reason = VerificationError::InvalidCodeFormat.code(),
                event = "url_token_refused",
                "Malformed URL token"
            );
            return None;
        }

        match self
            .repository
            .consume_by_url_token(&url_token.to_ascii_lowercase(), Utc::now())
            .await
        {
            Ok(Some(row)) => {
                tracing::info!(
                    student_id = %row.student_id,
                    code_type = %row.code_type,
                    code_id = %row.id,
                    event = "url_token_verified",
                    "Verification code consumed through link"
                );
                Some(row)
            }
            Ok(None) => {
                tracing::warn!(
                    reason = VerificationError::CodeExpiredOrInvalid.code(),
                    event = "url_token_refused",
                    "URL token refused"
                );
                None
            }
            Err(e) => {
                tracing::error!(error = %e, event = "verification_error", "URL token could not be checked");
                None
            }
        }
    }

    /// Delete expired rows
    pub async fn purge_expired(&self) -> DomainResult<u64> {
        let deleted = self.repository.delete_expired(Utc::now()).await?;
        if deleted > 0 {
            tracing::info!(deleted_count = deleted, event = "codes_purged", "Purged expired verification codes");
        }
        Ok(deleted)
    }
}
