//! MySQL implementation of the VerificationCodeRepository trait.
//!
//! Consumption selects the candidate row with `FOR UPDATE` inside a
//! transaction and flips it with a guarded `UPDATE`, so two sessions presented
//! with the same code cannot both succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, Row, Transaction};
use uuid::Uuid;

use vr_core::domain::entities::{CodeType, VerificationCode};
use vr_core::errors::DomainError;
use vr_core::repositories::VerificationCodeRepository;

const COLUMNS: &str = "id, student_id, code, type, url_token, created_at, expires_at, verified";

fn internal(context: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::Internal {
        message: format!("{}: {}", context, e),
    }
}

/// MySQL implementation of VerificationCodeRepository
pub struct MySqlVerificationCodeRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlVerificationCodeRepository {
    /// Create a new MySQL verification code repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a VerificationCode entity
    fn row_to_code(row: &MySqlRow) -> Result<VerificationCode, DomainError> {
        let id: String = row.try_get("id").map_err(|e| internal("Failed to get id", e))?;
        let code_type: String = row.try_get("type").map_err(|e| internal("Failed to get type", e))?;

        Ok(VerificationCode {
            id: Uuid::parse_str(&id).map_err(|e| internal("Invalid code UUID", e))?,
            student_id: row
                .try_get("student_id")
                .map_err(|e| internal("Failed to get student_id", e))?,
            code: row.try_get("code").map_err(|e| internal("Failed to get code", e))?,
            code_type: code_type
                .parse::<CodeType>()
                .map_err(|e| internal("Invalid code type", e))?,
            url_token: row
                .try_get("url_token")
                .map_err(|e| internal("Failed to get url_token", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| internal("Failed to get created_at", e))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| internal("Failed to get expires_at", e))?,
            verified: row
                .try_get("verified")
                .map_err(|e| internal("Failed to get verified", e))?,
        })
    }

    /// Flip the row selected under `FOR UPDATE` and commit
    async fn consume_locked(
        mut tx: Transaction<'_, MySql>,
        row: Option<MySqlRow>,
    ) -> Result<Option<VerificationCode>, DomainError> {
        let Some(row) = row else {
            tx.rollback().await.map_err(|e| internal("Failed to roll back", e))?;
            return Ok(None);
        };

        let mut code = Self::row_to_code(&row)?;

        let result = sqlx::query("UPDATE verification_codes SET verified = TRUE WHERE id = ? AND verified = FALSE")
            .bind(code.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| internal("Failed to consume verification code", e))?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(|e| internal("Failed to roll back", e))?;
            return Ok(None);
        }

        tx.commit()
            .await
            .map_err(|e| internal("Failed to commit consumption", e))?;

        code.mark_verified();
        Ok(Some(code))
    }
}

#[async_trait]
impl VerificationCodeRepository for MySqlVerificationCodeRepository {
    async fn insert(&self, code: VerificationCode) -> Result<VerificationCode, DomainError> {
        let query = r#"
            INSERT INTO verification_codes (
                id, student_id, code, type, url_token, created_at, expires_at, verified
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(code.id.to_string())
            .bind(&code.student_id)
            .bind(&code.code)
            .bind(code.code_type.as_str())
            .bind(&code.url_token)
            .bind(code.created_at)
            .bind(code.expires_at)
            .bind(code.verified)
            .execute(&self.pool)
            .await
            .map_err(|e| internal("Failed to store verification code", e))?;

        Ok(code)
    }

    async fn consume_matching(
        &self,
        student_id: &str,
        code: &str,
        code_type: CodeType,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| internal("Failed to begin transaction", e))?;

        let query = format!(
            "SELECT {} FROM verification_codes \
             WHERE student_id = ? AND code = ? AND type = ? AND verified = FALSE AND expires_at > ? \
             ORDER BY created_at DESC LIMIT 1 FOR UPDATE",
            COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(student_id)
            .bind(code)
            .bind(code_type.as_str())
            .bind(now)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| internal("Failed to look up verification code", e))?;

        Self::consume_locked(tx, row).await
    }

    async fn consume_by_url_token(
        &self,
        url_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| internal("Failed to begin transaction", e))?;

        let query = format!(
            "SELECT {} FROM verification_codes \
             WHERE url_token = ? AND verified = FALSE AND expires_at > ? \
             LIMIT 1 FOR UPDATE",
            COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(url_token)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| internal("Failed to look up URL token", e))?;

        Self::consume_locked(tx, row).await
    }

    async fn find_by_code(
        &self,
        student_id: &str,
        code: &str,
        code_type: CodeType,
    ) -> Result<Vec<VerificationCode>, DomainError> {
        let query = format!(
            "SELECT {} FROM verification_codes WHERE student_id = ? AND code = ? AND type = ? \
             ORDER BY created_at DESC",
            COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(student_id)
            .bind(code)
            .bind(code_type.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| internal("Failed to find verification codes", e))?;

        rows.iter().map(Self::row_to_code).collect()
    }

    async fn has_verified(&self, student_id: &str, code_type: CodeType) -> Result<bool, DomainError> {
        let row = sqlx::query(
            "SELECT id FROM verification_codes WHERE student_id = ? AND type = ? AND verified = TRUE LIMIT 1",
        )
        .bind(student_id)
        .bind(code_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| internal("Failed to check verification status", e))?;

        Ok(row.is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM verification_codes WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| internal("Failed to delete expired codes", e))?;

        Ok(result.rows_affected())
    }
}
