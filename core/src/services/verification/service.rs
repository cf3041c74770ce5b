//! Verification service consumed by the presentation layer

use std::sync::Arc;

use vr_shared::utils::masking::{mask_email, mask_mobile};
use vr_shared::utils::phone::normalize_phone_number;

use crate::domain::entities::contacts::{ContactDetails, VerificationContacts};
use crate::domain::entities::verification_code::CodeType;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::{StudentContactRepository, VerificationCodeRepository};

use super::config::VerificationServiceConfig;
use super::lifecycle::CodeLifecycleManager;
use super::messages::{email_body, sms_message, verification_link, EMAIL_SUBJECT};
use super::traits::DeliveryServiceTrait;

/// Send / check / contacts facade over the code lifecycle and delivery
pub struct VerificationService<R, C, D>
where
    R: VerificationCodeRepository,
    C: StudentContactRepository,
    D: DeliveryServiceTrait,
{
    /// Code issuance and consumption
    lifecycle: CodeLifecycleManager<R>,
    /// Code store, for per-channel verification status
    codes: Arc<R>,
    /// Student contact lookup
    contacts: Arc<C>,
    /// Delivery gateway
    delivery: Arc<D>,
    /// Service configuration
    config: VerificationServiceConfig,
}

impl<R, C, D> VerificationService<R, C, D>
where
    R: VerificationCodeRepository,
    C: StudentContactRepository,
    D: DeliveryServiceTrait,
{
    /// Create a new verification service
    ///
    /// # Arguments
    ///
    /// * `codes` - Verification code store
    /// * `contacts` - Student contact store
    /// * `delivery` - SMS / email delivery implementation
    /// * `config` - Service configuration
    pub fn new(
        codes: Arc<R>,
        contacts: Arc<C>,
        delivery: Arc<D>,
        config: VerificationServiceConfig,
    ) -> Self {
        Self {
            lifecycle: CodeLifecycleManager::new(codes.clone(), config.clone()),
            codes,
            contacts,
            delivery,
            config,
        }
    }

    /// Underlying lifecycle manager
    pub fn lifecycle(&self) -> &CodeLifecycleManager<R> {
        &self.lifecycle
    }

    /// Issue a code for the student's contact on `channel` and deliver it
    ///
    /// Returns `false` when the student or the contact is unknown, the
    /// contact is unusable, the code cannot be stored, or delivery fails.
    pub async fn send_verification(&self, student_id: &str, channel: CodeType) -> bool {
        let contacts = match self.contacts.find_contacts(student_id).await {
            Ok(Some(contacts)) => contacts,
            Ok(None) => {
                tracing::warn!(student_id = student_id, event = "student_not_found", "No contacts for student");
                return false;
            }
            Err(e) => {
                tracing::error!(student_id = student_id, error = %e, "Failed to load student contacts");
                return false;
            }
        };

        match channel {
            CodeType::Sms => self.send_sms_code(student_id, &contacts).await,
            CodeType::Email => self.send_email_code(student_id, &contacts).await,
        }
    }

    async fn send_sms_code(&self, student_id: &str, contacts: &ContactDetails) -> bool {
        let Some(mobile) = contacts.mobile.as_deref() else {
            tracing::warn!(student_id = student_id, event = "contact_missing", "Student has no mobile number");
            return false;
        };

        let normalized = match normalize_phone_number(mobile) {
            Ok(normalized) => normalized,
            Err(e) => {
                tracing::warn!(
                    student_id = student_id,
                    phone = %mask_mobile(mobile),
                    error = %e,
                    event = "invalid_phone",
                    "Student mobile number cannot be normalized"
                );
                return false;
            }
        };

        let url_token = self
            .config
            .verify_link_base_url
            .as_ref()
            .map(|_| CodeLifecycleManager::<R>::generate_url_token());

        let issued = match self.lifecycle.issue(student_id, CodeType::Sms, url_token).await {
            Ok(issued) => issued,
            Err(_) => return false,
        };

        let link = match (&self.config.verify_link_base_url, &issued.url_token) {
            (Some(base), Some(token)) => Some(verification_link(base, token)),
            _ => None,
        };
        let message = sms_message(&issued.code, link.as_deref());

        let delivered = self.delivery.send_sms(&normalized, &message).await;
        tracing::info!(
            student_id = student_id,
            phone = %mask_mobile(&normalized),
            delivered = delivered,
            event = "sms_code_sent",
            "SMS verification dispatched"
        );
        delivered
    }

    async fn send_email_code(&self, student_id: &str, contacts: &ContactDetails) -> bool {
        let Some(email) = contacts.email.as_deref() else {
            tracing::warn!(student_id = student_id, event = "contact_missing", "Student has no email address");
            return false;
        };

        let issued = match self.lifecycle.issue(student_id, CodeType::Email, None).await {
            Ok(issued) => issued,
            Err(_) => return false,
        };

        let delivered = self
            .delivery
            .send_email(email, EMAIL_SUBJECT, &email_body(&issued.code))
            .await;
        tracing::info!(
            student_id = student_id,
            email = %mask_email(email),
            delivered = delivered,
            event = "email_code_sent",
            "Email verification dispatched"
        );
        delivered
    }

    /// Check and consume a submitted code
    pub async fn check_verification(&self, student_id: &str, code: &str, channel: CodeType) -> bool {
        self.lifecycle.verify(student_id, code.trim(), channel).await
    }

    /// Check and consume a one-click URL token
    pub async fn check_url_token(&self, url_token: &str) -> bool {
        self.lifecycle.verify_url_token(url_token.trim()).await.is_some()
    }

    /// Raw contacts of a student plus per-channel verification status
    pub async fn get_verification_contacts(&self, student_id: &str) -> DomainResult<VerificationContacts> {
        let contacts = self
            .contacts
            .find_contacts(student_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                resource: format!("student {}", student_id),
            })?;

        let mobile_verified = self.codes.has_verified(student_id, CodeType::Sms).await?;
        let email_verified = self.codes.has_verified(student_id, CodeType::Email).await?;

        Ok(VerificationContacts {
            contacts,
            mobile_verified,
            email_verified,
        })
    }
}
