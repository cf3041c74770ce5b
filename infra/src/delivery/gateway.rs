//! Delivery gateway: live SMS over the tunnel, live email over HTTP, or mock
//!
//! Both operations reduce every failure to `false` after logging it. When an
//! exchange fails on a tunnel session, that session is torn down so the next
//! send starts from a fresh one. A non-2xx answer is a plain failure and
//! leaves the session in place.

use async_trait::async_trait;
use std::time::{Duration, Instant};

use vr_core::services::verification::DeliveryServiceTrait;
use vr_shared::config::{AppConfig, EmailConfig, SmsGatewayConfig};
use vr_shared::utils::masking::{mask_email, mask_mobile};

use crate::delivery::email::EmailClient;
use crate::delivery::envelope::SmsEnvelope;
use crate::delivery::mock::MockDelivery;
use crate::tunnel::{GatewayRequest, GatewayResponse, TunnelConnection, TunnelHttpExchange};
use crate::InfrastructureError;

/// Header carrying the gateway tenant id
pub const TENANT_HEADER: &str = "X-Tenant-Id";
/// Header carrying the gateway application key
pub const APPLICATION_KEY_HEADER: &str = "X-Application-Key";

/// SMS and email delivery with per-channel mock fallback
pub struct DeliveryGateway {
    tunnel: TunnelConnection,
    exchange: TunnelHttpExchange,
    sms: SmsGatewayConfig,
    email: Option<EmailClient>,
    mock: MockDelivery,
}

impl DeliveryGateway {
    /// Create the gateway
    ///
    /// # Errors
    /// * `InfrastructureError::Http` - The email HTTP client could not be built
    pub fn new(
        tunnel: TunnelConnection,
        sms: SmsGatewayConfig,
        email: EmailConfig,
    ) -> Result<Self, InfrastructureError> {
        let email = if email.is_configured() {
            Some(EmailClient::new(email)?)
        } else {
            None
        };

        let gateway = Self {
            tunnel,
            exchange: TunnelHttpExchange::new(Duration::from_secs(sms.request_timeout_secs)),
            sms,
            email,
            mock: MockDelivery::new(),
        };

        tracing::info!(
            sms_live = gateway.sms_is_live(),
            email_live = gateway.email_is_live(),
            event = "delivery_gateway_ready",
            "Delivery gateway initialized"
        );

        Ok(gateway)
    }

    /// Build the tunnel and the gateway from the application configuration
    ///
    /// # Errors
    /// * `InfrastructureError::Tunnel(TunnelError::MalformedKey)` - The SSH
    ///   private key is set but cannot be decoded
    pub fn from_app_config(config: &AppConfig) -> Result<Self, InfrastructureError> {
        let tunnel = TunnelConnection::new(config.tunnel.clone())?;
        Self::new(tunnel, config.sms_gateway.clone(), config.email.clone())
    }

    /// Whether SMS goes through the tunnel rather than the mock
    pub fn sms_is_live(&self) -> bool {
        self.tunnel.is_configured() && self.sms.application_key.is_some()
    }

    /// Whether email goes to the provider rather than the mock
    pub fn email_is_live(&self) -> bool {
        self.email.is_some()
    }

    /// The mock used for unconfigured channels
    pub fn mock(&self) -> &MockDelivery {
        &self.mock
    }

    /// The underlying tunnel
    pub fn tunnel(&self) -> &TunnelConnection {
        &self.tunnel
    }

    fn build_request(&self, to: &str, message: &str) -> Result<GatewayRequest, InfrastructureError> {
        let envelope = SmsEnvelope::new(to, message, &self.sms.provider_id);

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(tenant_id) = &self.sms.tenant_id {
            headers.push((TENANT_HEADER.to_string(), tenant_id.clone()));
        }
        if let Some(application_key) = &self.sms.application_key {
            headers.push((APPLICATION_KEY_HEADER.to_string(), application_key.clone()));
        }

        Ok(GatewayRequest {
            host: self.sms.host.clone(),
            port: self.sms.port,
            path: self.sms.path.clone(),
            headers,
            body: envelope.to_body()?,
        })
    }

    async fn send_sms_live(&self, to: &str, message: &str) -> Result<GatewayResponse, InfrastructureError> {
        let request = self.build_request(to, message)?;
        // A failed acquire leaves nothing cached
        let session = self.tunnel.acquire().await?;

        match self.exchange.send(&session, &request).await {
            Ok(response) => Ok(response),
            Err(e) => {
                self.tunnel.reset_if(&session).await;
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl DeliveryServiceTrait for DeliveryGateway {
    async fn send_sms(&self, to: &str, message: &str) -> bool {
        if !self.sms_is_live() {
            return self.mock.send_sms(to, message).await;
        }

        let started = Instant::now();
        match self.send_sms_live(to, message).await {
            Ok(response) if response.is_success() => {
                tracing::info!(
                    provider = "gateway",
                    phone = %mask_mobile(to),
                    status = response.status_code,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    event = "sms_sent",
                    "SMS accepted by gateway"
                );
                true
            }
            Ok(response) => {
                let rejection = InfrastructureError::GatewayRejected {
                    status: response.status_code,
                    body: response.body,
                };
                tracing::warn!(
                    provider = "gateway",
                    phone = %mask_mobile(to),
                    error = %rejection,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    event = "sms_rejected",
                    "SMS rejected by gateway"
                );
                false
            }
            Err(e) => {
                tracing::error!(
                    provider = "gateway",
                    phone = %mask_mobile(to),
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    event = "sms_failed",
                    "SMS delivery failed"
                );
                false
            }
        }
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> bool {
        let Some(client) = &self.email else {
            return self.mock.send_email(to, subject, body).await;
        };

        match client.send(to, subject, body).await {
            Ok(message_id) => {
                tracing::info!(
                    provider = "email",
                    email = %mask_email(to),
                    message_id = message_id.as_deref().unwrap_or("-"),
                    event = "email_sent",
                    "Email accepted by provider"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    provider = "email",
                    email = %mask_email(to),
                    error = %e,
                    event = "email_failed",
                    "Email delivery failed"
                );
                false
            }
        }
    }
}
