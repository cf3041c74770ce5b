//! Email provider client
//!
//! Sends through a JSON HTTP API authenticated with a bearer key. The body is
//! sent both as plain text and as HTML.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use vr_shared::config::EmailConfig;

use crate::InfrastructureError;

#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    html: String,
}

#[derive(Debug, Default, Deserialize)]
struct EmailApiResponse {
    id: Option<String>,
}

/// HTTP client for the outbound email provider
#[derive(Clone)]
pub struct EmailClient {
    http: reqwest::Client,
    api_key: String,
    config: EmailConfig,
}

impl EmailClient {
    /// Create a client
    ///
    /// # Errors
    /// * `InfrastructureError::Config` - `EMAIL_API_KEY` is not set
    /// * `InfrastructureError::Http` - The HTTP client could not be built
    pub fn new(config: EmailConfig) -> Result<Self, InfrastructureError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| InfrastructureError::Config("EMAIL_API_KEY not set".to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { http, api_key, config })
    }

    /// Send one message; returns the provider's message id when it gives one
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<Option<String>, InfrastructureError> {
        let payload = EmailPayload {
            from: &self.config.from_address,
            to: [to],
            subject,
            text: body,
            html: render_html(body),
        };

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(InfrastructureError::Email(format!(
                "provider returned {}: {}",
                status.as_u16(),
                detail
            )));
        }

        let parsed: EmailApiResponse = response.json().await.unwrap_or_default();
        Ok(parsed.id)
    }
}

/// HTML rendering of a plain-text body: escaped, newlines as `<br>`
pub fn render_html(text: &str) -> String {
    let mut html = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => html.push_str("&amp;"),
            '<' => html.push_str("&lt;"),
            '>' => html.push_str("&gt;"),
            '"' => html.push_str("&quot;"),
            '\'' => html.push_str("&#39;"),
            '\n' => html.push_str("<br>"),
            '\r' => {}
            _ => html.push(c),
        }
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_html_escapes_and_breaks_lines() {
        assert_eq!(
            render_html("Code: 123456\r\n<b>Tom & \"Jerry\"</b>"),
            "Code: 123456<br>&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = EmailClient::new(EmailConfig::default());
        assert!(matches!(result, Err(InfrastructureError::Config(_))));
    }
}
