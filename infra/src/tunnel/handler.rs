//! russh client handler with optional host key pinning

use async_trait::async_trait;
use russh::client;
use russh_keys::key::PublicKey;

/// Client-side SSH event handler for the jump host session
pub(crate) struct TunnelHandler {
    host: String,
    /// Expected SHA-256 fingerprint, with or without the `SHA256:` prefix
    pinned_fingerprint: Option<String>,
}

impl TunnelHandler {
    pub(crate) fn new(host: impl Into<String>, pinned_fingerprint: Option<String>) -> Self {
        Self {
            host: host.into(),
            pinned_fingerprint: pinned_fingerprint.map(|f| strip_prefix(&f).to_string()),
        }
    }
}

fn strip_prefix(fingerprint: &str) -> &str {
    fingerprint.trim().trim_start_matches("SHA256:")
}

#[async_trait]
impl client::Handler for TunnelHandler {
    type Error = russh::Error;

    async fn check_server_key(&mut self, server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        let fingerprint = server_public_key.fingerprint();

        match &self.pinned_fingerprint {
            Some(expected) if expected == strip_prefix(&fingerprint) => Ok(true),
            Some(_) => {
                tracing::error!(
                    host = %self.host,
                    fingerprint = %fingerprint,
                    event = "host_key_mismatch",
                    "Jump host key does not match the pinned fingerprint"
                );
                Ok(false)
            }
            None => {
                tracing::info!(
                    host = %self.host,
                    fingerprint = %fingerprint,
                    event = "host_key_accepted",
                    "Accepting jump host key without pin"
                );
                Ok(true)
            }
        }
    }
}
