//! SSH jump host configuration module

use serde::{Deserialize, Serialize};

/// Connection parameters for the SSH jump host fronting the SMS gateway
#[derive(Clone, Deserialize, Serialize)]
pub struct TunnelConfig {
    /// Jump host address
    pub jump_host: Option<String>,

    /// SSH port on the jump host
    pub ssh_port: u16,

    /// SSH login user
    pub ssh_user: Option<String>,

    /// Base64-encoded OpenSSH/PEM private key
    pub private_key: Option<String>,

    /// Expected SHA-256 host key fingerprint; any key is accepted when unset
    #[serde(default)]
    pub host_key_fingerprint: Option<String>,

    /// Ceiling on TCP connect + SSH handshake + authentication, in seconds
    pub handshake_timeout_secs: u64,

    /// Keep-alive probe interval while the session is ready, in seconds
    pub keepalive_interval_secs: u64,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            jump_host: None,
            ssh_port: 22,
            ssh_user: None,
            private_key: None,
            host_key_fingerprint: None,
            handshake_timeout_secs: 30,
            keepalive_interval_secs: 10,
        }
    }
}

impl TunnelConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            jump_host: super::env_opt("SSH_JUMP_HOST"),
            ssh_port: super::env_parse("SSH_PORT", defaults.ssh_port),
            ssh_user: super::env_opt("SSH_USER"),
            private_key: super::env_opt("SSH_PRIVATE_KEY"),
            host_key_fingerprint: super::env_opt("SSH_HOST_KEY_FINGERPRINT"),
            ..defaults
        }
    }

    /// Whether every parameter needed to open a session is present
    pub fn is_configured(&self) -> bool {
        self.jump_host.is_some() && self.ssh_user.is_some() && self.private_key.is_some()
    }
}

// Keeps key material out of logs.
impl std::fmt::Debug for TunnelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunnelConfig")
            .field("jump_host", &self.jump_host)
            .field("ssh_port", &self.ssh_port)
            .field("ssh_user", &self.ssh_user)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("host_key_fingerprint", &self.host_key_fingerprint)
            .field("handshake_timeout_secs", &self.handshake_timeout_secs)
            .field("keepalive_interval_secs", &self.keepalive_interval_secs)
            .finish()
    }
}
