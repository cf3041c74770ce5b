//! Tunnel error types

/// Failures of the tunnel and of exchanges over it
///
/// `Clone` so that a single failed handshake can be handed to every caller
/// that was waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TunnelError {
    /// Jump host, SSH user or private key not configured
    #[error("Tunnel configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Private key is not valid base64 or not a parseable key
    #[error("Malformed SSH private key: {0}")]
    MalformedKey(String),

    /// TCP connect, SSH handshake or authentication failed or timed out
    #[error("SSH handshake failed: {0}")]
    HandshakeFailure(String),

    /// The forwarded channel to the gateway could not be opened
    #[error("Failed to open forwarded channel: {0}")]
    ChannelOpenFailure(String),

    /// The exchange did not complete within its deadline
    #[error("Gateway exchange timed out after {0}s")]
    ExchangeTimeout(u64),

    /// The gateway closed the channel without sending anything
    #[error("Gateway returned an empty response")]
    EmptyResponse,

    /// Read or write failure on the channel
    #[error("Tunnel I/O error: {0}")]
    Io(String),
}

impl TunnelError {
    /// Whether the error means the tunnel is not configured at all
    pub fn is_configuration_missing(&self) -> bool {
        matches!(self, TunnelError::ConfigurationMissing(_))
    }
}

impl From<std::io::Error> for TunnelError {
    fn from(e: std::io::Error) -> Self {
        TunnelError::Io(e.to_string())
    }
}
