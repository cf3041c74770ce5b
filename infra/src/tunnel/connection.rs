//! Persistent SSH session to the jump host
//!
//! A [`TunnelConnection`] owns at most one live session. It is established
//! lazily on the first [`acquire`](TunnelConnection::acquire), reused while
//! alive, and rebuilt after a remote close or an explicit
//! [`reset`](TunnelConnection::reset). Concurrent callers that arrive while a
//! handshake is running all wait on that same attempt.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::{BoxFuture, FutureExt, Shared};
use russh::client::{self, Handle, Msg};
use russh::{ChannelStream, Disconnect};
use russh_keys::key::KeyPair;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use vr_shared::config::TunnelConfig;

use super::error::TunnelError;
use super::handler::TunnelHandler;

/// Keep-alive probes missed before the session is considered dead
const KEEPALIVE_MAX: usize = 3;

type PendingSession = Shared<BoxFuture<'static, Result<Arc<TunnelSession>, TunnelError>>>;

/// An authenticated SSH session to the jump host
pub struct TunnelSession {
    handle: Handle<TunnelHandler>,
    host: String,
}

impl TunnelSession {
    /// Whether the remote side or the keep-alive has closed the session
    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    /// Jump host this session is connected to
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Open a `direct-tcpip` channel to `host:port` behind the jump host
    pub async fn open_forwarded(&self, host: &str, port: u16) -> Result<ChannelStream<Msg>, TunnelError> {
        let channel = self
            .handle
            .channel_open_direct_tcpip(host, u32::from(port), "127.0.0.1", 0)
            .await
            .map_err(|e| TunnelError::ChannelOpenFailure(e.to_string()))?;

        Ok(channel.into_stream())
    }

    async fn disconnect(&self) {
        if let Err(e) = self
            .handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
        {
            tracing::debug!(host = %self.host, error = %e, "Disconnect on an already closed session");
        }
    }
}

enum TunnelState {
    Disconnected,
    Connecting(PendingSession),
    Ready(Arc<TunnelSession>),
}

struct Slot {
    /// Bumped on every new attempt and on reset; stale attempts do not settle
    generation: u64,
    state: TunnelState,
}

struct Credentials {
    host: String,
    port: u16,
    user: String,
    key: Arc<KeyPair>,
}

struct Inner {
    config: TunnelConfig,
    key: Option<Arc<KeyPair>>,
    ssh_config: Arc<client::Config>,
    slot: Mutex<Slot>,
}

/// Shared handle to the jump host session
#[derive(Clone)]
pub struct TunnelConnection {
    inner: Arc<Inner>,
}

impl TunnelConnection {
    /// Create a connection manager; no network activity happens here
    ///
    /// # Errors
    /// * `TunnelError::MalformedKey` - A private key is configured but is not
    ///   valid base64 or cannot be parsed
    pub fn new(config: TunnelConfig) -> Result<Self, TunnelError> {
        let key = config
            .private_key
            .as_deref()
            .map(decode_private_key)
            .transpose()?
            .map(Arc::new);

        let ssh_config = Arc::new(client::Config {
            keepalive_interval: Some(Duration::from_secs(config.keepalive_interval_secs)),
            keepalive_max: KEEPALIVE_MAX,
            ..Default::default()
        });

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                key,
                ssh_config,
                slot: Mutex::new(Slot {
                    generation: 0,
                    state: TunnelState::Disconnected,
                }),
            }),
        })
    }

    /// Whether jump host, user and a parsed key are all present
    pub fn is_configured(&self) -> bool {
        self.inner.config.is_configured() && self.inner.key.is_some()
    }

    /// Whether a live session is currently cached
    pub async fn is_ready(&self) -> bool {
        let slot = self.inner.slot.lock().await;
        matches!(&slot.state, TunnelState::Ready(session) if !session.is_closed())
    }

    /// Get the live session, establishing it if needed
    ///
    /// # Errors
    /// * `TunnelError::ConfigurationMissing` - Tunnel not configured
    /// * `TunnelError::HandshakeFailure` - Connect, handshake or authentication
    ///   failed or exceeded the handshake timeout
    pub async fn acquire(&self) -> Result<Arc<TunnelSession>, TunnelError> {
        let attempt = {
            let mut slot = self.inner.slot.lock().await;

            if let TunnelState::Ready(session) = &slot.state {
                if !session.is_closed() {
                    return Ok(session.clone());
                }
                tracing::info!(
                    host = %session.host(),
                    event = "tunnel_closed",
                    "Cached SSH session was closed, reconnecting"
                );
                slot.state = TunnelState::Disconnected;
            }

            if let TunnelState::Connecting(attempt) = &slot.state {
                attempt.clone()
            } else {
                let credentials = self.inner.credentials()?;
                slot.generation += 1;
                let attempt = self.spawn_handshake(slot.generation, credentials);
                slot.state = TunnelState::Connecting(attempt.clone());
                attempt
            }
        };

        attempt.await
    }

    /// Tear down the cached session so the next acquire reconnects
    ///
    /// A handshake still in flight is allowed to finish but its session is
    /// discarded.
    pub async fn reset(&self) {
        let previous = {
            let mut slot = self.inner.slot.lock().await;
            slot.generation += 1;
            std::mem::replace(&mut slot.state, TunnelState::Disconnected)
        };

        if let TunnelState::Ready(session) = previous {
            session.disconnect().await;
        }

        tracing::info!(event = "tunnel_reset", "SSH tunnel reset");
    }

    /// Tear down `failed` if it is still the cached session
    ///
    /// A newer session, or a handshake started after `failed` was handed
    /// out, is left alone. Returns whether anything was torn down.
    pub async fn reset_if(&self, failed: &Arc<TunnelSession>) -> bool {
        {
            let mut slot = self.inner.slot.lock().await;
            match &slot.state {
                TunnelState::Ready(current) if Arc::ptr_eq(current, failed) => {
                    slot.generation += 1;
                    slot.state = TunnelState::Disconnected;
                }
                _ => {
                    tracing::debug!(
                        host = %failed.host(),
                        event = "tunnel_reset_skipped",
                        "Failed session is no longer cached"
                    );
                    return false;
                }
            }
        }

        failed.disconnect().await;
        tracing::info!(host = %failed.host(), event = "tunnel_reset", "SSH tunnel reset after failure");
        true
    }

    // The handshake runs on its own task so that callers giving up do not
    // abort it for the others.
    fn spawn_handshake(&self, generation: u64, credentials: Credentials) -> PendingSession {
        let inner = self.inner.clone();
        let task = tokio::spawn(async move {
            let result = inner.establish(credentials).await;
            inner.settle(generation, &result).await;
            result
        });

        async move {
            task.await.unwrap_or_else(|e| {
                Err(TunnelError::HandshakeFailure(format!("handshake task failed: {}", e)))
            })
        }
        .boxed()
        .shared()
    }
}

impl Inner {
    fn credentials(&self) -> Result<Credentials, TunnelError> {
        let host = self
            .config
            .jump_host
            .clone()
            .ok_or_else(|| TunnelError::ConfigurationMissing("SSH_JUMP_HOST is not set".to_string()))?;
        let user = self
            .config
            .ssh_user
            .clone()
            .ok_or_else(|| TunnelError::ConfigurationMissing("SSH_USER is not set".to_string()))?;
        let key = self
            .key
            .clone()
            .ok_or_else(|| TunnelError::ConfigurationMissing("SSH_PRIVATE_KEY is not set".to_string()))?;

        Ok(Credentials {
            host,
            port: self.config.ssh_port,
            user,
            key,
        })
    }

    async fn establish(&self, credentials: Credentials) -> Result<Arc<TunnelSession>, TunnelError> {
        let timeout_secs = self.config.handshake_timeout_secs;
        let started = Instant::now();

        tracing::info!(
            host = %credentials.host,
            port = credentials.port,
            user = %credentials.user,
            event = "tunnel_connecting",
            "Opening SSH tunnel"
        );

        let result = match tokio::time::timeout(Duration::from_secs(timeout_secs), self.connect(&credentials)).await {
            Ok(result) => result,
            Err(_) => Err(TunnelError::HandshakeFailure(format!(
                "no session within {}s",
                timeout_secs
            ))),
        };

        match &result {
            Ok(_) => tracing::info!(
                host = %credentials.host,
                elapsed_ms = started.elapsed().as_millis() as u64,
                event = "tunnel_ready",
                "SSH tunnel established"
            ),
            Err(e) => tracing::warn!(
                host = %credentials.host,
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %e,
                event = "tunnel_handshake_failed",
                "SSH tunnel could not be established"
            ),
        }

        result
    }

    async fn connect(&self, credentials: &Credentials) -> Result<Arc<TunnelSession>, TunnelError> {
        let handler = TunnelHandler::new(
            credentials.host.clone(),
            self.config.host_key_fingerprint.clone(),
        );

        let mut handle = client::connect(
            self.ssh_config.clone(),
            (credentials.host.as_str(), credentials.port),
            handler,
        )
        .await
        .map_err(|e| TunnelError::HandshakeFailure(e.to_string()))?;

        let authenticated = handle
            .authenticate_publickey(credentials.user.clone(), credentials.key.clone())
            .await
            .map_err(|e| TunnelError::HandshakeFailure(e.to_string()))?;

        if !authenticated {
            return Err(TunnelError::HandshakeFailure(format!(
                "public key rejected for user {}",
                credentials.user
            )));
        }

        Ok(Arc::new(TunnelSession {
            handle,
            host: credentials.host.clone(),
        }))
    }

    async fn settle(&self, generation: u64, result: &Result<Arc<TunnelSession>, TunnelError>) {
        let mut slot = self.slot.lock().await;

        if slot.generation != generation {
            drop(slot);
            if let Ok(session) = result {
                session.disconnect().await;
            }
            return;
        }

        slot.state = match result {
            Ok(session) => TunnelState::Ready(session.clone()),
            Err(_) => TunnelState::Disconnected,
        };
    }
}

/// Decode a base64-encoded OpenSSH / PEM private key
pub fn decode_private_key(encoded: &str) -> Result<KeyPair, TunnelError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| TunnelError::MalformedKey(format!("invalid base64: {}", e)))?;
    let pem = String::from_utf8(bytes)
        .map_err(|_| TunnelError::MalformedKey("decoded key is not UTF-8 text".to_string()))?;

    russh_keys::decode_secret_key(&pem, None).map_err(|e| TunnelError::MalformedKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_base64_is_malformed() {
        let config = TunnelConfig {
            private_key: Some("not base64 !!".to_string()),
            ..Default::default()
        };
        assert!(matches!(TunnelConnection::new(config), Err(TunnelError::MalformedKey(_))));
    }

    #[test]
    fn test_unparseable_key_is_malformed() {
        let config = TunnelConfig {
            private_key: Some(STANDARD.encode("-----BEGIN NONSENSE-----")),
            ..Default::default()
        };
        assert!(matches!(TunnelConnection::new(config), Err(TunnelError::MalformedKey(_))));
    }

    #[tokio::test]
    async fn test_acquire_without_configuration() {
        let connection = TunnelConnection::new(TunnelConfig::default()).unwrap();

        assert!(!connection.is_configured());
        let err = connection.acquire().await.err().unwrap();
        assert!(err.is_configuration_missing());
        assert!(!connection.is_ready().await);
    }

    #[tokio::test]
    async fn test_reset_when_disconnected_is_noop() {
        let connection = TunnelConnection::new(TunnelConfig::default()).unwrap();
        connection.reset().await;
        assert!(!connection.is_ready().await);
    }
}
