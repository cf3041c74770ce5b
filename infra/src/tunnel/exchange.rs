//! Hand-framed HTTP/1.1 exchange over a forwarded channel
//!
//! No HTTP client can be pointed at an SSH channel, so the request is written
//! by hand and the response parsed leniently. One channel carries exactly one
//! request; `Connection: close` makes the gateway end the stream when done.

use once_cell::sync::Lazy;
use regex::Regex;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::connection::TunnelSession;
use super::error::TunnelError;

/// Default end-to-end deadline of one exchange
pub const DEFAULT_EXCHANGE_TIMEOUT_SECS: u64 = 30;

static STATUS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"HTTP/\d\.\d (\d{3})").expect("status line pattern is valid")
});

/// A POST to be sent to the gateway
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub host: String,
    pub port: u16,
    pub path: String,
    /// Extra headers, written in order after `Content-Length`
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl GatewayRequest {
    /// Serialize to the bytes written on the wire
    pub fn to_wire(&self) -> String {
        let mut lines = Vec::with_capacity(self.headers.len() + 6);
        lines.push(format!("POST {} HTTP/1.1", self.path));
        lines.push(format!("Host: {}:{}", self.host, self.port));
        lines.push(format!("Content-Length: {}", self.body.len()));
        for (name, value) in &self.headers {
            lines.push(format!("{}: {}", name, value));
        }
        lines.push("Connection: close".to_string());
        lines.push(String::new());
        lines.push(self.body.clone());
        lines.join("\r\n")
    }
}

/// Status and body of a gateway response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    pub status_code: u16,
    pub body: String,
}

impl GatewayResponse {
    /// Any 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Performs request/response exchanges over tunnel sessions
#[derive(Debug, Clone)]
pub struct TunnelHttpExchange {
    timeout: Duration,
}

impl Default for TunnelHttpExchange {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_EXCHANGE_TIMEOUT_SECS))
    }
}

impl TunnelHttpExchange {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Open a forwarded channel on `session` and run one exchange on it
    ///
    /// The deadline covers channel open, write and read. On timeout the
    /// channel is dropped.
    ///
    /// # Errors
    /// * `TunnelError::ChannelOpenFailure` - The jump host refused the channel
    /// * `TunnelError::ExchangeTimeout` - Deadline exceeded
    /// * `TunnelError::EmptyResponse` - The gateway sent nothing
    /// * `TunnelError::Io` - Stream failed before any byte was received
    pub async fn send(
        &self,
        session: &TunnelSession,
        request: &GatewayRequest,
    ) -> Result<GatewayResponse, TunnelError> {
        self.within_deadline(async {
            let stream = session.open_forwarded(&request.host, request.port).await?;
            exchange_over(Box::pin(stream), request).await
        })
        .await
    }

    /// Run one exchange on an already open stream under the same deadline
    pub async fn exchange<S>(&self, stream: S, request: &GatewayRequest) -> Result<GatewayResponse, TunnelError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.within_deadline(exchange_over(stream, request)).await
    }

    async fn within_deadline<F>(&self, exchange: F) -> Result<GatewayResponse, TunnelError>
    where
        F: Future<Output = Result<GatewayResponse, TunnelError>>,
    {
        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| TunnelError::ExchangeTimeout(self.timeout.as_secs()))?
    }
}

/// Write `request` to `stream` and read the response until end of stream
pub async fn exchange_over<S>(mut stream: S, request: &GatewayRequest) -> Result<GatewayResponse, TunnelError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(request.to_wire().as_bytes()).await?;
    stream.flush().await?;

    let mut received = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => received.extend_from_slice(&buf[..n]),
            // Some gateways reset the channel right after the body
            Err(e) if !received.is_empty() => {
                tracing::debug!(
                    received_bytes = received.len(),
                    error = %e,
                    "Stream error after response bytes, using what was received"
                );
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    parse_response(&received)
}

/// Lenient HTTP/1.1 response parse
///
/// Headers end at the first `\r\n\r\n`, or failing that the first `\n\n`.
/// Without any separator the whole payload is taken as a 200 body. The
/// status defaults to 200 when no status line is found.
pub fn parse_response(raw: &[u8]) -> Result<GatewayResponse, TunnelError> {
    if raw.is_empty() {
        return Err(TunnelError::EmptyResponse);
    }

    let text = String::from_utf8_lossy(raw);

    let split = text
        .find("\r\n\r\n")
        .map(|at| (at, 4))
        .or_else(|| text.find("\n\n").map(|at| (at, 2)));

    let Some((at, separator_len)) = split else {
        return Ok(GatewayResponse {
            status_code: 200,
            body: text.into_owned(),
        });
    };

    let head = &text[..at];
    let status_code = STATUS_LINE
        .captures(head)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(200);

    Ok(GatewayResponse {
        status_code,
        body: text[at + separator_len..].to_string(),
    })
}
