//! Integration tests for the delivery gateway's live and mock paths

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use vr_core::services::verification::DeliveryServiceTrait;
use vr_infra::{DeliveryGateway, InfrastructureError, TunnelConnection, TunnelError};
use vr_shared::config::{AppConfig, EmailConfig, SmsGatewayConfig, TunnelConfig};

use common::{closing_listener, jump_host, read_http_request, silent_listener, TEST_PRIVATE_KEY_B64};

fn tunnel_config(port: u16) -> TunnelConfig {
    TunnelConfig {
        jump_host: Some("127.0.0.1".to_string()),
        ssh_port: port,
        ssh_user: Some("relay".to_string()),
        private_key: Some(TEST_PRIVATE_KEY_B64.to_string()),
        handshake_timeout_secs: 5,
        ..Default::default()
    }
}

fn live_gateway_config() -> SmsGatewayConfig {
    SmsGatewayConfig {
        tenant_id: Some("tenant".to_string()),
        application_key: Some("app-key".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_unconfigured_channels_use_mock() {
    let gateway = DeliveryGateway::from_app_config(&AppConfig::default()).unwrap();

    assert!(!gateway.sms_is_live());
    assert!(!gateway.email_is_live());
    assert!(gateway.send_sms("+19035550142", "Your code is 482913").await);
    assert!(gateway.send_email("student@example.edu", "Code", "482913").await);

    assert_eq!(gateway.mock().message_count(), 2);
    assert!(!gateway.tunnel().is_ready().await);
}

#[tokio::test]
async fn test_missing_application_key_uses_mock() {
    let (port, accepted) = closing_listener().await;
    let tunnel = TunnelConnection::new(tunnel_config(port)).unwrap();
    let gateway = DeliveryGateway::new(tunnel, SmsGatewayConfig::default(), EmailConfig::default()).unwrap();

    assert!(gateway.send_sms("+19035550142", "hello").await);
    assert_eq!(gateway.mock().message_count(), 1);
    assert_eq!(accepted.load(Ordering::SeqCst), 0);
}

#[test]
fn test_malformed_key_fails_construction() {
    let config = AppConfig {
        tunnel: TunnelConfig {
            jump_host: Some("jump.internal".to_string()),
            ssh_user: Some("relay".to_string()),
            private_key: Some("%%% not base64 %%%".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    let result = DeliveryGateway::from_app_config(&config);
    assert!(matches!(
        result,
        Err(InfrastructureError::Tunnel(TunnelError::MalformedKey(_)))
    ));
}

#[tokio::test]
async fn test_live_sms_handshake_failure_returns_false() {
    let (port, accepted) = closing_listener().await;
    let tunnel = TunnelConnection::new(tunnel_config(port)).unwrap();
    let gateway = DeliveryGateway::new(tunnel, live_gateway_config(), EmailConfig::default()).unwrap();

    assert!(gateway.sms_is_live());
    assert!(!gateway.send_sms("+19035550142", "hello").await);

    assert_eq!(gateway.mock().message_count(), 0);
    assert!(accepted.load(Ordering::SeqCst) >= 1);
    assert!(!gateway.tunnel().is_ready().await);
}

#[tokio::test]
async fn test_concurrent_acquires_share_one_handshake() {
    let (port, accepted) = closing_listener().await;
    let tunnel = TunnelConnection::new(tunnel_config(port)).unwrap();

    let (a, b, c) = tokio::join!(tunnel.acquire(), tunnel.acquire(), tunnel.acquire());
    for result in [a, b, c] {
        assert!(matches!(result, Err(TunnelError::HandshakeFailure(_))));
    }
    assert_eq!(accepted.load(Ordering::SeqCst), 1);

    // A failed attempt is not cached; the next acquire tries again
    assert!(tunnel.acquire().await.is_err());
    assert_eq!(accepted.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_silent_jump_host_hits_handshake_timeout() {
    let port = silent_listener().await;
    let tunnel = TunnelConnection::new(TunnelConfig {
        handshake_timeout_secs: 1,
        ..tunnel_config(port)
    })
    .unwrap();

    let started = Instant::now();
    let result = tunnel.acquire().await;
    assert!(matches!(result, Err(TunnelError::HandshakeFailure(_))));
    assert!(started.elapsed() < Duration::from_secs(5));

    let gateway = DeliveryGateway::new(tunnel, live_gateway_config(), EmailConfig::default()).unwrap();
    assert!(!gateway.send_sms("+19035550142", "hello").await);
    assert!(!gateway.tunnel().is_ready().await);
}

#[tokio::test]
async fn test_live_sms_accepted_reuses_session() {
    let host = jump_host(b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{\"status\":\"queued\"}").await;
    let tunnel = TunnelConnection::new(tunnel_config(host.port)).unwrap();
    let gateway = DeliveryGateway::new(tunnel, live_gateway_config(), EmailConfig::default()).unwrap();

    assert!(gateway.send_sms("+1 (903) 555-0142", "Your code is 482913").await);
    assert!(gateway.send_sms("+19035550142", "Your code is 771204").await);

    assert_eq!(host.session_count(), 1);
    assert!(gateway.tunnel().is_ready().await);
    assert_eq!(gateway.mock().message_count(), 0);

    let requests = host.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].starts_with("POST /api/sms/send HTTP/1.1\r\n"));
    assert!(requests[0].contains("X-Tenant-Id: tenant\r\n"));
    assert!(requests[0].contains("X-Application-Key: app-key\r\n"));
    assert!(requests[0].contains(r#""mobileNumber":"19035550142""#));
    assert!(requests[0].contains(r#""smsMessage":"Your code is 482913""#));
}

#[tokio::test]
async fn test_gateway_rejection_keeps_session() {
    let host = jump_host(b"HTTP/1.1 400 Bad Request\r\n\r\ninvalid mobile number").await;
    let tunnel = TunnelConnection::new(tunnel_config(host.port)).unwrap();
    let gateway = DeliveryGateway::new(tunnel, live_gateway_config(), EmailConfig::default()).unwrap();

    assert!(!gateway.send_sms("+19035550142", "hello").await);
    assert!(gateway.tunnel().is_ready().await);

    assert!(!gateway.send_sms("+19035550142", "hello again").await);
    assert_eq!(host.session_count(), 1);
    assert_eq!(host.requests().len(), 2);
}

#[tokio::test]
async fn test_exchange_failure_drops_session() {
    // Channels are closed without any reply
    let host = jump_host(b"").await;
    let tunnel = TunnelConnection::new(tunnel_config(host.port)).unwrap();
    let gateway = DeliveryGateway::new(tunnel, live_gateway_config(), EmailConfig::default()).unwrap();

    assert!(!gateway.send_sms("+19035550142", "hello").await);
    assert!(!gateway.tunnel().is_ready().await);

    assert!(!gateway.send_sms("+19035550142", "hello").await);
    assert_eq!(host.session_count(), 2);
}

#[tokio::test]
async fn test_reset_if_ignores_replaced_session() {
    let host = jump_host(b"HTTP/1.1 200 OK\r\n\r\nok").await;
    let tunnel = TunnelConnection::new(tunnel_config(host.port)).unwrap();

    let first = tunnel.acquire().await.unwrap();
    assert!(tunnel.reset_if(&first).await);
    assert!(!tunnel.is_ready().await);

    let second = tunnel.acquire().await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));

    // A late failure report for the first session leaves the second alone
    assert!(!tunnel.reset_if(&first).await);
    assert!(tunnel.is_ready().await);
    assert!(Arc::ptr_eq(&second, &tunnel.acquire().await.unwrap()));
    assert_eq!(host.session_count(), 2);

    tunnel.reset().await;
    assert!(!tunnel.is_ready().await);
}

/// Serve one email API request with the given status line and body
async fn email_provider(status_line: &'static str, body: &'static str) -> (u16, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_http_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = tx.send(request);
    });

    (port, rx)
}

fn email_config(port: u16) -> EmailConfig {
    EmailConfig {
        api_key: Some("re_test_key".to_string()),
        api_url: format!("http://127.0.0.1:{}/emails", port),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_live_email_posts_text_and_html() {
    let (port, request) = email_provider("200 OK", r#"{"id":"em_123"}"#).await;
    let tunnel = TunnelConnection::new(TunnelConfig::default()).unwrap();
    let gateway = DeliveryGateway::new(tunnel, SmsGatewayConfig::default(), email_config(port)).unwrap();

    assert!(gateway.email_is_live());
    assert!(
        gateway
            .send_email("student@example.edu", "Your verification code", "Code: 482913\nBye <3")
            .await
    );

    let request = request.await.unwrap();
    let lower = request.to_ascii_lowercase();
    assert!(request.starts_with("POST /emails HTTP/1.1"));
    assert!(lower.contains("authorization: bearer re_test_key"));
    assert!(request.contains(r#""to":["student@example.edu"]"#));
    assert!(request.contains(r#""text":"Code: 482913\nBye <3""#));
    assert!(request.contains(r#""html":"Code: 482913<br>Bye &lt;3""#));
    assert_eq!(gateway.mock().message_count(), 0);
}

#[tokio::test]
async fn test_live_email_provider_error_returns_false() {
    let (port, _request) = email_provider("422 Unprocessable Entity", r#"{"message":"invalid"}"#).await;
    let tunnel = TunnelConnection::new(TunnelConfig::default()).unwrap();
    let gateway = DeliveryGateway::new(tunnel, SmsGatewayConfig::default(), email_config(port)).unwrap();

    assert!(!gateway.send_email("student@example.edu", "Subject", "Body").await);
}
