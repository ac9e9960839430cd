//! Integration tests for `HttpDomainCheck` against a local fake service.
//!
//! Each test binds a one-shot HTTP responder on an ephemeral port, points the
//! checker at it and inspects both the answer and the request line the
//! checker sent.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use widget_loader::application::{CheckError, DomainCheck};
use widget_loader::infrastructure::domain_check::HttpDomainCheck;

/// Serves exactly one response and returns the request line it received.
async fn one_shot_server(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        String::from_utf8_lossy(&request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });

    (base, handle)
}

/// Direct connection: a proxy from the environment must not intercept
/// loopback traffic.
fn checker(base: &str) -> HttpDomainCheck {
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    HttpDomainCheck::with_client(client, base).unwrap()
}

#[tokio::test]
async fn test_valid_domain_is_trusted() {
    // Arrange
    let (base, server) = one_shot_server("200 OK", r#"{"isValid":true}"#).await;

    // Act
    let result = checker(&base).check("chat.steno.ai").await;

    // Assert
    assert!(result.unwrap());
    let request_line = server.await.unwrap();
    assert_eq!(request_line, "GET /api/v1/domains/check?domain=chat.steno.ai HTTP/1.1");
}

#[tokio::test]
async fn test_explicit_negative_answer() {
    let (base, server) = one_shot_server("200 OK", r#"{"isValid":false}"#).await;

    assert!(!checker(&base).check("evil.example").await.unwrap());
    server.await.unwrap();
}

#[tokio::test]
async fn test_server_error_is_a_status_error() {
    let (base, server) = one_shot_server("500 Internal Server Error", r#"{"isValid":true}"#).await;

    let result = checker(&base).check("chat.steno.ai").await;

    assert!(matches!(result, Err(CheckError::Status(500))));
    server.await.unwrap();
}

#[tokio::test]
async fn test_unexpected_body_is_malformed() {
    let (base, server) = one_shot_server("200 OK", r#"{"valid":"yes"}"#).await;

    let result = checker(&base).check("chat.steno.ai").await;

    assert!(matches!(result, Err(CheckError::Malformed(_))));
    server.await.unwrap();
}

#[tokio::test]
async fn test_connection_refused_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let result = checker(&base).check("chat.steno.ai").await;

    assert!(matches!(result, Err(CheckError::Transport(_))));
}
