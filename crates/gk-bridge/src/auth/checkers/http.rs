//! External identity service over HTTP
//!
//! The service receives `POST <url>` with a JSON body
//! `{"username": "...", "password": "..."}` and answers `2xx` with
//! `{"authenticated": true|false}`. `401` and `403` are read as a plain
//! rejection; any other status is a verifier failure.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use gk_core::error::{ConfigError, VerifierError};
use gk_core::traits::CredentialsChecker;

#[derive(Serialize)]
struct CheckRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct CheckResponse {
    authenticated: bool,
}

/// Checker delegating to an HTTP identity service
#[derive(Debug, Clone)]
pub struct HttpCredentials {
    url: reqwest::Url,
    client: reqwest::Client,
}

impl HttpCredentials {
    /// Create a checker posting to `url`
    pub fn new(url: &str) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("gatekeeper/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::Invalid(format!("Failed to build HTTP client: {}", e)))?;
        Self::with_client(url, client)
    }

    /// Create a checker using a preconfigured client
    pub fn with_client(url: &str, client: reqwest::Client) -> Result<Self, ConfigError> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| ConfigError::Invalid(format!("Invalid verifier url {}: {}", url, e)))?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl CredentialsChecker for HttpCredentials {
    async fn check(&self, username: &str, password: &str) -> Result<bool, VerifierError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&CheckRequest { username, password })
            .send()
            .await
            .map_err(|e| VerifierError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(VerifierError::UnexpectedStatus(status.as_u16()));
        }

        let body: CheckResponse = response
            .json()
            .await
            .map_err(|e| VerifierError::InvalidResponse(e.to_string()))?;

        Ok(body.authenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    /// Read one HTTP request and return its body
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .filter_map(|l| l.split_once(':'))
                    .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                let body_start = header_end + 4;
                if buf.len() >= body_start + content_length {
                    return String::from_utf8_lossy(&buf[body_start..body_start + content_length])
                        .to_string();
                }
            }
        }

        String::new()
    }

    /// Serve a single canned response; the request body is sent back on the channel
    async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request_body = read_request(&mut socket).await;
            let _ = tx.send(request_body);

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        (format!("http://{}/verify", addr), rx)
    }

    fn checker(url: &str) -> HttpCredentials {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpCredentials::with_client(url, client).unwrap()
    }

    #[tokio::test]
    async fn test_authenticated() {
        let (url, request) = serve_once("200 OK", r#"{"authenticated":true}"#).await;

        assert!(checker(&url).check("alice", "secret").await.unwrap());

        let sent: serde_json::Value = serde_json::from_str(&request.await.unwrap()).unwrap();
        assert_eq!(sent["username"], "alice");
        assert_eq!(sent["password"], "secret");
    }

    #[tokio::test]
    async fn test_not_authenticated() {
        let (url, _request) = serve_once("200 OK", r#"{"authenticated":false}"#).await;
        assert!(!checker(&url).check("alice", "wrong").await.unwrap());
    }

    #[tokio::test]
    async fn test_unauthorized_status_is_rejection() {
        let (url, _request) = serve_once("401 Unauthorized", "{}").await;
        assert!(!checker(&url).check("alice", "wrong").await.unwrap());
    }

    #[tokio::test]
    async fn test_server_error_is_failure() {
        let (url, _request) = serve_once("503 Service Unavailable", "{}").await;
        assert!(matches!(
            checker(&url).check("alice", "secret").await,
            Err(VerifierError::UnexpectedStatus(503))
        ));
    }

    #[tokio::test]
    async fn test_bad_body_is_failure() {
        let (url, _request) = serve_once("200 OK", r#"{"ok":1}"#).await;
        assert!(matches!(
            checker(&url).check("alice", "secret").await,
            Err(VerifierError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = checker(&format!("http://{}/verify", addr))
            .check("alice", "secret")
            .await;
        assert!(matches!(result, Err(VerifierError::Unavailable(_))));
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            HttpCredentials::new("not a url"),
            Err(ConfigError::Invalid(_))
        ));
    }
}
