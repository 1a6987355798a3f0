use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::core::error::AskError;

/// Body of `POST /ask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub query: String,
}

/// Successful reply. Only `response` is read; anything else is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AskResponse {
    pub response: String,
}

/// Shape of the server's rejection bodies (400 empty query, 429 rate limited).
#[derive(Debug, Deserialize)]
struct ServerError {
    error: String,
}

/// One request/response exchange with the question server.
#[async_trait]
pub trait AskTransport: Send + Sync {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, AskError>;
}

pub struct HttpTransport {
    url: String,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, ask_path: &str, timeout: Option<Duration>) -> Self {
        let url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            ask_path.trim_start_matches('/')
        );
        Self {
            url,
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AskTransport for HttpTransport {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, AskError> {
        let mut builder = self.client.post(&self.url).json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, body_len = body.len(), "ask reply received");

        if !status.is_success() {
            let message = serde_json::from_str::<ServerError>(&body)
                .ok()
                .map(|e| e.error);
            return Err(AskError::Status { status, message });
        }

        Ok(serde_json::from_str::<AskResponse>(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accepts one connection, replies with the given status and body, and
    /// hands back the raw request it read.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);

                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .filter_map(|line| line.split_once(':'))
                        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if raw.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
            }

            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&raw).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn request(query: &str) -> AskRequest {
        AskRequest {
            query: query.to_string(),
        }
    }

    #[test]
    fn url_joins_base_and_path() {
        let transport = HttpTransport::new("http://localhost:5000/", "/ask", None);
        assert_eq!(transport.url(), "http://localhost:5000/ask");

        let transport = HttpTransport::new("http://localhost:5000", "ask", None);
        assert_eq!(transport.url(), "http://localhost:5000/ask");
    }

    #[test]
    fn response_ignores_extra_fields() {
        let reply: AskResponse =
            serde_json::from_str(r#"{"response":"4","source":"faq"}"#).unwrap();
        assert_eq!(reply.response, "4");
    }

    #[tokio::test]
    async fn posts_json_query_to_ask_path() {
        let (base, server) = serve_once("200 OK", r#"{"response":"4"}"#).await;
        let transport = HttpTransport::new(&base, "/ask", None);

        let reply = transport.ask(&request("What is 2+2?")).await.unwrap();
        assert_eq!(reply.response, "4");

        let raw = server.await.unwrap();
        let (head, body) = raw.split_once("\r\n\r\n").unwrap();
        assert!(head.starts_with("POST /ask HTTP/1.1"));
        assert!(head.to_ascii_lowercase().contains("content-type: application/json"));
        let sent: AskRequest = serde_json::from_str(body).unwrap();
        assert_eq!(sent, request("What is 2+2?"));
    }

    #[tokio::test]
    async fn non_json_body_is_decode_error() {
        let (base, server) = serve_once("200 OK", "<html>oops</html>").await;
        let transport = HttpTransport::new(&base, "/ask", None);

        let err = transport.ask(&request("hello")).await.unwrap_err();
        assert!(matches!(err, AskError::Decode(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn missing_or_ill_typed_response_is_decode_error() {
        let (base, server) = serve_once("200 OK", r#"{"answer":"4"}"#).await;
        let transport = HttpTransport::new(&base, "/ask", None);
        let err = transport.ask(&request("hello")).await.unwrap_err();
        assert!(matches!(err, AskError::Decode(_)));
        server.await.unwrap();

        let (base, server) = serve_once("200 OK", r#"{"response":4}"#).await;
        let transport = HttpTransport::new(&base, "/ask", None);
        let err = transport.ask(&request("hello")).await.unwrap_err();
        assert!(matches!(err, AskError::Decode(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn rate_limit_reply_is_status_error_with_message() {
        let (base, server) = serve_once(
            "429 Too Many Requests",
            r#"{"error":"Too many requests. Please wait before trying again."}"#,
        )
        .await;
        let transport = HttpTransport::new(&base, "/ask", None);

        match transport.ask(&request("hello")).await.unwrap_err() {
            AskError::Status { status, message } => {
                assert_eq!(status.as_u16(), 429);
                assert_eq!(
                    message.as_deref(),
                    Some("Too many requests. Please wait before trying again.")
                );
            }
            other => panic!("expected status error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn refused_connection_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(&format!("http://{}", addr), "/ask", None);
        let err = transport.ask(&request("hello")).await.unwrap_err();
        assert!(matches!(err, AskError::Network(_)));
    }
}
