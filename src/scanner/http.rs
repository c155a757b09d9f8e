//! HTTP accessibility probe.
//!
//! Issues a GET per URL with a request-level timeout. Redirects are followed
//! with the client's standard policy; nothing is retried.

use crate::error::{ScanError, ScanResult};
use crate::scanner::traits::{Probe, ProbeKind, ProbeOutcome};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::error::Error as StdError;
use std::time::Duration;

/// Responses below this status count as accessible.
const FAILURE_STATUS: u16 = 400;

/// HTTP GET probe sharing one client across workers.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// Build a probe with a fresh client.
    ///
    /// Idle connections are not pooled, so every probe's connection is closed
    /// once its response has been read.
    pub fn new() -> ScanResult<Self> {
        let client = ClientBuilder::new()
            .user_agent(concat!("netdiag/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| ScanError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }
}

/// Render an error together with its sources, e.g.
/// `error sending request: connection refused`.
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[async_trait]
impl Probe for HttpProbe {
    type Target = String;

    fn kind(&self) -> ProbeKind {
        ProbeKind::Http
    }

    async fn probe(&self, url: &String, timeout: Duration) -> ProbeOutcome {
        if timeout.is_zero() {
            return ProbeOutcome::HttpFailed {
                status: None,
                message: "timeout must be greater than zero".to_string(),
            };
        }

        match self.client.get(url.as_str()).timeout(timeout).send().await {
            Ok(response) => {
                let status = response.status();
                if status.as_u16() < FAILURE_STATUS {
                    ProbeOutcome::HttpAccessible {
                        status: status.as_u16(),
                    }
                } else {
                    ProbeOutcome::HttpFailed {
                        status: Some(status.as_u16()),
                        message: status.canonical_reason().unwrap_or_default().to_string(),
                    }
                }
            }
            Err(e) => ProbeOutcome::HttpFailed {
                status: e.status().map(|s| s.as_u16()),
                message: describe(&e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single request with the given status line, then close.
    async fn one_shot_server(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn test_accessible_status() {
        let url = one_shot_server("200 OK").await;
        let outcome = HttpProbe::new()
            .unwrap()
            .probe(&url, Duration::from_secs(5))
            .await;
        assert_eq!(outcome, ProbeOutcome::HttpAccessible { status: 200 });
    }

    #[tokio::test]
    async fn test_failing_status() {
        let url = one_shot_server("404 Not Found").await;
        let outcome = HttpProbe::new()
            .unwrap()
            .probe(&url, Duration::from_secs(5))
            .await;
        assert_eq!(
            outcome,
            ProbeOutcome::HttpFailed {
                status: Some(404),
                message: "Not Found".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_connection_error_has_no_status() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let outcome = HttpProbe::new()
            .unwrap()
            .probe(&format!("http://{addr}/"), Duration::from_secs(2))
            .await;

        match outcome {
            ProbeOutcome::HttpFailed { status, message } => {
                assert_eq!(status, None);
                assert!(!message.is_empty());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let outcome = HttpProbe::new()
            .unwrap()
            .probe(&"not a url".to_string(), Duration::from_secs(1))
            .await;
        assert!(matches!(
            outcome,
            ProbeOutcome::HttpFailed { status: None, .. }
        ));
    }
}
