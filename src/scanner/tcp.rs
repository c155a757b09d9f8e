//! TCP connect probe.
//!
//! Performs a full TCP handshake using the operating system's socket API.
//! Needs no special privileges. The stream is dropped as soon as the
//! handshake completes.

use crate::scanner::traits::{Probe, ProbeKind, ProbeOutcome};
use crate::types::Port;
use async_trait::async_trait;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Why a connection attempt did not complete. Only used for logging; the
/// outcome itself is simply [`ProbeOutcome::ClosedPort`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectFailure {
    Refused,
    TimedOut,
    Unreachable(String),
    Other(String),
}

impl fmt::Display for ConnectFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refused => write!(f, "connection refused"),
            Self::TimedOut => write!(f, "timed out"),
            Self::Unreachable(e) => write!(f, "unreachable: {e}"),
            Self::Other(e) => write!(f, "{e}"),
        }
    }
}

impl From<io::Error> for ConnectFailure {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::ConnectionRefused => Self::Refused,
            io::ErrorKind::TimedOut => Self::TimedOut,
            _ => {
                let text = e.to_string();
                if text.to_lowercase().contains("unreachable") {
                    Self::Unreachable(text)
                } else {
                    Self::Other(text)
                }
            }
        }
    }
}

/// TCP connect probe over already-resolved socket addresses.
///
/// Hostname resolution is the caller's job and happens once per scan, not
/// once per port.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnectProbe;

impl TcpConnectProbe {
    pub fn new() -> Self {
        Self
    }

    /// Attempt to connect to the target address.
    async fn attempt_connect(
        &self,
        addr: SocketAddr,
        connect_timeout: Duration,
    ) -> Result<TcpStream, ConnectFailure> {
        match timeout(connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(ConnectFailure::TimedOut),
        }
    }
}

#[async_trait]
impl Probe for TcpConnectProbe {
    type Target = SocketAddr;

    fn kind(&self) -> ProbeKind {
        ProbeKind::Connect
    }

    async fn probe(&self, addr: &SocketAddr, connect_timeout: Duration) -> ProbeOutcome {
        let Some(port) = Port::new(addr.port()) else {
            return ProbeOutcome::ProbeError {
                message: format!("cannot connect to port 0 on {}", addr.ip()),
            };
        };

        if connect_timeout.is_zero() {
            return ProbeOutcome::ClosedPort { port };
        }

        match self.attempt_connect(*addr, connect_timeout).await {
            Ok(stream) => {
                drop(stream);
                ProbeOutcome::OpenPort { port }
            }
            Err(reason) => {
                tracing::debug!("Connect to {addr} failed: {reason}");
                ProbeOutcome::ClosedPort { port }
            }
        }
    }
}
