//! Probe trait abstraction.
//!
//! A probe checks one target within a timeout and always answers with a
//! [`ProbeOutcome`]; it never returns an error. This lets the worker pool
//! treat every probe kind identically.

use crate::types::Port;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// The three probe kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeKind {
    /// ICMP echo through the system `ping`.
    Ping,
    /// TCP connect to a single port.
    Connect,
    /// HTTP GET.
    Http,
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ping => write!(f, "ping"),
            Self::Connect => write!(f, "connect"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Result of probing exactly one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Host answered the echo request.
    Up,
    /// Host did not answer (non-zero exit, timeout, or `ping` unavailable).
    Down,
    /// TCP handshake completed.
    OpenPort { port: Port },
    /// Connection refused, timed out, or failed otherwise.
    ClosedPort { port: Port },
    /// HTTP response with a status below 400.
    HttpAccessible { status: u16 },
    /// HTTP status of 400 or above, or no response at all.
    HttpFailed {
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        message: String,
    },
    /// The probe itself faulted; captured so the target still gets a result.
    ProbeError { message: String },
}

impl ProbeOutcome {
    /// Whether this outcome is the positive answer for its probe kind.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Up | Self::OpenPort { .. } | Self::HttpAccessible { .. }
        )
    }

    /// Whether the probe faulted instead of producing a verdict.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::ProbeError { .. })
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::OpenPort { port } => write!(f, "port {port} open"),
            Self::ClosedPort { port } => write!(f, "port {port} closed"),
            Self::HttpAccessible { status } => write!(f, "accessible (status={status})"),
            Self::HttpFailed {
                status: Some(status),
                ..
            } => write!(f, "failed (status={status})"),
            Self::HttpFailed {
                status: None,
                message,
            } => write!(f, "failed ({message})"),
            Self::ProbeError { message } => write!(f, "probe error ({message})"),
        }
    }
}

/// A target paired with its outcome and its position in the input list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Probed<T> {
    /// Position of the target in the submitted list.
    pub index: usize,
    pub target: T,
    pub outcome: ProbeOutcome,
}

/// Trait for probe implementations.
///
/// Implementations must release whatever they open (socket, child process,
/// connection) on every path, including when the returned future is dropped
/// before completion.
///
/// # Example
///
/// ```ignore
/// async fn check<P: Probe>(probe: &P, target: &P::Target) -> ProbeOutcome {
///     probe.probe(target, Duration::from_secs(1)).await
/// }
/// ```
#[async_trait]
pub trait Probe: Send + Sync {
    /// What a single unit of work looks like for this probe.
    type Target: fmt::Display + Send + Sync + 'static;

    /// The kind of check this probe performs.
    fn kind(&self) -> ProbeKind;

    /// Probe one target.
    async fn probe(&self, target: &Self::Target, timeout: Duration) -> ProbeOutcome;
}

/// Lifts an async closure into a [`Probe`].
///
/// The closure receives its own clone of the target.
pub struct FnProbe<T, F> {
    kind: ProbeKind,
    f: F,
    _target: std::marker::PhantomData<fn() -> T>,
}

impl<T, F> FnProbe<T, F> {
    /// Wrap `f` as a probe of the given kind.
    pub fn new<Fut>(kind: ProbeKind, f: F) -> Self
    where
        F: Fn(T, Duration) -> Fut,
        Fut: Future<Output = ProbeOutcome>,
    {
        Self {
            kind,
            f,
            _target: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<T, F, Fut> Probe for FnProbe<T, F>
where
    T: Clone + fmt::Display + Send + Sync + 'static,
    F: Fn(T, Duration) -> Fut + Send + Sync,
    Fut: Future<Output = ProbeOutcome> + Send,
{
    type Target = T;

    fn kind(&self) -> ProbeKind {
        self.kind
    }

    async fn probe(&self, target: &T, timeout: Duration) -> ProbeOutcome {
        (self.f)(target.clone(), timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_display() {
        let port = Port::new(22).unwrap();
        assert_eq!(ProbeOutcome::Up.to_string(), "up");
        assert_eq!(ProbeOutcome::OpenPort { port }.to_string(), "port 22 open");
        assert_eq!(
            ProbeOutcome::HttpFailed {
                status: Some(503),
                message: "Service Unavailable".to_string()
            }
            .to_string(),
            "failed (status=503)"
        );
    }

    #[test]
    fn test_outcome_classes() {
        let port = Port::new(80).unwrap();
        assert!(ProbeOutcome::Up.is_success());
        assert!(ProbeOutcome::OpenPort { port }.is_success());
        assert!(!ProbeOutcome::ClosedPort { port }.is_success());
        assert!(ProbeOutcome::ProbeError {
            message: "boom".to_string()
        }
        .is_error());
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let json = serde_json::to_string(&ProbeOutcome::HttpAccessible { status: 200 }).unwrap();
        assert_eq!(json, r#"{"outcome":"http_accessible","status":200}"#);
    }

    #[tokio::test]
    async fn test_fn_probe() {
        let probe = FnProbe::new(ProbeKind::Ping, |host: String, _timeout| async move {
            if host == "up" {
                ProbeOutcome::Up
            } else {
                ProbeOutcome::Down
            }
        });

        assert_eq!(probe.kind(), ProbeKind::Ping);
        let timeout = Duration::from_millis(10);
        assert_eq!(probe.probe(&"up".to_string(), timeout).await, ProbeOutcome::Up);
        assert_eq!(probe.probe(&"x".to_string(), timeout).await, ProbeOutcome::Down);
    }
}
