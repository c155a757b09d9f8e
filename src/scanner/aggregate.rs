//! Result aggregation.
//!
//! Turns the pool's complete `(target, outcome)` set into the per-mode lists
//! callers print: live hosts, open ports, and HTTP check lines.

use super::traits::{ProbeOutcome, Probed};
use crate::types::Port;
use serde::Serialize;
use std::fmt;
use std::net::SocketAddr;

/// Hosts whose outcome was `Up`, in input order.
pub fn live_hosts(results: &[Probed<String>]) -> Vec<String> {
    results
        .iter()
        .filter(|p| p.outcome == ProbeOutcome::Up)
        .map(|p| p.target.clone())
        .collect()
}

/// Ports whose outcome was `OpenPort`, ascending.
pub fn open_ports(results: &[Probed<SocketAddr>]) -> Vec<Port> {
    let mut ports: Vec<Port> = results
        .iter()
        .filter_map(|p| match p.outcome {
            ProbeOutcome::OpenPort { port } => Some(port),
            _ => None,
        })
        .collect();
    ports.sort_unstable();
    ports.dedup();
    ports
}

/// One line of an HTTP check report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpCheck {
    pub url: String,
    pub accessible: bool,
    /// Response status; `None` when no response arrived.
    pub status: Option<u16>,
    /// Transport error or reason phrase; empty for accessible URLs.
    pub message: String,
}

impl HttpCheck {
    fn from_probe(probed: Probed<String>) -> Self {
        let url = probed.target;
        match probed.outcome {
            ProbeOutcome::HttpAccessible { status } => Self {
                url,
                accessible: true,
                status: Some(status),
                message: String::new(),
            },
            ProbeOutcome::HttpFailed { status, message } => Self {
                url,
                accessible: false,
                status,
                message,
            },
            ProbeOutcome::ProbeError { message } => Self {
                url,
                accessible: false,
                status: None,
                message,
            },
            other => Self {
                url,
                accessible: false,
                status: None,
                message: format!("unexpected outcome: {other}"),
            },
        }
    }
}

impl fmt::Display for HttpCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.accessible, self.status) {
            (true, Some(status)) => write!(f, "{} OK (status={status})", self.url),
            (false, Some(status)) if status != 0 => {
                write!(f, "{} FAIL (status={status})", self.url)
            }
            _ => write!(f, "{} ERROR ({})", self.url, self.message),
        }
    }
}

/// Every URL's check result, in input order.
pub fn http_checks(results: Vec<Probed<String>>) -> Vec<HttpCheck> {
    results.into_iter().map(HttpCheck::from_probe).collect()
}

/// Outcome counts for summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeTally {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: usize,
}

impl OutcomeTally {
    pub fn count<'a, T: 'a>(results: impl IntoIterator<Item = &'a Probed<T>>) -> Self {
        results
            .into_iter()
            .fold(Self::default(), |mut tally, probed| {
                tally.total += 1;
                if probed.outcome.is_success() {
                    tally.succeeded += 1;
                } else if probed.outcome.is_error() {
                    tally.errors += 1;
                } else {
                    tally.failed += 1;
                }
                tally
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probed<T>(index: usize, target: T, outcome: ProbeOutcome) -> Probed<T> {
        Probed {
            index,
            target,
            outcome,
        }
    }

    #[test]
    fn test_live_hosts_keep_input_order() {
        let results = vec![
            probed(0, "10.0.0.9".to_string(), ProbeOutcome::Up),
            probed(1, "10.0.0.2".to_string(), ProbeOutcome::Down),
            probed(2, "10.0.0.1".to_string(), ProbeOutcome::Up),
            probed(
                3,
                "10.0.0.4".to_string(),
                ProbeOutcome::ProbeError {
                    message: "boom".to_string(),
                },
            ),
        ];
        assert_eq!(live_hosts(&results), vec!["10.0.0.9", "10.0.0.1"]);
    }

    #[test]
    fn test_open_ports_ascending() {
        let addr = |port: u16| SocketAddr::from(([127, 0, 0, 1], port));
        let open = |port: u16| ProbeOutcome::OpenPort {
            port: Port::new(port).unwrap(),
        };
        let results = vec![
            probed(0, addr(443), open(443)),
            probed(
                1,
                addr(9999),
                ProbeOutcome::ClosedPort {
                    port: Port::new(9999).unwrap(),
                },
            ),
            probed(2, addr(22), open(22)),
        ];
        let ports: Vec<u16> = open_ports(&results).iter().map(|p| p.as_u16()).collect();
        assert_eq!(ports, vec![22, 443]);
    }

    #[test]
    fn test_http_check_lines() {
        let results = vec![
            probed(
                0,
                "https://a.test".to_string(),
                ProbeOutcome::HttpAccessible { status: 200 },
            ),
            probed(
                1,
                "https://b.test".to_string(),
                ProbeOutcome::HttpFailed {
                    status: Some(503),
                    message: "Service Unavailable".to_string(),
                },
            ),
            probed(
                2,
                "https://c.test".to_string(),
                ProbeOutcome::HttpFailed {
                    status: None,
                    message: "connection refused".to_string(),
                },
            ),
            probed(
                3,
                "https://d.test".to_string(),
                ProbeOutcome::ProbeError {
                    message: "probe panicked".to_string(),
                },
            ),
        ];

        let lines: Vec<String> = http_checks(results).iter().map(|c| c.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "https://a.test OK (status=200)",
                "https://b.test FAIL (status=503)",
                "https://c.test ERROR (connection refused)",
                "https://d.test ERROR (probe panicked)",
            ]
        );
    }

    #[test]
    fn test_tally() {
        let results = vec![
            probed(0, 0, ProbeOutcome::Up),
            probed(1, 1, ProbeOutcome::Down),
            probed(2, 2, ProbeOutcome::Down),
            probed(
                3,
                3,
                ProbeOutcome::ProbeError {
                    message: "x".to_string(),
                },
            ),
        ];
        assert_eq!(
            OutcomeTally::count(&results),
            OutcomeTally {
                total: 4,
                succeeded: 1,
                failed: 2,
                errors: 1
            }
        );
    }
}
