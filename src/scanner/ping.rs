//! Reachability probe using the system `ping`.
//!
//! Raw ICMP sockets need elevated privileges, so the probe shells out to the
//! platform's ping facility with a single echo request and a bounded wait.
//! The child is killed if the probe is dropped or overruns its deadline.

use crate::scanner::traits::{Probe, ProbeKind, ProbeOutcome};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Extra time granted to the child beyond its own wait before it is killed.
const EXIT_GRACE: Duration = Duration::from_secs(1);

/// ICMP echo probe backed by an external `ping` program.
#[derive(Debug, Clone)]
pub struct PingProbe {
    program: String,
}

impl PingProbe {
    pub fn new() -> Self {
        Self::with_program("ping")
    }

    /// Use a different program with `ping`-compatible arguments and exit codes.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments for a one-packet echo with the given wait.
    pub fn args(host: &str, wait: Duration) -> Vec<String> {
        // ping only accepts whole seconds on unix; never round down to zero.
        let secs = wait.as_secs_f64().ceil().max(1.0) as u64;

        if cfg!(windows) {
            let millis = wait.as_millis().max(1);
            vec!["-n".into(), "1".into(), "-w".into(), millis.to_string(), host.into()]
        } else if cfg!(target_os = "macos") {
            vec!["-c".into(), "1".into(), "-t".into(), secs.to_string(), host.into()]
        } else {
            vec!["-c".into(), "1".into(), "-W".into(), secs.to_string(), host.into()]
        }
    }
}

impl Default for PingProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for PingProbe {
    type Target = String;

    fn kind(&self) -> ProbeKind {
        ProbeKind::Ping
    }

    async fn probe(&self, host: &String, wait: Duration) -> ProbeOutcome {
        if wait.is_zero() {
            return ProbeOutcome::Down;
        }

        let child = Command::new(&self.program)
            .args(Self::args(host, wait))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::debug!("Could not run {} for {host}: {e}", self.program);
                return ProbeOutcome::Down;
            }
        };

        match timeout(wait + EXIT_GRACE, child.wait()).await {
            Ok(Ok(status)) if status.success() => ProbeOutcome::Up,
            Ok(Ok(status)) => {
                tracing::trace!("{} {host} exited with {status}", self.program);
                ProbeOutcome::Down
            }
            Ok(Err(e)) => {
                tracing::debug!("Waiting on {} for {host} failed: {e}", self.program);
                ProbeOutcome::Down
            }
            Err(_) => {
                tracing::debug!("{} for {host} overran its deadline", self.program);
                // kill_on_drop reaps it; start the kill now rather than at drop.
                let _ = child.start_kill();
                ProbeOutcome::Down
            }
        }
    }
}
