//! Outcome sinks.
//!
//! The pool reports every outcome to a sink handed to it by the caller
//! instead of writing to a process-wide logger. [`TracingSink`] turns the
//! outcomes into `tracing` events; the CLI wraps it to drive a progress bar.

use super::traits::{ProbeKind, ProbeOutcome};
use std::fmt;

/// Receives scan lifecycle notifications from the worker pool.
///
/// `record` is called from worker tasks concurrently and must not block.
pub trait OutcomeSink: Send + Sync {
    /// A scan of `total` targets is about to start.
    fn begin(&self, _kind: ProbeKind, _total: usize) {}

    /// One target has been probed.
    fn record(&self, kind: ProbeKind, target: &dyn fmt::Display, outcome: &ProbeOutcome);

    /// The pool has stopped, either complete or cancelled.
    fn finish(&self, _kind: ProbeKind) {}
}

/// Logs every outcome through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl OutcomeSink for TracingSink {
    fn record(&self, kind: ProbeKind, target: &dyn fmt::Display, outcome: &ProbeOutcome) {
        match outcome {
            ProbeOutcome::Up => tracing::info!("Host UP: {target}"),
            ProbeOutcome::Down => tracing::debug!("Host DOWN: {target}"),
            ProbeOutcome::OpenPort { port } => tracing::info!("Port OPEN: {port}"),
            ProbeOutcome::ClosedPort { port } => tracing::debug!("Port CLOSED: {port}"),
            ProbeOutcome::HttpAccessible { status }
            | ProbeOutcome::HttpFailed {
                status: Some(status),
                ..
            } => tracing::info!("HTTP {target} -> {status}"),
            ProbeOutcome::HttpFailed {
                status: None,
                message,
            } => tracing::warn!("HTTP error for {target}: {message}"),
            ProbeOutcome::ProbeError { message } => {
                tracing::error!("Error during {kind} probe of {target}: {message}")
            }
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl OutcomeSink for NullSink {
    fn record(&self, _kind: ProbeKind, _target: &dyn fmt::Display, _outcome: &ProbeOutcome) {}
}
