//! Error types for netdiag.
//!
//! Uses `thiserror` for ergonomic error definitions. Per-target probe
//! failures are not errors here: they are folded into that target's
//! [`ProbeOutcome`](crate::scanner::ProbeOutcome) so one bad target never
//! aborts a scan.

use crate::types::{PortError, RangeError};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scan invocations.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid range: {0}")]
    InvalidRange(#[from] RangeError),

    #[error("invalid port specification: {0}")]
    InvalidPortSpec(#[from] PortError),

    #[error("cannot resolve host '{host}': {reason}")]
    ResolutionFailed { host: String, reason: String },

    #[error("nothing to probe: {0}")]
    NoTargets(&'static str),

    #[error("scan cancelled after {completed} of {total} probes")]
    Cancelled { completed: usize, total: usize },

    #[error("only {collected} of {total} probes reported an outcome")]
    Incomplete { collected: usize, total: usize },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl ScanError {
    /// Whether the scan was stopped by the caller rather than failing.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Errors raised while loading or validating settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("worker count must be at least 1")]
    ZeroWorkers,

    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
