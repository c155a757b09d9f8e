//! Configuration management for netdiag.
//!
//! Persistent settings live in an XDG-compliant JSON file; each scan gets a
//! [`WorkerPoolConfig`] built from those settings and command-line overrides.

mod pool;
mod settings;

pub use pool::{parse_timeout_secs, ProbeTimeouts, WorkerPoolConfig};
pub use settings::{AppSettings, Paths};
