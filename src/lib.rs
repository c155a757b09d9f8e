//! # netdiag - Concurrent Network Reachability Probe
//!
//! netdiag runs many independent network probes in parallel under a worker
//! cap and reports one outcome per target, in a deterministic order, no
//! matter which probe finishes first.
//!
//! ## Features
//!
//! - **Ping sweep**: CIDR blocks or linear ranges such as `10.0.0.1-254`
//! - **Port scan**: TCP connect scan of a port list like `22,80,8000-8100`
//! - **HTTP check**: GET a list of URLs and classify the status
//! - **Bounded concurrency**: a fixed worker pool with cancellation
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use netdiag::config::WorkerPoolConfig;
//! use netdiag::scanner::{port_scan, ScanContext};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WorkerPoolConfig::new(32)?;
//! let report = port_scan("127.0.0.1", "22,80,443", &config, &ScanContext::default()).await?;
//!
//! for port in &report.open_ports {
//!     println!("{port}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Port and target parsing, CIDR expansion, host resolution
//! - [`scanner`] - Probes, the worker pool, aggregation, and scan modes
//! - [`config`] - Settings file and per-scan pool configuration
//! - [`error`] - Error types
//! - [`output`] - Output formatting
//! - [`cli`] - Command-line front end

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use config::WorkerPoolConfig;
pub use error::{ConfigError, ScanError};
pub use scanner::{
    run_scan, CancelToken, Probe, ProbeKind, ProbeOutcome, Probed, ScanContext, ScanReport,
    ScanRequest, SweepRange, WorkerPool,
};
pub use types::{Port, PortSpec};
