//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `netdiag ping-sweep --cidr <CIDR>` - Find live hosts
//! - `netdiag port-scan --host <HOST> --ports <SPEC>` - Find open TCP ports
//! - `netdiag http-check --urls <URLS>` - Check URL accessibility

mod http;
mod logging;
mod ports;
mod progress;
mod sweep;

pub use http::HttpCheckCommand;
pub use logging::{init_logging, stderr_level};
pub use ports::PortScanCommand;
pub use progress::ProgressSink;
pub use sweep::PingSweepCommand;

use crate::config::{parse_timeout_secs, AppSettings, WorkerPoolConfig};
use crate::error::{ScanError, ScanResult};
use crate::output;
use crate::scanner::{
    run_scan, CancelToken, OutcomeSink, ProbeKind, ScanContext, ScanRequest, TracingSink,
};
use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use console::Term;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

/// Exit status for a scan stopped with Ctrl-C.
pub const EXIT_CANCELLED: u8 = 130;

/// netdiag - concurrent network reachability probe.
///
/// Sweeps address ranges with ping, scans TCP ports on a host, and checks
/// HTTP endpoints, running many probes in parallel under a worker cap.
#[derive(Parser, Debug)]
#[command(name = "netdiag")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Concurrent ping sweep, port scan and HTTP check", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the summary and all logs below error
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Maximum number of probes in flight
    #[arg(short = 'w', long, global = true, value_name = "N")]
    pub workers: Option<NonZeroUsize>,

    /// Path to a settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also write debug logs to this file
    ///
    /// No log file is written unless this flag or the `log_file` setting is
    /// given. When one is, it receives debug-level output without colors,
    /// appended across runs.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Plain)]
    pub output: OutputFormat,

    /// Show a progress bar while probing
    #[arg(long, global = true)]
    pub progress: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find live hosts with ICMP echo
    #[command(alias = "ping")]
    PingSweep(PingSweepCommand),

    /// Find open TCP ports on a host
    #[command(alias = "ports")]
    PortScan(PortScanCommand),

    /// Check whether URLs answer with a non-error status
    #[command(alias = "http")]
    HttpCheck(HttpCheckCommand),
}

impl Commands {
    /// The core request for this subcommand.
    pub fn request(&self) -> ScanResult<ScanRequest> {
        match self {
            Self::PingSweep(cmd) => cmd.request(),
            Self::PortScan(cmd) => Ok(cmd.request()),
            Self::HttpCheck(cmd) => Ok(cmd.request()),
        }
    }

    /// Probe timeout given on the command line, if any.
    pub fn timeout(&self) -> Option<(ProbeKind, Duration)> {
        match self {
            Self::PingSweep(cmd) => cmd.timeout.map(|t| (ProbeKind::Ping, t)),
            Self::PortScan(cmd) => cmd.timeout.map(|t| (ProbeKind::Connect, t)),
            Self::HttpCheck(cmd) => cmd.timeout.map(|t| (ProbeKind::Http, t)),
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One result per line
    #[default]
    Plain,
    /// JSON report
    Json,
    /// CSV for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// `--timeout` values are seconds, fractions allowed.
fn parse_secs(value: &str) -> Result<Duration, String> {
    parse_timeout_secs(value).map_err(|e| e.to_string())
}

impl Cli {
    /// Settings from `--config`, or from the default location.
    pub fn settings(&self) -> anyhow::Result<AppSettings> {
        match &self.config {
            Some(path) => AppSettings::load_from(path)
                .with_context(|| format!("loading settings from {}", path.display())),
            None => AppSettings::load().context("loading settings"),
        }
    }

    /// Pool configuration: settings first, then command-line overrides.
    pub fn pool_config(&self, settings: &AppSettings) -> anyhow::Result<WorkerPoolConfig> {
        let mut config = settings.pool_config()?;
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some((kind, timeout)) = self.command.timeout() {
            config = config.with_timeout(kind, timeout);
        }
        Ok(config)
    }
}

/// Run the parsed command line and map the result to an exit status.
pub async fn run(cli: Cli) -> ExitCode {
    match execute(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.downcast_ref::<ScanError>()
                .is_some_and(ScanError::is_cancelled)
            {
                output::print_warning(&e.to_string());
                ExitCode::from(EXIT_CANCELLED)
            } else {
                output::print_error(&format!("{e:#}"));
                ExitCode::FAILURE
            }
        }
    }
}

async fn execute(cli: &Cli) -> anyhow::Result<()> {
    let settings = cli.settings()?;
    let log_file = cli.log_file.as_deref().or(settings.log_file.as_deref());
    init_logging(cli.verbose, cli.quiet, log_file)?;

    let config = cli.pool_config(&settings)?;
    let request = cli.command.request()?;
    tracing::debug!(
        "Running {} with {} workers, timeout {:?}",
        request.kind(),
        config.max_workers,
        config.timeouts.for_kind(request.kind())
    );

    let sink: Arc<dyn OutcomeSink> = if cli.progress && !cli.quiet {
        Arc::new(ProgressSink::new())
    } else {
        Arc::new(TracingSink)
    };
    let ctx = ScanContext::new(CancelToken::new(), sink);
    let ctrl_c = ctx.cancel.cancel_on_ctrl_c();

    let report = run_scan(request, &config, &ctx).await;
    ctrl_c.abort();
    let report = report?;

    output::print_report(&report, cli.output).context("writing results")?;
    if !cli.quiet && Term::stderr().is_term() {
        output::print_summary(&report);
    }
    Ok(())
}
