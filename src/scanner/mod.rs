//! Scanner module - coordinates the three scan modes.
//!
//! Each mode expands its input into a target list, runs one probe kind over
//! it with the bounded [`WorkerPool`], and folds the outcomes into a report.
//! Parse and resolution errors abort before any probe runs.

pub mod aggregate;
pub mod cancel;
pub mod http;
pub mod ping;
pub mod pool;
pub mod sink;
pub mod tcp;
pub mod traits;

use crate::config::WorkerPoolConfig;
use crate::error::{ScanError, ScanResult};
use crate::types::{
    expand_cidr, expand_linear_range, parse_ports, parse_url_list, resolve_host,
    validate_range_prefix, Port, RangeError,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

pub use aggregate::{http_checks, live_hosts, open_ports, HttpCheck, OutcomeTally};
pub use cancel::CancelToken;
pub use http::HttpProbe;
pub use ping::PingProbe;
pub use pool::{Interrupted, PoolError, WorkerPool};
pub use sink::{NullSink, OutcomeSink, TracingSink};
pub use tcp::TcpConnectProbe;
pub use traits::{FnProbe, Probe, ProbeKind, ProbeOutcome, Probed};

/// What a scan shares with its caller: the cancellation flag and the sink
/// that receives every outcome.
#[derive(Clone)]
pub struct ScanContext {
    pub cancel: CancelToken,
    pub sink: Arc<dyn OutcomeSink>,
}

impl ScanContext {
    pub fn new(cancel: CancelToken, sink: Arc<dyn OutcomeSink>) -> Self {
        Self { cancel, sink }
    }
}

impl Default for ScanContext {
    fn default() -> Self {
        Self::new(CancelToken::new(), Arc::new(TracingSink))
    }
}

/// Address range for a ping sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepRange {
    /// A CIDR block such as `192.168.1.0/24`.
    Cidr(String),
    /// `prefix + i` for every `i` in `start..=end`, e.g. `10.0.0.` 1..=20.
    Linear { prefix: String, start: u32, end: u32 },
}

impl SweepRange {
    /// Host strings to ping, ascending.
    pub fn expand(&self) -> Result<Vec<String>, RangeError> {
        match self {
            Self::Cidr(cidr) => Ok(expand_cidr(cidr)?
                .into_iter()
                .map(|ip| ip.to_string())
                .collect()),
            Self::Linear { prefix, start, end } => {
                validate_range_prefix(prefix)?;
                expand_linear_range(prefix, *start, *end)
            }
        }
    }
}

impl fmt::Display for SweepRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cidr(cidr) => write!(f, "{cidr}"),
            Self::Linear { prefix, start, end } => write!(f, "{prefix}{start}-{end}"),
        }
    }
}

/// One scan invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanRequest {
    PingSweep(SweepRange),
    PortScan { host: String, ports: String },
    HttpCheck { urls: String },
}

impl ScanRequest {
    /// The probe kind this request runs.
    pub fn kind(&self) -> ProbeKind {
        match self {
            Self::PingSweep(_) => ProbeKind::Ping,
            Self::PortScan { .. } => ProbeKind::Connect,
            Self::HttpCheck { .. } => ProbeKind::Http,
        }
    }
}

/// Wall-clock bounds of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanTiming {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Captures the start of a scan so its timing can be sealed afterwards.
struct Stopwatch {
    started_at: DateTime<Utc>,
    start: Instant,
}

impl Stopwatch {
    fn start() -> Self {
        Self {
            started_at: Utc::now(),
            start: Instant::now(),
        }
    }

    fn stop(self) -> ScanTiming {
        ScanTiming {
            started_at: self.started_at,
            finished_at: Utc::now(),
            duration_ms: u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Result of a ping sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub range: String,
    pub live_hosts: Vec<String>,
    pub tally: OutcomeTally,
    pub probed: Vec<Probed<String>>,
    #[serde(flatten)]
    pub timing: ScanTiming,
}

/// Result of a TCP port scan.
#[derive(Debug, Clone, Serialize)]
pub struct PortScanReport {
    pub host: String,
    pub ip: IpAddr,
    pub open_ports: Vec<Port>,
    pub tally: OutcomeTally,
    pub probed: Vec<Probed<SocketAddr>>,
    #[serde(flatten)]
    pub timing: ScanTiming,
}

/// Result of an HTTP check.
#[derive(Debug, Clone, Serialize)]
pub struct HttpReport {
    pub checks: Vec<HttpCheck>,
    pub tally: OutcomeTally,
    #[serde(flatten)]
    pub timing: ScanTiming,
}

/// Report for any scan mode.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ScanReport {
    PingSweep(SweepReport),
    PortScan(PortScanReport),
    HttpCheck(HttpReport),
}

impl ScanReport {
    pub fn timing(&self) -> &ScanTiming {
        match self {
            Self::PingSweep(r) => &r.timing,
            Self::PortScan(r) => &r.timing,
            Self::HttpCheck(r) => &r.timing,
        }
    }

    pub fn tally(&self) -> OutcomeTally {
        match self {
            Self::PingSweep(r) => r.tally,
            Self::PortScan(r) => r.tally,
            Self::HttpCheck(r) => r.tally,
        }
    }
}

/// Execute one scan request.
pub async fn run_scan(
    request: ScanRequest,
    config: &WorkerPoolConfig,
    ctx: &ScanContext,
) -> ScanResult<ScanReport> {
    match request {
        ScanRequest::PingSweep(range) => ping_sweep(&range, config, ctx)
            .await
            .map(ScanReport::PingSweep),
        ScanRequest::PortScan { host, ports } => port_scan(&host, &ports, config, ctx)
            .await
            .map(ScanReport::PortScan),
        ScanRequest::HttpCheck { urls } => {
            http_check(&urls, config, ctx).await.map(ScanReport::HttpCheck)
        }
    }
}

/// Ping every host in `range` with the system `ping`.
pub async fn ping_sweep(
    range: &SweepRange,
    config: &WorkerPoolConfig,
    ctx: &ScanContext,
) -> ScanResult<SweepReport> {
    ping_sweep_with(PingProbe::new(), range, config, ctx).await
}

/// Ping sweep with a caller-supplied reachability probe.
pub async fn ping_sweep_with<P>(
    probe: P,
    range: &SweepRange,
    config: &WorkerPoolConfig,
    ctx: &ScanContext,
) -> ScanResult<SweepReport>
where
    P: Probe<Target = String> + 'static,
{
    let hosts = range.expand().inspect_err(|e| {
        tracing::error!("Invalid range {range}: {e}");
    })?;
    if hosts.is_empty() {
        return Err(ScanError::NoTargets("the range contains no hosts"));
    }

    let watch = Stopwatch::start();
    tracing::info!("Starting ping sweep for {} hosts in {range}", hosts.len());

    let probed = run_pool(probe, hosts, config, ctx).await?;
    let live = live_hosts(&probed);
    tracing::info!("Ping sweep complete. Live hosts: {}", live.len());

    Ok(SweepReport {
        range: range.to_string(),
        live_hosts: live,
        tally: OutcomeTally::count(&probed),
        probed,
        timing: watch.stop(),
    })
}

/// TCP connect scan of `ports` on `host`.
///
/// The port list is parsed before the host is resolved, and the host is
/// resolved exactly once.
pub async fn port_scan(
    host: &str,
    ports: &str,
    config: &WorkerPoolConfig,
    ctx: &ScanContext,
) -> ScanResult<PortScanReport> {
    let ports = parse_ports(ports)?;
    if ports.is_empty() {
        return Err(ScanError::NoTargets("the port list is empty"));
    }

    let ip = resolve_host(host).await.inspect_err(|e| {
        tracing::error!("{e}");
    })?;

    let watch = Stopwatch::start();
    tracing::info!(
        "Starting port scan on {host} ({ip}) for {} ports",
        ports.len()
    );

    let targets = ports
        .iter()
        .map(|port| SocketAddr::new(ip, port.as_u16()))
        .collect();
    let probed = run_pool(TcpConnectProbe::new(), targets, config, ctx).await?;
    let open = open_ports(&probed);
    tracing::info!(
        "Port scan complete. Open ports: {}",
        open.iter()
            .map(Port::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(PortScanReport {
        host: host.to_string(),
        ip,
        open_ports: open,
        tally: OutcomeTally::count(&probed),
        probed,
        timing: watch.stop(),
    })
}

/// GET every URL in the comma-separated list.
pub async fn http_check(
    urls: &str,
    config: &WorkerPoolConfig,
    ctx: &ScanContext,
) -> ScanResult<HttpReport> {
    let urls = parse_url_list(urls);
    if urls.is_empty() {
        return Err(ScanError::NoTargets("the URL list is empty"));
    }

    let probe = HttpProbe::new()?;
    let watch = Stopwatch::start();
    tracing::info!("Starting HTTP checks for {} URLs", urls.len());

    let probed = run_pool(probe, urls, config, ctx).await?;
    let tally = OutcomeTally::count(&probed);
    tracing::info!("HTTP checks complete");

    Ok(HttpReport {
        checks: http_checks(probed),
        tally,
        timing: watch.stop(),
    })
}

/// Run `probe` over `targets`, mapping pool failures onto [`ScanError`].
async fn run_pool<P>(
    probe: P,
    targets: Vec<P::Target>,
    config: &WorkerPoolConfig,
    ctx: &ScanContext,
) -> ScanResult<Vec<Probed<P::Target>>>
where
    P: Probe + 'static,
{
    let timeout = config.timeouts.for_kind(probe.kind());
    let pool = WorkerPool::new(
        probe,
        config.max_workers,
        timeout,
        ctx.cancel.clone(),
        Arc::clone(&ctx.sink),
    );

    pool.run(targets).await.map_err(|err| match err {
        PoolError::Interrupted(Interrupted { partial, total }) => {
            for probed in partial.iter().filter(|p| p.outcome.is_success()) {
                tracing::info!("Before interruption: {} {}", probed.target, probed.outcome);
            }
            ScanError::Cancelled {
                completed: partial.len(),
                total,
            }
        }
        PoolError::Incomplete { collected, total } => {
            ScanError::Incomplete { collected, total }
        }
    })
}
