//! Per-invocation worker pool configuration.

use crate::error::{ConfigError, ConfigResult};
use crate::scanner::ProbeKind;
use std::num::NonZeroUsize;
use std::time::Duration;

/// Timeout for each probe kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTimeouts {
    pub ping: Duration,
    pub connect: Duration,
    pub http: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            ping: Duration::from_secs(1),
            connect: Duration::from_secs(1),
            http: Duration::from_secs(5),
        }
    }
}

impl ProbeTimeouts {
    /// The timeout that applies to `kind`.
    pub fn for_kind(&self, kind: ProbeKind) -> Duration {
        match kind {
            ProbeKind::Ping => self.ping,
            ProbeKind::Connect => self.connect,
            ProbeKind::Http => self.http,
        }
    }

    /// Replace the timeout for one kind.
    pub fn set(&mut self, kind: ProbeKind, timeout: Duration) {
        match kind {
            ProbeKind::Ping => self.ping = timeout,
            ProbeKind::Connect => self.connect = timeout,
            ProbeKind::Http => self.http = timeout,
        }
    }
}

/// Worker cap and timeouts for one scan. Built once, dropped when the scan
/// finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPoolConfig {
    pub max_workers: NonZeroUsize,
    pub timeouts: ProbeTimeouts,
}

impl WorkerPoolConfig {
    /// Worker cap used when neither settings nor flags give one.
    pub const DEFAULT_WORKERS: usize = 64;

    /// Create a configuration with default timeouts. `max_workers` must be
    /// at least 1.
    pub fn new(max_workers: usize) -> ConfigResult<Self> {
        let max_workers = NonZeroUsize::new(max_workers).ok_or(ConfigError::ZeroWorkers)?;
        Ok(Self {
            max_workers,
            timeouts: ProbeTimeouts::default(),
        })
    }

    /// Set all timeouts.
    pub fn with_timeouts(mut self, timeouts: ProbeTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set the timeout for one probe kind.
    pub fn with_timeout(mut self, kind: ProbeKind, timeout: Duration) -> Self {
        self.timeouts.set(kind, timeout);
        self
    }

    /// Set the worker cap.
    pub fn with_workers(mut self, max_workers: NonZeroUsize) -> Self {
        self.max_workers = max_workers;
        self
    }
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            max_workers: NonZeroUsize::new(Self::DEFAULT_WORKERS).unwrap_or(NonZeroUsize::MIN),
            timeouts: ProbeTimeouts::default(),
        }
    }
}

/// Parse a timeout given in (possibly fractional) seconds.
pub fn parse_timeout_secs(value: &str) -> ConfigResult<Duration> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidTimeout(format!("'{value}' is not a number of seconds")))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| ConfigError::InvalidTimeout(format!("'{value}' is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(
            WorkerPoolConfig::new(0),
            Err(ConfigError::ZeroWorkers)
        ));
        assert_eq!(WorkerPoolConfig::new(1).unwrap().max_workers.get(), 1);
    }

    #[test]
    fn test_timeout_per_kind() {
        let config = WorkerPoolConfig::default()
            .with_timeout(ProbeKind::Http, Duration::from_millis(1500));

        assert_eq!(config.max_workers.get(), 64);
        assert_eq!(config.timeouts.for_kind(ProbeKind::Ping), Duration::from_secs(1));
        assert_eq!(
            config.timeouts.for_kind(ProbeKind::Http),
            Duration::from_millis(1500)
        );
    }

    #[test]
    fn test_parse_timeout_secs() {
        assert_eq!(parse_timeout_secs("1.5").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_timeout_secs("2").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_timeout_secs("0").unwrap(), Duration::ZERO);
        assert!(parse_timeout_secs("-1").is_err());
        assert!(parse_timeout_secs("soon").is_err());
    }
}
