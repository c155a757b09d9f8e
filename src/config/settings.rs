//! Application settings and paths.
//!
//! Settings live in an XDG-compliant location as JSON. Every field has a
//! default, so a missing file or a partial file is fine.

use super::pool::{ProbeTimeouts, WorkerPoolConfig};
use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/netdiag)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the platform directories. Nothing is created on disk.
    pub fn discover() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "netdiag", "netdiag").ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Maximum number of probes in flight.
    pub workers: usize,
    /// Ping wait in milliseconds.
    pub ping_timeout_ms: u64,
    /// TCP connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// HTTP request timeout in milliseconds.
    pub http_timeout_ms: u64,
    /// Also write debug-level logs to this file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        let timeouts = ProbeTimeouts::default();
        Self {
            workers: WorkerPoolConfig::DEFAULT_WORKERS,
            ping_timeout_ms: millis(timeouts.ping),
            connect_timeout_ms: millis(timeouts.connect),
            http_timeout_ms: millis(timeouts.http),
            log_file: None,
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl AppSettings {
    /// Load settings from the default location, falling back to defaults
    /// when no settings file exists.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::discover()?.settings_file();
        if !file.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that cannot produce a working pool.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }

    /// Per-kind timeouts as durations.
    pub fn timeouts(&self) -> ProbeTimeouts {
        ProbeTimeouts {
            ping: Duration::from_millis(self.ping_timeout_ms),
            connect: Duration::from_millis(self.connect_timeout_ms),
            http: Duration::from_millis(self.http_timeout_ms),
        }
    }

    /// Build the pool configuration for one invocation.
    pub fn pool_config(&self) -> ConfigResult<WorkerPoolConfig> {
        Ok(WorkerPoolConfig::new(self.workers)?.with_timeouts(self.timeouts()))
    }
}
