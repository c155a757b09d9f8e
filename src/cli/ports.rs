//! `netdiag port-scan`.

use super::parse_secs;
use crate::scanner::ScanRequest;
use clap::Parser;
use std::time::Duration;

/// TCP connect scan of a single host.
#[derive(Parser, Debug)]
pub struct PortScanCommand {
    /// Hostname or IP address to scan
    #[arg(long, value_name = "HOST")]
    pub host: String,

    /// Ports to scan (e.g., "22", "22,80,443", "1-1024", "22,8000-8100")
    #[arg(short, long, value_name = "SPEC")]
    pub ports: String,

    /// Connect timeout per port in seconds
    #[arg(short, long, value_name = "SECS", value_parser = parse_secs)]
    pub timeout: Option<Duration>,
}

impl PortScanCommand {
    pub fn request(&self) -> ScanRequest {
        ScanRequest::PortScan {
            host: self.host.clone(),
            ports: self.ports.clone(),
        }
    }
}
