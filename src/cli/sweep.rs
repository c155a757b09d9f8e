//! `netdiag ping-sweep`.

use super::parse_secs;
use crate::error::{ScanError, ScanResult};
use crate::scanner::{ScanRequest, SweepRange};
use clap::{ArgGroup, Parser};
use std::time::Duration;

/// Ping every host in a CIDR block or a linear address range.
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("range").required(true).args(["cidr", "network"])))]
pub struct PingSweepCommand {
    /// CIDR block to sweep (e.g., 192.168.1.0/24)
    #[arg(long, value_name = "CIDR")]
    pub cidr: Option<String>,

    /// Address prefix ending with a dot (e.g., 192.168.1.)
    #[arg(long, value_name = "PREFIX", requires_all = ["start", "end"])]
    pub network: Option<String>,

    /// First host number appended to --network
    #[arg(long, value_name = "N", requires = "network")]
    pub start: Option<u32>,

    /// Last host number appended to --network (inclusive)
    #[arg(long, value_name = "N", requires = "network")]
    pub end: Option<u32>,

    /// Seconds to wait for each echo reply
    #[arg(short, long, value_name = "SECS", value_parser = parse_secs)]
    pub timeout: Option<Duration>,
}

impl PingSweepCommand {
    /// The range to sweep.
    pub fn range(&self) -> ScanResult<SweepRange> {
        match (&self.cidr, &self.network, self.start, self.end) {
            (Some(cidr), _, _, _) => Ok(SweepRange::Cidr(cidr.clone())),
            (None, Some(prefix), Some(start), Some(end)) => Ok(SweepRange::Linear {
                prefix: prefix.clone(),
                start,
                end,
            }),
            _ => Err(ScanError::NoTargets(
                "give --cidr, or --network with --start and --end",
            )),
        }
    }

    pub fn request(&self) -> ScanResult<ScanRequest> {
        self.range().map(ScanRequest::PingSweep)
    }
}
