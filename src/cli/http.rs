//! `netdiag http-check`.

use super::parse_secs;
use crate::scanner::ScanRequest;
use clap::Parser;
use std::time::Duration;

/// GET each URL and report whether it is accessible.
#[derive(Parser, Debug)]
pub struct HttpCheckCommand {
    /// Comma-separated list of URLs
    #[arg(short, long, value_name = "URL[,URL...]")]
    pub urls: String,

    /// Request timeout in seconds
    #[arg(short, long, value_name = "SECS", value_parser = parse_secs)]
    pub timeout: Option<Duration>,
}

impl HttpCheckCommand {
    pub fn request(&self) -> ScanRequest {
        ScanRequest::HttpCheck {
            urls: self.urls.clone(),
        }
    }
}
