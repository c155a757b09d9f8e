//! Plain text output formatting.
//!
//! Result lines are unstyled so they can be piped. The summary written to
//! stderr uses colors when the terminal supports them.

use crate::scanner::ScanReport;
use console::style;
use std::io::{self, Write};

/// One live host, open port, or HTTP check per line.
pub fn write_plain<W: Write>(report: &ScanReport, mut out: W) -> io::Result<()> {
    match report {
        ScanReport::PingSweep(sweep) => {
            for host in &sweep.live_hosts {
                writeln!(out, "{host}")?;
            }
        }
        ScanReport::PortScan(scan) => {
            for port in &scan.open_ports {
                writeln!(out, "{port}")?;
            }
        }
        ScanReport::HttpCheck(http) => {
            for check in &http.checks {
                writeln!(out, "{check}")?;
            }
        }
    }
    Ok(())
}

/// Print a one-line summary of the scan to stderr.
pub fn print_summary(report: &ScanReport) {
    let tally = report.tally();
    let secs = report.timing().duration_ms as f64 / 1000.0;

    let headline = match report {
        ScanReport::PingSweep(sweep) => format!(
            "{} {} live of {} hosts in {}",
            style("Ping sweep:").cyan().bold(),
            style(sweep.live_hosts.len()).green().bold(),
            tally.total,
            sweep.range
        ),
        ScanReport::PortScan(scan) => format!(
            "{} {} open of {} ports on {} ({})",
            style("Port scan:").cyan().bold(),
            style(scan.open_ports.len()).green().bold(),
            tally.total,
            style(&scan.host).white().bold(),
            scan.ip
        ),
        ScanReport::HttpCheck(http) => format!(
            "{} {} of {} URLs accessible",
            style("HTTP check:").cyan().bold(),
            style(tally.succeeded).green().bold(),
            http.checks.len()
        ),
    };

    eprintln!("{headline} {}", style(format!("({secs:.2}s)")).dim());
    if tally.errors > 0 {
        print_warning(&format!("{} probes failed with an error", tally.errors));
    }
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{
        HttpCheck, HttpReport, OutcomeTally, PortScanReport, ScanTiming, SweepReport,
    };
    use crate::types::Port;
    use chrono::Utc;

    fn timing() -> ScanTiming {
        let now = Utc::now();
        ScanTiming {
            started_at: now,
            finished_at: now,
            duration_ms: 0,
        }
    }

    fn render(report: &ScanReport) -> String {
        let mut buf = Vec::new();
        write_plain(report, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_live_hosts_one_per_line() {
        let report = ScanReport::PingSweep(SweepReport {
            range: "10.0.0.0/29".to_string(),
            live_hosts: vec!["10.0.0.1".to_string(), "10.0.0.5".to_string()],
            tally: OutcomeTally::default(),
            probed: Vec::new(),
            timing: timing(),
        });
        assert_eq!(render(&report), "10.0.0.1\n10.0.0.5\n");
    }

    #[test]
    fn test_open_ports_one_per_line() {
        let report = ScanReport::PortScan(PortScanReport {
            host: "localhost".to_string(),
            ip: "127.0.0.1".parse().unwrap(),
            open_ports: vec![Port::new(22).unwrap(), Port::new(8080).unwrap()],
            tally: OutcomeTally::default(),
            probed: Vec::new(),
            timing: timing(),
        });
        assert_eq!(render(&report), "22\n8080\n");
    }

    #[test]
    fn test_http_lines() {
        let report = ScanReport::HttpCheck(HttpReport {
            checks: vec![
                HttpCheck {
                    url: "http://a.test".to_string(),
                    accessible: true,
                    status: Some(301),
                    message: String::new(),
                },
                HttpCheck {
                    url: "http://b.test".to_string(),
                    accessible: false,
                    status: Some(500),
                    message: "Internal Server Error".to_string(),
                },
                HttpCheck {
                    url: "http://c.test".to_string(),
                    accessible: false,
                    status: None,
                    message: "dns error".to_string(),
                },
            ],
            tally: OutcomeTally::default(),
            timing: timing(),
        });
        assert_eq!(
            render(&report),
            "http://a.test OK (status=301)\n\
             http://b.test FAIL (status=500)\n\
             http://c.test ERROR (dns error)\n"
        );
    }

    #[test]
    fn test_empty_report_prints_nothing() {
        let report = ScanReport::PingSweep(SweepReport {
            range: "10.0.0.1-2".to_string(),
            live_hosts: Vec::new(),
            tally: OutcomeTally::default(),
            probed: Vec::new(),
            timing: timing(),
        });
        assert_eq!(render(&report), "");
    }
}
