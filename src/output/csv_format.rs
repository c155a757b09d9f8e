//! CSV output formatting.

use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Write the report as CSV with one row per result.
pub fn write_csv<W: Write>(report: &ScanReport, out: W) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    match report {
        ScanReport::PingSweep(sweep) => {
            wtr.write_record(["host"])?;
            for host in &sweep.live_hosts {
                wtr.write_record([host])?;
            }
        }
        ScanReport::PortScan(scan) => {
            wtr.write_record(["port"])?;
            for port in &scan.open_ports {
                wtr.write_record([port.to_string()])?;
            }
        }
        ScanReport::HttpCheck(http) => {
            wtr.write_record(["url", "accessible", "status", "message"])?;
            for check in &http.checks {
                wtr.write_record([
                    check.url.as_str(),
                    if check.accessible { "true" } else { "false" },
                    check.status.map_or(String::new(), |s| s.to_string()).as_str(),
                    check.message.as_str(),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{HttpCheck, HttpReport, OutcomeTally, ScanTiming};
    use chrono::Utc;

    #[test]
    fn test_http_rows() {
        let now = Utc::now();
        let report = ScanReport::HttpCheck(HttpReport {
            checks: vec![
                HttpCheck {
                    url: "http://a.test".to_string(),
                    accessible: true,
                    status: Some(200),
                    message: String::new(),
                },
                HttpCheck {
                    url: "http://b.test".to_string(),
                    accessible: false,
                    status: None,
                    message: "connection refused, retry later".to_string(),
                },
            ],
            tally: OutcomeTally::default(),
            timing: ScanTiming {
                started_at: now,
                finished_at: now,
                duration_ms: 0,
            },
        });

        let mut buf = Vec::new();
        write_csv(&report, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "url,accessible,status,message\n\
             http://a.test,true,200,\n\
             http://b.test,false,,\"connection refused, retry later\"\n"
        );
    }
}
