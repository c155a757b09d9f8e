//! JSON output formatting.

use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Write the report as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write>(report: &ScanReport, mut out: W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{HttpCheck, HttpReport, OutcomeTally, ScanTiming};
    use chrono::Utc;

    #[test]
    fn test_json_report() {
        let now = Utc::now();
        let report = ScanReport::HttpCheck(HttpReport {
            checks: vec![HttpCheck {
                url: "https://example.test".to_string(),
                accessible: true,
                status: Some(204),
                message: String::new(),
            }],
            tally: OutcomeTally {
                total: 1,
                succeeded: 1,
                failed: 0,
                errors: 0,
            },
            timing: ScanTiming {
                started_at: now,
                finished_at: now,
                duration_ms: 12,
            },
        });

        let mut buf = Vec::new();
        write_json(&report, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["mode"], "http-check");
        assert_eq!(value["checks"][0]["status"], 204);
        assert_eq!(value["tally"]["succeeded"], 1);
        assert_eq!(value["duration_ms"], 12);
    }
}
