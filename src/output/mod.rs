//! Output formatting module.
//!
//! Renders a [`ScanReport`] as plain text, JSON, or CSV. Results go to
//! stdout; summaries and diagnostics go to stderr.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::write_csv;
pub use json_format::write_json;
pub use plain::{print_error, print_summary, print_warning, write_plain};

use crate::cli::OutputFormat;
use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Render `report` in the requested format.
pub fn write_report<W: Write>(report: &ScanReport, format: OutputFormat, out: W) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::write_plain(report, out),
        OutputFormat::Json => json_format::write_json(report, out),
        OutputFormat::Csv => csv_format::write_csv(report, out),
    }
}

/// Render `report` to stdout.
pub fn print_report(report: &ScanReport, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(report, format, &mut out)?;
    out.flush()
}
