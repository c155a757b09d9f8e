//! Progress bar sink.

use crate::scanner::{OutcomeSink, ProbeKind, ProbeOutcome, TracingSink};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;

const TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Drives an `indicatif` bar and forwards every outcome to [`TracingSink`].
pub struct ProgressSink {
    bar: ProgressBar,
    inner: TracingSink,
}

impl ProgressSink {
    pub fn new() -> Self {
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        Self {
            bar: ProgressBar::new(0).with_style(style),
            inner: TracingSink,
        }
    }

    #[cfg(test)]
    fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            inner: TracingSink,
        }
    }
}

impl Default for ProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeSink for ProgressSink {
    fn begin(&self, kind: ProbeKind, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_message(format!("{kind} probes"));
    }

    fn record(&self, kind: ProbeKind, target: &dyn fmt::Display, outcome: &ProbeOutcome) {
        self.bar.suspend(|| self.inner.record(kind, target, outcome));
        if outcome.is_success() {
            self.bar.set_message(format!("{target}: {outcome}"));
        }
        self.bar.inc(1);
    }

    fn finish(&self, _kind: ProbeKind) {
        self.bar.finish_and_clear();
    }
}
