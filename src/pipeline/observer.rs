//! Progress events emitted by the batch driver.

use super::{SourceKind, SourceReport};
use crate::error::MalformedRecord;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::Path;
use tracing::{info, warn};

pub trait ProgressObserver {
    /// Discovery finished for a source, before any file is processed.
    fn files_found(&mut self, kind: SourceKind, count: usize, root: &Path);

    /// File `index` (1-based) of `total` was handled, committed or skipped.
    fn file_processed(&mut self, kind: SourceKind, index: usize, total: usize, path: &Path);

    /// A record was rejected and skipped. For song files the whole file is skipped.
    fn record_rejected(&mut self, kind: SourceKind, record: &MalformedRecord);

    fn source_finished(&mut self, _kind: SourceKind, _report: &SourceReport) {}
}

/// Renders progress as log lines.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn files_found(&mut self, _kind: SourceKind, count: usize, root: &Path) {
        info!("{} files found in {}", count, root.display());
    }

    fn file_processed(&mut self, _kind: SourceKind, index: usize, total: usize, _path: &Path) {
        info!("{}/{} files processed.", index, total);
    }

    fn record_rejected(&mut self, kind: SourceKind, record: &MalformedRecord) {
        warn!("Skipping {} record: {}", kind, record);
    }

    fn source_finished(&mut self, kind: SourceKind, report: &SourceReport) {
        info!(
            "Finished {} data: {} files committed, {} rejected records",
            kind, report.files_committed, report.records_rejected
        );
    }
}

/// Renders one progress bar per source.
#[derive(Default)]
pub struct ProgressBarObserver {
    bar: Option<ProgressBar>,
    hidden: bool,
}

impl ProgressBarObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks progress without drawing anything.
    pub fn hidden() -> Self {
        Self {
            bar: None,
            hidden: true,
        }
    }

    fn create_progress_bar(&self, len: u64, msg: String) -> ProgressBar {
        let pb = if self.hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(len)
        };
        pb.set_length(len);
        match ProgressStyle::default_bar()
            .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
        {
            Ok(style) => pb.set_style(style.progress_chars("=> ")),
            Err(_) => pb.set_draw_target(ProgressDrawTarget::hidden()),
        }
        pb.set_message(msg);
        pb
    }
}

impl ProgressObserver for ProgressBarObserver {
    fn files_found(&mut self, kind: SourceKind, count: usize, root: &Path) {
        if let Some(previous) = self.bar.take() {
            previous.finish();
        }
        info!("{} files found in {}", count, root.display());
        self.bar = Some(self.create_progress_bar(count as u64, format!("{} data", kind)));
    }

    fn file_processed(&mut self, _kind: SourceKind, index: usize, _total: usize, _path: &Path) {
        if let Some(bar) = &self.bar {
            bar.set_position(index as u64);
        }
    }

    fn record_rejected(&mut self, kind: SourceKind, record: &MalformedRecord) {
        match &self.bar {
            Some(bar) => bar.suspend(|| warn!("Skipping {} record: {}", kind, record)),
            None => warn!("Skipping {} record: {}", kind, record),
        }
    }

    fn source_finished(&mut self, _kind: SourceKind, _report: &SourceReport) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }
}
