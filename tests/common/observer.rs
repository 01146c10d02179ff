use sparkify_etl::pipeline::{ProgressObserver, SourceReport};
use sparkify_etl::{MalformedRecord, SourceKind};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub enum ObservedEvent {
    FilesFound {
        kind: SourceKind,
        count: usize,
    },
    FileProcessed {
        kind: SourceKind,
        index: usize,
        total: usize,
        path: PathBuf,
    },
    RecordRejected {
        kind: SourceKind,
        record: MalformedRecord,
    },
    SourceFinished {
        kind: SourceKind,
    },
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<ObservedEvent>,
}

#[allow(dead_code)] // not every test binary inspects every event kind
impl RecordingObserver {
    pub fn rejected(&self) -> Vec<&MalformedRecord> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ObservedEvent::RecordRejected { record, .. } => Some(record),
                _ => None,
            })
            .collect()
    }

    pub fn processed(&self, kind: SourceKind) -> Vec<(usize, usize)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ObservedEvent::FileProcessed {
                    kind: k,
                    index,
                    total,
                    ..
                } if *k == kind => Some((*index, *total)),
                _ => None,
            })
            .collect()
    }
}

impl ProgressObserver for RecordingObserver {
    fn files_found(&mut self, kind: SourceKind, count: usize, _root: &Path) {
        self.events.push(ObservedEvent::FilesFound { kind, count });
    }

    fn file_processed(&mut self, kind: SourceKind, index: usize, total: usize, path: &Path) {
        self.events.push(ObservedEvent::FileProcessed {
            kind,
            index,
            total,
            path: path.to_path_buf(),
        });
    }

    fn record_rejected(&mut self, kind: SourceKind, record: &MalformedRecord) {
        self.events.push(ObservedEvent::RecordRejected {
            kind,
            record: record.clone(),
        });
    }

    fn source_finished(&mut self, kind: SourceKind, _report: &SourceReport) {
        self.events.push(ObservedEvent::SourceFinished { kind });
    }
}
