use super::discovery::discover_json_files;
use super::observer::ProgressObserver;
use super::SourceKind;
use crate::error::{EtlError, MalformedRecord};
use crate::records::{read_song_file, LogEvent, LogLine, LogReader};
use crate::time_parts::TimeParts;
use crate::warehouse::{
    DimensionStore, DurationMatch, FactResolver, SqliteWarehouse, TableCounts, WarehouseStore,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    /// Skip malformed records instead of failing the run.
    pub continue_on_error: bool,
    pub duration_match: DurationMatch,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            duration_match: DurationMatch::Exact,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    pub files_found: usize,
    pub files_committed: usize,
    /// Song files skipped because their record was malformed.
    pub files_rejected: usize,
    pub records_loaded: usize,
    pub records_rejected: usize,
    pub songplays_inserted: usize,
    /// Songplays whose song and artist ids were resolved.
    pub songplays_resolved: usize,
    /// Songplays stored with null song and artist ids.
    pub songplays_unresolved: usize,
}

impl SourceReport {
    fn absorb(&mut self, stats: FileStats) {
        self.files_committed += 1;
        self.records_loaded += stats.records_loaded;
        self.records_rejected += stats.records_rejected;
        self.songplays_inserted += stats.songplays_inserted;
        self.songplays_resolved += stats.songplays_resolved;
        self.songplays_unresolved += stats.songplays_unresolved;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub songs: SourceReport,
    pub logs: SourceReport,
    pub counts: TableCounts,
}

#[derive(Debug, Default)]
struct FileStats {
    records_loaded: usize,
    records_rejected: usize,
    songplays_inserted: usize,
    songplays_resolved: usize,
    songplays_unresolved: usize,
}

/// Runs the per-file pipelines against an exclusively borrowed warehouse.
pub struct BatchDriver<'a> {
    warehouse: &'a mut SqliteWarehouse,
    observer: &'a mut dyn ProgressObserver,
    options: PipelineOptions,
    resolver: FactResolver,
}

impl<'a> BatchDriver<'a> {
    pub fn new(
        warehouse: &'a mut SqliteWarehouse,
        observer: &'a mut dyn ProgressObserver,
        options: PipelineOptions,
    ) -> Self {
        Self {
            warehouse,
            observer,
            options,
            resolver: FactResolver::new(options.duration_match),
        }
    }

    /// Loads every song file, then every log file. Both roots are discovered
    /// up front so an unreadable root fails before anything is written.
    pub fn run(&mut self, song_root: &Path, log_root: &Path) -> Result<RunReport, EtlError> {
        let song_files = discover_json_files(song_root)?;
        let log_files = discover_json_files(log_root)?;

        let songs = self.process_files(SourceKind::Song, song_root, &song_files)?;
        let logs = self.process_files(SourceKind::Log, log_root, &log_files)?;

        Ok(RunReport {
            songs,
            logs,
            counts: self.warehouse.counts()?,
        })
    }

    /// Discovers and loads a single source.
    pub fn process_source(&mut self, kind: SourceKind, root: &Path) -> Result<SourceReport, EtlError> {
        let files = discover_json_files(root)?;
        self.process_files(kind, root, &files)
    }

    fn process_files(
        &mut self,
        kind: SourceKind,
        root: &Path,
        files: &[PathBuf],
    ) -> Result<SourceReport, EtlError> {
        let total = files.len();
        self.observer.files_found(kind, total, root);

        let mut report = SourceReport {
            files_found: total,
            ..Default::default()
        };

        for (i, path) in files.iter().enumerate() {
            let tx = self.warehouse.begin_unit()?;
            let outcome = match kind {
                SourceKind::Song => load_song_file(&*tx, path),
                SourceKind::Log => load_log_file(
                    &*tx,
                    path,
                    &self.resolver,
                    self.options.continue_on_error,
                    &mut *self.observer,
                ),
            };

            match outcome {
                Ok(stats) => {
                    tx.commit()?;
                    report.absorb(stats);
                }
                Err(EtlError::MalformedRecord(record)) if self.options.continue_on_error => {
                    drop(tx);
                    self.observer.record_rejected(kind, &record);
                    report.files_rejected += 1;
                    report.records_rejected += 1;
                }
                Err(err) => {
                    error!("Failed to load {} file {}: {}", kind, path.display(), err);
                    info!(
                        "{} of {} {} files committed before the failure",
                        report.files_committed, total, kind
                    );
                    return Err(err);
                }
            }

            self.observer.file_processed(kind, i + 1, total, path);
        }

        self.observer.source_finished(kind, &report);
        Ok(report)
    }
}

/// Song file: artist first, so the song's foreign key resolves.
fn load_song_file<S: DimensionStore + ?Sized>(store: &S, path: &Path) -> Result<FileStats, EtlError> {
    let record = read_song_file(path)?;
    store.upsert_artist(&record.artist())?;
    store.upsert_song(&record.song())?;
    Ok(FileStats {
        records_loaded: 1,
        ..Default::default()
    })
}

fn decode_log_line(
    path: &Path,
    entry: Result<LogLine, EtlError>,
) -> Result<(LogEvent, TimeParts), EtlError> {
    let LogLine { line, event } = entry?;
    match TimeParts::from_epoch_millis(event.ts) {
        Some(time) => Ok((event, time)),
        None => Err(MalformedRecord {
            path: path.to_path_buf(),
            line,
            reason: format!("timestamp {} out of range", event.ts),
        }
        .into()),
    }
}

/// Log file: time and user rows precede the fact row that references them.
fn load_log_file<S: WarehouseStore + ?Sized>(
    store: &S,
    path: &Path,
    resolver: &FactResolver,
    continue_on_error: bool,
    observer: &mut dyn ProgressObserver,
) -> Result<FileStats, EtlError> {
    let mut stats = FileStats::default();

    for entry in LogReader::open(path)? {
        let (event, time) = match decode_log_line(path, entry) {
            Ok(decoded) => decoded,
            Err(EtlError::MalformedRecord(record)) if continue_on_error => {
                observer.record_rejected(SourceKind::Log, &record);
                stats.records_rejected += 1;
                continue;
            }
            Err(err) => return Err(err),
        };

        store.upsert_time(&time)?;
        store.upsert_user(&event.user())?;
        let songplay = resolver.resolve(store, &event, &time)?;
        if songplay.song_artist.is_some() {
            stats.songplays_resolved += 1;
        } else {
            stats.songplays_unresolved += 1;
        }
        store.insert_songplay(&songplay)?;

        stats.records_loaded += 1;
        stats.songplays_inserted += 1;
    }

    Ok(stats)
}
