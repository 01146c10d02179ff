//! Batch driver: discovers input files and loads them one unit of work at a time.

mod discovery;
mod driver;
mod observer;

pub use discovery::discover_json_files;
pub use driver::{BatchDriver, PipelineOptions, RunReport, SourceReport};
pub use observer::{ProgressBarObserver, ProgressObserver, TracingObserver};

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Song,
    Log,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Song => write!(f, "song"),
            SourceKind::Log => write!(f, "log"),
        }
    }
}
