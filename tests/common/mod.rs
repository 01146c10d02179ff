//! Common test infrastructure
//!
//! Fixture builders for song and log files, a temporary workspace holding
//! the data roots and the warehouse database, and an observer that records
//! every progress event.

mod constants;
mod fixtures;
mod observer;

pub use constants::*;
pub use fixtures::{log_line, song_json, with_invalid_utf8, write_bytes, write_file, TestWorkspace};
pub use observer::{ObservedEvent, RecordingObserver};
