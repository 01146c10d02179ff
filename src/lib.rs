//! Sparkify ETL Library
//!
//! Loads song metadata and application event logs (JSON) into a SQLite star
//! schema: one `songplays` fact table with `songs`, `artists`, `users` and
//! `time` dimensions.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod records;
pub mod sqlite_persistence;
pub mod time_parts;
pub mod warehouse;

// Re-export commonly used types for convenience
pub use error::{EtlError, MalformedRecord};
pub use pipeline::{BatchDriver, PipelineOptions, ProgressObserver, RunReport, SourceKind};
pub use warehouse::SqliteWarehouse;
