//! Error taxonomy of the ETL core.
//!
//! Record-level problems ([`MalformedRecord`]) are recoverable and are handed
//! to the progress observer; everything else aborts the current file and is
//! fatal to the run.

use std::path::PathBuf;
use thiserror::Error;

/// A single input record failed required-field validation or type coercion.
#[derive(Debug, Clone, Error)]
#[error("malformed record in {} (line {line}): {reason}", .path.display())]
pub struct MalformedRecord {
    pub path: PathBuf,
    /// 1-based line number; song files report the parser's line.
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum EtlError {
    #[error(transparent)]
    MalformedRecord(#[from] MalformedRecord),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("cannot discover input files under {}: {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EtlError {
    /// Whether the error only concerns one record and the run may go on.
    pub fn is_record_level(&self) -> bool {
        matches!(self, EtlError::MalformedRecord(_))
    }
}
