//! Application event logs: newline-delimited JSON.
//!
//! Only playback events (`page == "NextSong"`) are retained. Every other
//! event is skipped before any field validation, so navigation events with
//! empty user fields never surface as errors.

use crate::error::{EtlError, MalformedRecord};
use crate::warehouse::{Gender, Level, User};
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

pub const NEXT_SONG_PAGE: &str = "NextSong";

/// The raw logs carry `userId` as a string; plain integers are accepted too.
fn user_id_from_number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawUserId {
        Number(i64),
        Text(String),
    }

    match RawUserId::deserialize(deserializer)? {
        RawUserId::Number(id) => Ok(id),
        RawUserId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid userId {:?}", text))),
    }
}

/// A retained playback event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    /// Epoch milliseconds.
    pub ts: i64,
    #[serde(deserialize_with = "user_id_from_number_or_string")]
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub level: Level,
    pub song: String,
    pub artist: String,
    pub length: f64,
    pub session_id: i64,
    pub location: String,
    pub user_agent: String,
}

impl LogEvent {
    pub fn user(&self) -> User {
        User {
            user_id: self.user_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            gender: self.gender,
            level: self.level,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    /// 1-based line number within the file.
    pub line: usize,
    pub event: LogEvent,
}

/// Lazy, single-pass reader over the playback events of one log file.
///
/// Yields `MalformedRecord` for a bad line (invalid UTF-8 included) and keeps
/// going; an IO error ends the sequence after being reported.
pub struct LogReader<R = BufReader<File>> {
    path: PathBuf,
    reader: R,
    line_number: usize,
    skipped: usize,
    failed: bool,
}

impl LogReader {
    pub fn open(path: &Path) -> Result<Self, EtlError> {
        let file = File::open(path).map_err(|source| EtlError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(path, BufReader::new(file)))
    }
}

impl<R: BufRead> LogReader<R> {
    pub fn from_reader(path: &Path, reader: R) -> Self {
        Self {
            path: path.to_path_buf(),
            reader,
            line_number: 0,
            skipped: 0,
            failed: false,
        }
    }

    /// Number of non-playback events discarded so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn malformed(&self, reason: String) -> EtlError {
        MalformedRecord {
            path: self.path.clone(),
            line: self.line_number,
            reason,
        }
        .into()
    }
}

impl<R: BufRead> Iterator for LogReader<R> {
    type Item = Result<LogLine, EtlError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.reader.read_until(b'\n', &mut buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(source) => {
                    self.failed = true;
                    return Some(Err(EtlError::Io {
                        path: self.path.clone(),
                        source,
                    }));
                }
            }
            self.line_number += 1;

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(err) => return Some(Err(self.malformed(format!("invalid UTF-8: {}", err)))),
            };
            if line.trim().is_empty() {
                continue;
            }

            let value: Value = match serde_json::from_str(line) {
                Ok(value) => value,
                Err(err) => return Some(Err(self.malformed(err.to_string()))),
            };
            if value.get("page").and_then(Value::as_str) != Some(NEXT_SONG_PAGE) {
                self.skipped += 1;
                continue;
            }

            return Some(match serde_json::from_value::<LogEvent>(value) {
                Ok(event) => Ok(LogLine {
                    line: self.line_number,
                    event,
                }),
                Err(err) => Err(self.malformed(err.to_string())),
            });
        }
    }
}
