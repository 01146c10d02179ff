//! Song metadata files: one JSON object per file.

use crate::error::{EtlError, MalformedRecord};
use crate::warehouse::{Artist, Song};
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// Present-but-nullable field. Unlike a plain `Option`, a missing key is an error.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i32,
    pub duration: f64,
    pub artist_name: String,
    #[serde(deserialize_with = "nullable")]
    pub artist_location: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub artist_latitude: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    pub artist_longitude: Option<f64>,
}

impl SongRecord {
    pub fn song(&self) -> Song {
        Song {
            song_id: self.song_id.clone(),
            title: self.title.clone(),
            artist_id: self.artist_id.clone(),
            year: self.year,
            duration: self.duration,
        }
    }

    pub fn artist(&self) -> Artist {
        Artist {
            artist_id: self.artist_id.clone(),
            name: self.artist_name.clone(),
            location: self
                .artist_location
                .as_ref()
                .filter(|location| !location.is_empty())
                .cloned(),
            latitude: self.artist_latitude,
            longitude: self.artist_longitude,
        }
    }
}

/// Reads a song file. Any validation failure, invalid UTF-8 included,
/// rejects the whole file.
pub fn read_song_file(path: &Path) -> Result<SongRecord, EtlError> {
    let content = std::fs::read(path).map_err(|source| EtlError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&content).map_err(|err| {
        MalformedRecord {
            path: path.to_path_buf(),
            line: err.line(),
            reason: err.to_string(),
        }
        .into()
    })
}
