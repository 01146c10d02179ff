//! Row types of the star schema.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i32,
    /// Seconds.
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Artist {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Gender {
    M,
    F,
}

impl Gender {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::F => "F",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "M" => Some(Gender::M),
            "F" => Some(Gender::F),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Free,
    Paid,
}

impl Level {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Level::Free => "free",
            Level::Paid => "paid",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Level::Free),
            "paid" => Some(Level::Paid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub level: Level,
}

/// Song and artist ids resolved together from one dimension lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongArtistRef {
    pub song_id: String,
    pub artist_id: String,
}

/// A fact row ready to be appended. The surrogate key is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Songplay {
    pub start_time: String,
    pub user_id: i64,
    pub level: Level,
    pub song_artist: Option<SongArtistRef>,
    pub session_id: i64,
    pub location: String,
    pub user_agent: String,
}

impl Songplay {
    pub fn song_id(&self) -> Option<&str> {
        self.song_artist.as_ref().map(|r| r.song_id.as_str())
    }

    pub fn artist_id(&self) -> Option<&str> {
        self.song_artist.as_ref().map(|r| r.artist_id.as_str())
    }
}

/// Row counts of every table in the warehouse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub songs: usize,
    pub artists: usize,
    pub users: usize,
    pub time: usize,
    pub songplays: usize,
}
