//! Storage capabilities the ETL core depends on.
//!
//! Implemented for `rusqlite::Connection`, so a `Transaction` (which derefs
//! to a connection) can be handed to the loaders as one unit of work.

use super::facts::{DurationMatch, LookupOutcome};
use super::models::{Artist, Song, Songplay, User};
use crate::error::EtlError;
use crate::time_parts::TimeParts;

/// Upserts into the dimension tables. Each call is one atomic statement.
pub trait DimensionStore {
    /// Inserts the song unless its id is already present (first write wins).
    /// Returns true if a row was inserted.
    fn upsert_song(&self, song: &Song) -> Result<bool, EtlError>;

    /// Inserts the artist unless its id is already present (first write wins).
    /// Returns true if a row was inserted.
    fn upsert_artist(&self, artist: &Artist) -> Result<bool, EtlError>;

    /// Inserts the user, or overwrites every non-key column of the existing
    /// row with the incoming values (last write wins).
    fn upsert_user(&self, user: &User) -> Result<(), EtlError>;

    /// Inserts the time row unless its timestamp is already present.
    /// Returns true if a row was inserted.
    fn upsert_time(&self, time: &TimeParts) -> Result<bool, EtlError>;
}

/// Dimension lookups and appends to the fact table.
pub trait FactStore {
    /// Finds the song/artist pair matching title, artist name and duration
    /// against the current dimension contents.
    fn lookup_song_artist(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
        matching: DurationMatch,
    ) -> Result<LookupOutcome, EtlError>;

    /// Appends a fact row and returns its surrogate key.
    fn insert_songplay(&self, songplay: &Songplay) -> Result<i64, EtlError>;
}

pub trait WarehouseStore: DimensionStore + FactStore {}

impl<T: DimensionStore + FactStore + ?Sized> WarehouseStore for T {}
