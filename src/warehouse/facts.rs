//! Fact resolution: joins playback events to the song and artist dimensions.

use super::models::{SongArtistRef, Songplay};
use super::trait_def::FactStore;
use crate::error::EtlError;
use crate::records::LogEvent;
use crate::time_parts::TimeParts;
use rusqlite::{params, Connection};
use tracing::debug;

/// How `songs.duration` is compared with the event's `length`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DurationMatch {
    /// Exact float equality.
    #[default]
    Exact,
    /// `|duration - length| <= tolerance`, in seconds.
    Tolerance(f64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Miss,
    Unique(SongArtistRef),
    /// Several pairs matched; holds the first by `(song_id, artist_id)`.
    Ambiguous(SongArtistRef),
}

impl LookupOutcome {
    pub fn into_ref(self) -> Option<SongArtistRef> {
        match self {
            LookupOutcome::Miss => None,
            LookupOutcome::Unique(r) | LookupOutcome::Ambiguous(r) => Some(r),
        }
    }
}

// LIMIT 2 is enough to tell a unique match from an ambiguous one.
const LOOKUP_EXACT_SQL: &str = "SELECT s.song_id, a.artist_id
     FROM songs s JOIN artists a ON s.artist_id = a.artist_id
     WHERE s.title = ?1 AND a.name = ?2 AND s.duration = ?3
     ORDER BY s.song_id, a.artist_id
     LIMIT 2";

const LOOKUP_TOLERANCE_SQL: &str = "SELECT s.song_id, a.artist_id
     FROM songs s JOIN artists a ON s.artist_id = a.artist_id
     WHERE s.title = ?1 AND a.name = ?2 AND ABS(s.duration - ?3) <= ?4
     ORDER BY s.song_id, a.artist_id
     LIMIT 2";

const INSERT_SONGPLAY_SQL: &str = "INSERT INTO songplays
     (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

fn song_artist_from_row(row: &rusqlite::Row) -> rusqlite::Result<SongArtistRef> {
    Ok(SongArtistRef {
        song_id: row.get(0)?,
        artist_id: row.get(1)?,
    })
}

impl FactStore for Connection {
    fn lookup_song_artist(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
        matching: DurationMatch,
    ) -> Result<LookupOutcome, EtlError> {
        let mut matches: Vec<SongArtistRef> = match matching {
            DurationMatch::Exact => self
                .prepare_cached(LOOKUP_EXACT_SQL)?
                .query_map(params![title, artist_name, duration], song_artist_from_row)?
                .collect::<rusqlite::Result<_>>()?,
            DurationMatch::Tolerance(tolerance) => self
                .prepare_cached(LOOKUP_TOLERANCE_SQL)?
                .query_map(params![title, artist_name, duration, tolerance], song_artist_from_row)?
                .collect::<rusqlite::Result<_>>()?,
        };

        let ambiguous = matches.len() > 1;
        matches.truncate(1);
        Ok(match (matches.pop(), ambiguous) {
            (None, _) => LookupOutcome::Miss,
            (Some(first), false) => LookupOutcome::Unique(first),
            (Some(first), true) => LookupOutcome::Ambiguous(first),
        })
    }

    fn insert_songplay(&self, songplay: &Songplay) -> Result<i64, EtlError> {
        self.prepare_cached(INSERT_SONGPLAY_SQL)?.execute(params![
            songplay.start_time,
            songplay.user_id,
            songplay.level.as_db_str(),
            songplay.song_id(),
            songplay.artist_id(),
            songplay.session_id,
            songplay.location,
            songplay.user_agent,
        ])?;
        Ok(self.last_insert_rowid())
    }
}

/// Builds fact rows from playback events.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactResolver {
    matching: DurationMatch,
}

impl FactResolver {
    pub fn new(matching: DurationMatch) -> Self {
        Self { matching }
    }

    /// Looks up the song/artist pair of the event and returns the fact row.
    /// A miss leaves both ids null.
    pub fn resolve<S: FactStore + ?Sized>(
        &self,
        store: &S,
        event: &LogEvent,
        time: &TimeParts,
    ) -> Result<Songplay, EtlError> {
        let outcome =
            store.lookup_song_artist(&event.song, &event.artist, event.length, self.matching)?;
        if let LookupOutcome::Ambiguous(first) = &outcome {
            debug!(
                "Several songs match {:?} by {:?} ({}s), using {}",
                event.song, event.artist, event.length, first.song_id
            );
        }

        Ok(Songplay {
            start_time: time.start_time_key(),
            user_id: event.user_id,
            level: event.level,
            song_artist: outcome.into_ref(),
            session_id: event.session_id,
            location: event.location.clone(),
            user_agent: event.user_agent.clone(),
        })
    }
}
