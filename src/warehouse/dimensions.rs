//! Dimension loading with per-table conflict policies.
//!
//! `songs`, `artists` and `time` keep the first row written for a key;
//! `users` takes the latest values, since `level` changes between events.

use super::models::{Artist, Song, User};
use super::trait_def::DimensionStore;
use crate::error::EtlError;
use crate::time_parts::TimeParts;
use rusqlite::{params, Connection};

const INSERT_SONG_SQL: &str = "INSERT INTO songs (song_id, title, artist_id, year, duration)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT(song_id) DO NOTHING";

const INSERT_ARTIST_SQL: &str = "INSERT INTO artists (artist_id, name, location, latitude, longitude)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT(artist_id) DO NOTHING";

const UPSERT_USER_SQL: &str = "INSERT INTO users (user_id, first_name, last_name, gender, level)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT(user_id) DO UPDATE SET
        first_name = excluded.first_name,
        last_name = excluded.last_name,
        gender = excluded.gender,
        level = excluded.level";

const INSERT_TIME_SQL: &str = "INSERT INTO time (start_time, hour, day, week, month, year, weekday)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
     ON CONFLICT(start_time) DO NOTHING";

impl DimensionStore for Connection {
    fn upsert_song(&self, song: &Song) -> Result<bool, EtlError> {
        let inserted = self.prepare_cached(INSERT_SONG_SQL)?.execute(params![
            song.song_id,
            song.title,
            song.artist_id,
            song.year,
            song.duration,
        ])?;
        Ok(inserted > 0)
    }

    fn upsert_artist(&self, artist: &Artist) -> Result<bool, EtlError> {
        let inserted = self.prepare_cached(INSERT_ARTIST_SQL)?.execute(params![
            artist.artist_id,
            artist.name,
            artist.location,
            artist.latitude,
            artist.longitude,
        ])?;
        Ok(inserted > 0)
    }

    fn upsert_user(&self, user: &User) -> Result<(), EtlError> {
        self.prepare_cached(UPSERT_USER_SQL)?.execute(params![
            user.user_id,
            user.first_name,
            user.last_name,
            user.gender.as_db_str(),
            user.level.as_db_str(),
        ])?;
        Ok(())
    }

    fn upsert_time(&self, time: &TimeParts) -> Result<bool, EtlError> {
        let inserted = self.prepare_cached(INSERT_TIME_SQL)?.execute(params![
            time.start_time_key(),
            time.hour,
            time.day,
            time.week,
            time.month,
            time.year,
            time.weekday,
        ])?;
        Ok(inserted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::models::{Gender, Level};
    use crate::warehouse::SqliteWarehouse;

    fn artist(id: &str, name: &str) -> Artist {
        Artist {
            artist_id: id.to_string(),
            name: name.to_string(),
            location: None,
            latitude: None,
            longitude: None,
        }
    }

    fn song(id: &str, title: &str, artist_id: &str) -> Song {
        Song {
            song_id: id.to_string(),
            title: title.to_string(),
            artist_id: artist_id.to_string(),
            year: 2001,
            duration: 180.5,
        }
    }

    fn user(id: i64, level: Level) -> User {
        User {
            user_id: id,
            first_name: "Lily".to_string(),
            last_name: "Koch".to_string(),
            gender: Gender::F,
            level,
        }
    }

    #[test]
    fn test_song_and_artist_first_write_wins() {
        let warehouse = SqliteWarehouse::open_in_memory().unwrap();
        let conn = warehouse.connection();

        assert!(conn.upsert_artist(&artist("A1", "Original")).unwrap());
        assert!(!conn.upsert_artist(&artist("A1", "Renamed")).unwrap());
        assert!(conn.upsert_song(&song("S1", "First", "A1")).unwrap());
        assert!(!conn.upsert_song(&song("S1", "Second", "A1")).unwrap());

        assert_eq!(warehouse.get_artist("A1").unwrap().unwrap().name, "Original");
        assert_eq!(warehouse.get_song("S1").unwrap().unwrap().title, "First");
        let counts = warehouse.counts().unwrap();
        assert_eq!((counts.songs, counts.artists), (1, 1));
    }

    #[test]
    fn test_user_last_write_wins() {
        let warehouse = SqliteWarehouse::open_in_memory().unwrap();
        let conn = warehouse.connection();

        conn.upsert_user(&user(15, Level::Free)).unwrap();
        let mut upgraded = user(15, Level::Paid);
        upgraded.last_name = "Koch-Smith".to_string();
        conn.upsert_user(&upgraded).unwrap();

        let stored = warehouse.get_user(15).unwrap().unwrap();
        assert_eq!(stored.level, Level::Paid);
        assert_eq!(stored.last_name, "Koch-Smith");
        assert_eq!(warehouse.counts().unwrap().users, 1);
    }

    #[test]
    fn test_time_insert_is_idempotent() {
        let warehouse = SqliteWarehouse::open_in_memory().unwrap();
        let conn = warehouse.connection();
        let time = TimeParts::from_epoch_millis(1541121934796).unwrap();

        assert!(conn.upsert_time(&time).unwrap());
        assert!(!conn.upsert_time(&time).unwrap());
        assert_eq!(warehouse.counts().unwrap().time, 1);
    }

    #[test]
    fn test_song_with_unknown_artist_is_storage_error() {
        let warehouse = SqliteWarehouse::open_in_memory().unwrap();
        let result = warehouse
            .connection()
            .upsert_song(&song("S1", "Orphan", "nobody"));
        assert!(matches!(result, Err(EtlError::Storage(_))));
    }
}
