//! SQLite-backed star schema store.
//!
//! `SqliteWarehouse` owns the single connection of a run. The batch driver
//! borrows it exclusively and opens one transaction per input file.

use super::models::*;
use super::schema::WAREHOUSE_VERSIONED_SCHEMAS;
use crate::error::EtlError;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use tracing::info;

pub struct SqliteWarehouse {
    conn: Connection,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let latest_version = WAREHOUSE_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &WAREHOUSE_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating warehouse schema at version {}", latest_version);
        let tx = conn.transaction()?;
        latest_schema.create(&tx)?;
        tx.commit()?;
        return Ok(());
    }

    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if db_version < BASE_DB_VERSION as i64 {
        bail!(
            "Database has {} tables but no warehouse schema version (user_version = {})",
            table_count,
            db_version
        );
    }
    let current_version = (db_version - BASE_DB_VERSION as i64) as usize;
    if current_version != latest_version {
        bail!(
            "Unsupported warehouse schema version {}, expected {}",
            current_version,
            latest_version
        );
    }

    latest_schema
        .validate(conn)
        .context("Existing database does not match the warehouse schema")
}

impl SqliteWarehouse {
    /// Opens (or creates) the warehouse database at `db_path`.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref()).with_context(|| {
            format!(
                "Failed to open warehouse database {}",
                db_path.as_ref().display()
            )
        })?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrate_if_needed(&mut conn)?;

        let warehouse = SqliteWarehouse { conn };
        let counts = warehouse.counts()?;
        info!(
            "Opened warehouse: {} songs, {} artists, {} users, {} time rows, {} songplays",
            counts.songs, counts.artists, counts.users, counts.time, counts.songplays
        );
        Ok(warehouse)
    }

    /// Drops and recreates every table.
    pub fn reset(&mut self) -> Result<()> {
        let latest_schema = &WAREHOUSE_VERSIONED_SCHEMAS[WAREHOUSE_VERSIONED_SCHEMAS.len() - 1];
        let tx = self.conn.transaction()?;
        latest_schema.drop_all(&tx)?;
        latest_schema.create(&tx)?;
        tx.commit()?;
        info!("Warehouse tables dropped and recreated");
        Ok(())
    }

    /// Starts the unit of work for one input file. Dropping the returned
    /// transaction without committing rolls the file back.
    pub fn begin_unit(&mut self) -> Result<Transaction<'_>, EtlError> {
        Ok(self.conn.transaction()?)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn close(self) -> Result<(), EtlError> {
        self.conn.close().map_err(|(_, err)| err.into())
    }

    pub fn counts(&self) -> Result<TableCounts, EtlError> {
        let count = |table: &str| -> Result<usize, EtlError> {
            let n: i64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
            Ok(n as usize)
        };
        Ok(TableCounts {
            songs: count("songs")?,
            artists: count("artists")?,
            users: count("users")?,
            time: count("time")?,
            songplays: count("songplays")?,
        })
    }

    pub fn get_song(&self, song_id: &str) -> Result<Option<Song>, EtlError> {
        Ok(self
            .conn
            .query_row(
                "SELECT song_id, title, artist_id, year, duration FROM songs WHERE song_id = ?1",
                params![song_id],
                |row| {
                    Ok(Song {
                        song_id: row.get(0)?,
                        title: row.get(1)?,
                        artist_id: row.get(2)?,
                        year: row.get(3)?,
                        duration: row.get(4)?,
                    })
                },
            )
            .optional()?)
    }

    pub fn get_artist(&self, artist_id: &str) -> Result<Option<Artist>, EtlError> {
        Ok(self
            .conn
            .query_row(
                "SELECT artist_id, name, location, latitude, longitude FROM artists WHERE artist_id = ?1",
                params![artist_id],
                |row| {
                    Ok(Artist {
                        artist_id: row.get(0)?,
                        name: row.get(1)?,
                        location: row.get(2)?,
                        latitude: row.get(3)?,
                        longitude: row.get(4)?,
                    })
                },
            )
            .optional()?)
    }

    pub fn get_user(&self, user_id: i64) -> Result<Option<User>, EtlError> {
        Ok(self
            .conn
            .query_row(
                "SELECT user_id, first_name, last_name, gender, level FROM users WHERE user_id = ?1",
                params![user_id],
                Self::parse_user_row,
            )
            .optional()?)
    }

    /// All fact rows with their surrogate keys, in insertion order.
    pub fn get_songplays(&self) -> Result<Vec<(i64, Songplay)>, EtlError> {
        let mut stmt = self.conn.prepare(
            "SELECT songplay_id, start_time, user_id, level, song_id, artist_id, session_id, location, user_agent
             FROM songplays ORDER BY songplay_id",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, Self::parse_songplay_row(row)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn parse_user_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let gender: String = row.get(3)?;
        let level: String = row.get(4)?;
        Ok(User {
            user_id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            gender: Gender::from_db_str(&gender).ok_or_else(|| invalid_text(3, gender))?,
            level: Level::from_db_str(&level).ok_or_else(|| invalid_text(4, level))?,
        })
    }

    /// Columns 1..=8 of a `songplays` row.
    fn parse_songplay_row(row: &rusqlite::Row) -> rusqlite::Result<Songplay> {
        let level: String = row.get(3)?;
        let song_id: Option<String> = row.get(4)?;
        let artist_id: Option<String> = row.get(5)?;
        Ok(Songplay {
            start_time: row.get(1)?,
            user_id: row.get(2)?,
            level: Level::from_db_str(&level).ok_or_else(|| invalid_text(3, level))?,
            song_artist: song_id
                .zip(artist_id)
                .map(|(song_id, artist_id)| SongArtistRef { song_id, artist_id }),
            session_id: row.get(6)?,
            location: row.get(7)?,
            user_agent: row.get(8)?,
        })
    }
}

fn invalid_text(column: usize, value: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        format!("unexpected value {:?}", value).into(),
    )
}
