//! Fixture files for end-to-end tests

use sparkify_etl::SqliteWarehouse;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory holding both data roots and the warehouse file.
pub struct TestWorkspace {
    _dir: TempDir,
    pub song_root: PathBuf,
    pub log_root: PathBuf,
    pub db_path: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let song_root = dir.path().join("song_data");
        let log_root = dir.path().join("log_data");
        fs::create_dir_all(&song_root).expect("Failed to create song root");
        fs::create_dir_all(&log_root).expect("Failed to create log root");
        let db_path = dir.path().join("sparkify.db");
        Self {
            _dir: dir,
            song_root,
            log_root,
            db_path,
        }
    }

    pub fn open_warehouse(&self) -> SqliteWarehouse {
        SqliteWarehouse::open(&self.db_path).expect("Failed to open warehouse")
    }

    #[allow(dead_code)]
    pub fn add_song(&self, rel_path: &str, content: &str) -> PathBuf {
        write_file(&self.song_root, rel_path, content)
    }

    #[allow(dead_code)]
    pub fn add_log(&self, rel_path: &str, lines: &[String]) -> PathBuf {
        let mut content = lines.join("\n");
        content.push('\n');
        write_file(&self.log_root, rel_path, &content)
    }
}

#[allow(dead_code)]
pub fn write_bytes(root: &Path, rel_path: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture dir");
    }
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

/// Replaces the first `#` in `text` with a byte that is never valid UTF-8.
#[allow(dead_code)]
pub fn with_invalid_utf8(text: &str) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    if let Some(marker) = bytes.iter().position(|b| *b == b'#') {
        bytes[marker] = 0xFF;
    }
    bytes
}

pub fn write_file(root: &Path, rel_path: &str, content: &str) -> PathBuf {
    let path = root.join(rel_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture dir");
    }
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

/// One song metadata document, with an empty artist location and no coordinates.
pub fn song_json(
    song_id: &str,
    title: &str,
    artist_id: &str,
    artist_name: &str,
    duration: f64,
) -> String {
    format!(
        r#"{{"num_songs": 1, "artist_id": "{artist_id}", "artist_latitude": null, "artist_longitude": null, "artist_location": "", "artist_name": "{artist_name}", "song_id": "{song_id}", "title": "{title}", "duration": {duration}, "year": 0}}"#
    )
}

/// One event log line. `user_id` is rendered as a JSON string like the
/// application emits it.
pub fn log_line(page: &str, user_id: i64, level: &str, song: &str, artist: &str, length: f64, ts: i64) -> String {
    format!(
        r#"{{"artist":"{artist}","auth":"Logged In","firstName":"Ryan","gender":"M","itemInSession":0,"lastName":"Smith","length":{length},"level":"{level}","location":"San Jose-Sunnyvale-Santa Clara, CA","method":"PUT","page":"{page}","registration":1541016707796.0,"sessionId":583,"song":"{song}","status":200,"ts":{ts},"userAgent":"Mozilla/5.0","userId":"{user_id}"}}"#
    )
}
