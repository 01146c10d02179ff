//! Typed records parsed from the two input families.

mod log;
mod song;

pub use log::{LogEvent, LogLine, LogReader, NEXT_SONG_PAGE};
pub use song::{read_song_file, SongRecord};
