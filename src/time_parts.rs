//! Calendar decomposition of playback timestamps.
//!
//! Timestamps are interpreted in UTC. `week` is the ISO-8601 week number and
//! `weekday` counts from Monday (0) to Sunday (6). `year` is the calendar
//! year, so the first days of January may carry week 52 or 53.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};

/// Text layout of `time.start_time` and `songplays.start_time`.
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    pub start_time: NaiveDateTime,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: u32,
}

impl TimeParts {
    /// Returns None when the value is outside the representable date range.
    pub fn from_epoch_millis(millis: i64) -> Option<Self> {
        let start_time = DateTime::from_timestamp_millis(millis)?.naive_utc();
        Some(TimeParts {
            start_time,
            hour: start_time.hour(),
            day: start_time.day(),
            week: start_time.iso_week().week(),
            month: start_time.month(),
            year: start_time.year(),
            weekday: start_time.weekday().num_days_from_monday(),
        })
    }

    /// Primary key of the time dimension.
    pub fn start_time_key(&self) -> String {
        self.start_time.format(START_TIME_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decomposes_known_timestamp() {
        let parts = TimeParts::from_epoch_millis(1541121934796).unwrap();
        assert_eq!(parts.start_time_key(), "2018-11-02 01:25:34.796");
        assert_eq!(parts.hour, 1);
        assert_eq!(parts.day, 2);
        assert_eq!(parts.week, 44);
        assert_eq!(parts.month, 11);
        assert_eq!(parts.year, 2018);
        // Friday
        assert_eq!(parts.weekday, 4);
    }

    #[test]
    fn test_decomposition_is_deterministic() {
        let first = TimeParts::from_epoch_millis(1541121934796).unwrap();
        let second = TimeParts::from_epoch_millis(1541121934796).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_epoch_is_thursday_of_week_one() {
        let parts = TimeParts::from_epoch_millis(0).unwrap();
        assert_eq!(parts.start_time_key(), "1970-01-01 00:00:00.000");
        assert_eq!(parts.weekday, 3);
        assert_eq!(parts.week, 1);
    }

    #[test]
    fn test_iso_week_crosses_year_boundary() {
        // 2021-01-01 12:00:00 UTC is a Friday in ISO week 53 of 2020.
        let parts = TimeParts::from_epoch_millis(1_609_502_400_000).unwrap();
        assert_eq!(parts.year, 2021);
        assert_eq!(parts.month, 1);
        assert_eq!(parts.week, 53);
        assert_eq!(parts.weekday, 4);
    }

    #[test]
    fn test_sunday_is_six() {
        // 2018-11-04 10:00:00 UTC
        let parts = TimeParts::from_epoch_millis(1_541_325_600_000).unwrap();
        assert_eq!(parts.weekday, 6);
        assert_eq!(parts.hour, 10);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        assert!(TimeParts::from_epoch_millis(i64::MAX).is_none());
    }
}
