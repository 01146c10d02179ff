//! Shared constants for end-to-end tests

// ============================================================================
// Song Catalog
// ============================================================================

pub const SONG_1_ID: &str = "SOMZWCG12A8C13C480";
pub const SONG_1_TITLE: &str = "I Didn't Mean To";
pub const SONG_1_DURATION: f64 = 218.93179;

pub const SONG_2_ID: &str = "SOUPIRU12A6D4FA1E1";
pub const SONG_2_TITLE: &str = "Der Kleine Dompfaff";
pub const SONG_2_DURATION: f64 = 152.92036;

pub const ARTIST_1_ID: &str = "ARD7TVE1187B99BFB1";
pub const ARTIST_1_NAME: &str = "Casual";

pub const ARTIST_2_ID: &str = "ARJIE2Y1187B994AB7";
pub const ARTIST_2_NAME: &str = "Line Renaud";

// ============================================================================
// Event Log
// ============================================================================

pub const USER_ID: i64 = 26;

/// 2018-11-02 01:25:34.796 UTC
pub const TS_1: i64 = 1541121934796;

/// 2018-11-02 01:30:12.796 UTC
pub const TS_2: i64 = 1541122212796;

/// 2018-11-02 01:41:53.796 UTC
pub const TS_3: i64 = 1541122913796;
