use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    pub song_data: Option<String>,
    pub log_data: Option<String>,
    pub db_path: Option<String>,
    /// Seconds; absent means exact duration matching.
    pub duration_tolerance: Option<f64>,
    pub continue_on_error: Option<bool>,
    /// Drop and recreate all tables before loading.
    pub reset: Option<bool>,
    pub progress_bar: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
