mod file_config;

pub use file_config::FileConfig;

use crate::pipeline::PipelineOptions;
use crate::warehouse::DurationMatch;
use anyhow::{bail, Result};
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub db_path: PathBuf,
    pub duration_tolerance: Option<f64>,
    pub strict: bool,
    pub reset: bool,
    pub no_progress: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub db_path: PathBuf,
    pub reset: bool,
    pub progress_bar: bool,
    pub pipeline: PipelineOptions,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let song_data = file
            .song_data
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.song_data.clone());
        let log_data = file
            .log_data
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.log_data.clone());
        let db_path = file
            .db_path
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.db_path.clone());

        let duration_match = match file.duration_tolerance.or(cli.duration_tolerance) {
            None => DurationMatch::Exact,
            Some(tolerance) if tolerance.is_finite() && tolerance >= 0.0 => {
                DurationMatch::Tolerance(tolerance)
            }
            Some(tolerance) => bail!(
                "duration_tolerance must be a non-negative number of seconds, got {}",
                tolerance
            ),
        };

        let continue_on_error = file.continue_on_error.unwrap_or(!cli.strict);
        let progress_bar = file.progress_bar.unwrap_or(!cli.no_progress);
        let reset = file.reset.unwrap_or(cli.reset);

        Ok(AppConfig {
            song_data,
            log_data,
            db_path,
            reset,
            progress_bar,
            pipeline: PipelineOptions {
                continue_on_error,
                duration_match,
            },
        })
    }
}
