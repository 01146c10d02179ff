use anyhow::{Context, Result};
use clap::Parser;
use sparkify_etl::config::{AppConfig, CliConfig, FileConfig};
use sparkify_etl::pipeline::{BatchDriver, ProgressBarObserver, ProgressObserver, TracingObserver};
use sparkify_etl::SqliteWarehouse;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let resolved = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(err) => {
            if err.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(err).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if resolved.is_absolute() {
        return Ok(resolved);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(resolved))
}

#[derive(Parser, Debug)]
#[command(name = "sparkify-etl")]
#[command(about = "Load Sparkify song metadata and event logs into a SQLite star schema")]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Root directory of the song metadata files.
    #[clap(long, default_value = "data/song_data", value_parser = parse_path)]
    pub song_data: PathBuf,

    /// Root directory of the event log files.
    #[clap(long, default_value = "data/log_data", value_parser = parse_path)]
    pub log_data: PathBuf,

    /// Path to the SQLite warehouse database file.
    #[clap(long, default_value = "sparkify.db", value_parser = parse_path)]
    pub db: PathBuf,

    /// Match event length to song duration within this many seconds instead of exactly.
    #[clap(long)]
    pub duration_tolerance: Option<f64>,

    /// Fail the run on the first malformed record instead of skipping it.
    #[clap(long, default_value_t = false)]
    pub strict: bool,

    /// Drop and recreate all tables before loading.
    #[clap(long, default_value_t = false)]
    pub reset: bool,

    /// Log progress lines instead of drawing progress bars.
    #[clap(long, default_value_t = false)]
    pub no_progress: bool,
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        CliConfig {
            song_data: args.song_data.clone(),
            log_data: args.log_data.clone(),
            db_path: args.db.clone(),
            duration_tolerance: args.duration_tolerance,
            strict: args.strict,
            reset: args.reset,
            no_progress: args.no_progress,
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&CliConfig::from(&cli_args), file_config)?;

    info!("Opening warehouse database at {:?}...", config.db_path);
    let mut warehouse = SqliteWarehouse::open(&config.db_path)?;
    if config.reset {
        warehouse.reset()?;
    }

    let mut tracing_observer = TracingObserver;
    let mut bar_observer = ProgressBarObserver::new();
    let observer: &mut dyn ProgressObserver = if config.progress_bar {
        &mut bar_observer
    } else {
        &mut tracing_observer
    };

    let report = BatchDriver::new(&mut warehouse, observer, config.pipeline)
        .run(&config.song_data, &config.log_data)
        .context("ETL run failed")?;

    info!("");
    info!("Load Summary");
    info!("============");
    info!(
        "Song files: {} committed, {} rejected",
        report.songs.files_committed, report.songs.files_rejected
    );
    info!(
        "Log files: {} committed, {} rejected records",
        report.logs.files_committed, report.logs.records_rejected
    );
    info!(
        "Songplays inserted: {} ({} matched to a song, {} unmatched)",
        report.logs.songplays_inserted,
        report.logs.songplays_resolved,
        report.logs.songplays_unresolved
    );
    info!("");
    info!("Database contains:");
    info!("  {} songs", report.counts.songs);
    info!("  {} artists", report.counts.artists);
    info!("  {} users", report.counts.users);
    info!("  {} time rows", report.counts.time);
    info!("  {} songplays", report.counts.songplays);

    warehouse.close()?;
    Ok(())
}
