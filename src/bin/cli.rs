//! Campus Notifier CLI
//!
//! Intended to be run on a schedule (cron, CI workflow). Each invocation does
//! one pass and exits.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use notifier::{
    error::Result,
    models::Config,
    pipeline,
    services::{FallbackProvider, build_notifier},
    storage::{LocalStorage, SnapshotStore},
};

/// Campus Notifier - academic calendar and notice board alerts
#[derive(Parser, Debug)]
#[command(
    name = "notifier",
    version,
    about = "Academic calendar digests and new-notice alerts for Telegram"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "storage/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log messages instead of sending them
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send today's calendar digest
    Calendar {
        /// Override the reference day (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Announce new notice board postings
    Notices,

    /// Run: Calendar + Notices
    Run,

    /// Validate configuration file
    Validate,

    /// Show snapshot info
    Info,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Snapshot file, relative paths resolved against the config file's directory.
fn snapshot_store(config: &Config, config_path: &Path) -> LocalStorage {
    let path = Path::new(&config.notices.snapshot_path);
    if path.is_absolute() {
        return LocalStorage::new(path);
    }
    let base = config_path.parent().unwrap_or_else(|| Path::new("."));
    LocalStorage::new(base.join(path))
}

async fn calendar(config: &Config, dry_run: bool, today: Option<NaiveDate>) -> Result<()> {
    let today = today.unwrap_or_else(|| config.calendar.today_at(Utc::now()));
    let provider = FallbackProvider::from_config(
        &config.source,
        config.renderer.as_ref(),
        config.calendar.render_marker.clone(),
    )?;
    let notifier = build_notifier(&config.telegram, &config.source, dry_run)?;

    pipeline::run_calendar(config, &provider, notifier.as_ref(), today).await?;
    Ok(())
}

async fn notices(config: &Config, dry_run: bool, store: &dyn SnapshotStore) -> Result<()> {
    let provider = FallbackProvider::from_config(
        &config.source,
        config.renderer.as_ref(),
        config.notices.render_marker.clone(),
    )?;
    let notifier = build_notifier(&config.telegram, &config.source, dry_run)?;

    pipeline::run_postings(config, &provider, store, notifier.as_ref()).await?;
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    let mut config = match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", cli.config.display());
            config
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                cli.config.display(),
                e
            );
            Config::default()
        }
    };
    config.apply_env();

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    let store = snapshot_store(&config, &cli.config);

    match cli.command {
        Command::Calendar { today } => {
            calendar(&config, cli.dry_run, today).await?;
        }

        Command::Notices => {
            notices(&config, cli.dry_run, &store).await?;
        }

        Command::Run => {
            // Both paths run even if the first fails
            let calendar_result = calendar(&config, cli.dry_run, None).await;
            if let Err(e) = &calendar_result {
                log::error!("Calendar run failed: {}", e);
            }
            let notices_result = notices(&config, cli.dry_run, &store).await;
            if let Err(e) = &notices_result {
                log::error!("Notice run failed: {}", e);
            }
            calendar_result.and(notices_result)?;
        }

        Command::Validate => {
            log::info!("✓ Config OK");
            log::info!(
                "  {} calendar strategies, {} row selectors, {} categories",
                config.calendar.strategies.len(),
                config.notices.row_selectors.len(),
                config.notices.categories.len()
            );
            if !config.telegram.is_configured() {
                log::warn!("Telegram credentials missing; messages will only be logged");
            }
        }

        Command::Info => {
            log::info!("Calendar: {}", config.calendar.endpoint);
            log::info!("Notices: {}", config.notices.endpoint);
            log::info!("Snapshot: {}", store.location());
            match store.load().await? {
                Some(snapshot) => log::info!("Seen postings: {}", snapshot.len()),
                None => log::info!("No snapshot found yet."),
            }
            log::info!(
                "Today ({:+}h): {}",
                config.calendar.utc_offset_hours,
                config.calendar.today_at(Utc::now())
            );
        }
    }

    log::info!("Done!");

    Ok(())
}
