//! TenderScout CLI
//!
//! Local execution entry point: runs crawl cycles on demand. Periodic
//! scheduling is left to cron or a service manager.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tenderscout::{
    error::Result,
    models::{Config, TenderStatus},
    notify::LogNotifier,
    pipeline,
    storage::{LocalStore, TenderStore},
};

/// TenderScout - Procurement Portal Watcher
#[derive(Parser, Debug)]
#[command(
    name = "tenderscout",
    version,
    about = "Watches procurement portals for new tender announcements"
)]
struct Cli {
    /// Path to storage directory containing config and data files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one crawl cycle over all configured portals
    Cycle,

    /// Validate configuration files
    Validate,

    /// Show current store info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("TenderScout starting...");

    // Load configuration once; the cycle never re-reads it
    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);

    log::info!("Loaded configuration from {}", cli.storage_dir.display());

    let store = LocalStore::new(&cli.storage_dir);

    match cli.command {
        Command::Cycle => {
            let summary = pipeline::run_cycle(&config, &store, &LogNotifier).await?;

            log::info!("Crawl cycle finished");
            log::info!("  Found:    {}", summary.found);
            log::info!("  New:      {}", summary.new);
            log::info!("  Updated:  {}", summary.updated);
            if summary.portal_failures > 0 {
                log::warn!("  Failed portals: {}", summary.portal_failures);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} portals, {} enabled)",
                config.portals.len(),
                config.portals.iter().filter(|p| p.enabled).count()
            );

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());

            let records = store.load().await?;
            if records.is_empty() {
                log::info!("No tenders stored yet.");
            } else {
                let count_by = |status: TenderStatus| {
                    records.iter().filter(|r| r.status == status).count()
                };
                log::info!("Stored tenders: {}", records.len());
                log::info!("  NEW:         {}", count_by(TenderStatus::New));
                log::info!("  INTERESTING: {}", count_by(TenderStatus::Interesting));
                log::info!("  APPLIED:     {}", count_by(TenderStatus::Applied));
                log::info!("  REJECTED:    {}", count_by(TenderStatus::Rejected));
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
