//! Entry point of the campsite availability watcher.
//! Runs one scan over every configured park and reports changes to Telegram.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use campground_scan::{RunSummary, ScanExecutor, ScanExecutorConfig, SnapshotStore};
use clap::Parser;
use notification_services::TelegramService;
use reserve_america::{CookieSessionProvider, SessionFetcher};

mod config;
use config::{Cli, Settings, load_park_queries};

async fn run(cli: Cli, settings: Settings) -> Result<RunSummary> {
    let parks = load_park_queries(&settings.park_info_path)?;
    log::info!(
        "📋 Loaded {} parks from {}",
        parks.len(),
        settings.park_info_path.display()
    );

    let notifier = TelegramService::new(cli.bot_token, cli.chat_id)?;
    log::info!("📨 Telegram notifier ready");

    let store = SnapshotStore::new(&settings.snapshot_dir);
    log::info!("📁 Snapshots location: {}", settings.snapshot_dir.display());

    let executor = ScanExecutor::new(
        SessionFetcher::new(settings.reserve_america.clone()),
        Arc::new(CookieSessionProvider::new(settings.reserve_america)),
        store,
        Arc::new(notifier),
        Some(ScanExecutorConfig {
            park_delay: settings.park_delay,
        }),
    );

    Ok(executor.run(&parks).await)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();

    log::info!("🚀 Starting campsite availability scan...");

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("❌ Invalid configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli, settings).await {
        Ok(summary) if summary.notification_failures() == 0 => {
            log::info!("✅ Scan complete");
            ExitCode::SUCCESS
        }
        Ok(summary) => {
            log::error!(
                "❌ {} change reports could not be delivered",
                summary.notification_failures()
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("❌ Scan aborted: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
