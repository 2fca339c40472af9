use std::path::PathBuf;

use anyhow::Result;
use tracing::{error, info};

use listing_finder::config::{AppConfig, Credentials, DEFAULT_CONFIG_PATH, SinkKind};
use listing_finder::discord::DiscordNotifier;
use listing_finder::scrapers::HttpSnapshotProvider;
use listing_finder::storage::SeenStore;
use listing_finder::telegram::TelegramNotifier;
use listing_finder::traits::Notifier;
use listing_finder::{ListingFinder, Scheduler};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    info!("Starting eBay Listing Finder");

    if let Err(e) = run().await {
        error!("Critical crash: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let config_path = std::env::var("FINDER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = AppConfig::load_or_default(&config_path)?;
    let credentials = Credentials::from_env();

    let notifier = build_notifier(&config, &credentials)?;
    let store = SeenStore::load(&config.seen_store_path, config.seen_capacity);
    info!("Seen store: {} ({} ids)", store.path().display(), store.len());
    let finder = ListingFinder::new(&config, store, notifier)?;
    let provider = HttpSnapshotProvider::new(config.request_timeout())?;

    info!(
        "Monitoring {} search pages in {:?} mode, sending to {:?}",
        config.target_urls().len(),
        config.mode,
        config.sink
    );

    Scheduler::new(&config, finder, provider)
        .run_until_shutdown()
        .await;

    Ok(())
}

fn build_notifier(config: &AppConfig, credentials: &Credentials) -> Result<Box<dyn Notifier>> {
    let notifier: Box<dyn Notifier> = match config.sink {
        SinkKind::Discord => Box::new(DiscordNotifier::new(
            credentials.discord_target(),
            config.local_zone.clone(),
            config.marketplace_zone.clone(),
        )?),
        SinkKind::Telegram => Box::new(TelegramNotifier::new(
            credentials.telegram_bot_token.clone(),
            credentials.telegram_chat_id.clone(),
        )?),
    };
    Ok(notifier)
}
