mod config;

use std::sync::Arc;

use anyhow::Context;
use engine_logging::{engine_error, engine_info, engine_warn};
use listing_engine::{
    default_sources, DedupStore, DigestScheduler, JsonDedupStore, ListingAggregator,
    ReqwestFetcher, SystemClock, TelegramNotifier, Watcher,
};
use log::LevelFilter;

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the real environment may carry everything.
    let _ = dotenvy::dotenv();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            engine_logging::initialize(engine_logging::LogDestination::Terminal, LevelFilter::Info);
            engine_error!("Invalid configuration: {}", err);
            return Err(err.into());
        }
    };
    engine_logging::initialize(config.log_destination(), LevelFilter::Info);
    engine_info!("Listing watcher starting with {:?}", config);
    if !config.uses_default_api() {
        engine_warn!("Using Telegram API at {}", config.telegram.api_url);
    }

    let store = Arc::new(JsonDedupStore::new(config.data_file.clone()));
    let known = store
        .load()
        .with_context(|| format!("reading listing state {:?}", store.path()))?;
    engine_info!("{} known listing key(s) in {:?}", known.len(), store.path());

    let fetcher = Arc::new(ReqwestFetcher::new(config.fetch_settings())?);
    let notifier = Arc::new(TelegramNotifier::new(config.telegram.clone())?);

    let aggregator = ListingAggregator::new(
        default_sources(fetcher),
        store.clone(),
        notifier.clone(),
        config.aggregator_settings(),
    );
    let digest = DigestScheduler::new(store, notifier, config.digest_settings());
    let watcher = Watcher::new(
        aggregator,
        digest,
        Arc::new(SystemClock),
        config.watcher_settings(),
    );

    watcher
        .run(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                engine_error!("Cannot listen for Ctrl-C: {}", err);
                std::future::pending::<()>().await;
            }
        })
        .await;

    engine_info!("Listing watcher stopped");
    Ok(())
}
