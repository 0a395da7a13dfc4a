use std::{path::Path, process::ExitCode, sync::Arc};

use config::{Config, CONFIG_PATH};
use market_data::{BinanceMarketData, MarketDataClient};
use symbol_cache::SymbolCache;
use symbols::{refresh_catalog, SymbolCatalog};
use ticker::Ticker;
use tokio::{runtime::Runtime, sync::watch};
use tracing::{error, info, warn};
use worker::QuotePoller;

mod config;
mod rows;
mod selection;
mod symbol_cache;
mod symbols;
mod ticker;
mod ui;
mod worker;

fn fatal(message: String) -> ExitCode {
    error!(%message, "Cannot start");
    if let Err(e) = ui::show_fatal_error(message) {
        error!(%e, "Cannot show error window");
    }
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let loaded = Config::load(Path::new(CONFIG_PATH));
    let config = loaded.as_ref().cloned().unwrap_or_default();
    tracing_subscriber::fmt()
        .with_max_level(config.log_level())
        .init();
    if let Err(e) = &loaded {
        warn!(%e, path = CONFIG_PATH, "Invalid config - use defaults");
    }

    let runtime = match Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => return fatal(format!("Cannot start async runtime: {e}")),
    };

    let client: Arc<dyn MarketDataClient> =
        match BinanceMarketData::new(config.api_host.clone(), config.request_timeout) {
            Ok(client) => Arc::new(client),
            Err(e) => return fatal(format!("Cannot create exchange client: {e}")),
        };
    info!(api_host = %config.api_host, "Exchange client ready");

    let cache = SymbolCache::new(config.cache_path.clone(), &config.quote_currency);
    let cached = runtime.block_on(cache.load());
    let (catalog_tx, catalog_rx) = watch::channel(SymbolCatalog::cached(cached));
    runtime.spawn(refresh_catalog(client.clone(), cache, catalog_tx));

    let poller = QuotePoller::new(client, &config.quote_currency, &config.display_currency);
    let ticker = Ticker::new(
        poller,
        runtime.handle().clone(),
        config.default_selection.clone(),
        config.interval,
        catalog_rx,
    );

    info!(
        selected = config.default_selection.len(),
        interval = ?config.interval,
        display_currency = %config.display_currency,
        "Open window"
    );
    let result = ui::run(ticker, &config);
    runtime.shutdown_background();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(%e, "Window failed");
            ExitCode::FAILURE
        }
    }
}
