use std::sync::Arc;

use market_data::MarketDataClient;
use serde::Serialize;
use sources_common::Symbol;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::symbol_cache::SymbolCache;

/// Sorted, deduplicated pairs sharing one quote currency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SymbolList(Vec<Symbol>);

impl SymbolList {
    pub fn new(symbols: impl IntoIterator<Item = Symbol>, quote_currency: &str) -> Self {
        let mut symbols: Vec<Symbol> = symbols
            .into_iter()
            .filter(|s| s.quote_asset.eq_ignore_ascii_case(quote_currency))
            .collect();
        symbols.sort();
        symbols.dedup();
        Self(symbols)
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    /// Showing cached symbols, exchange listing in progress.
    Loading,
    Fresh,
    Failed(String),
}

/// Symbol list shown to the user together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolCatalog {
    pub symbols: SymbolList,
    pub status: CatalogStatus,
}

impl SymbolCatalog {
    pub fn cached(symbols: SymbolList) -> Self {
        Self {
            symbols,
            status: CatalogStatus::Loading,
        }
    }
}

/// Lists the exchange once, publishes the result and stores it in the cache.
/// On failure the cached list stays in place.
pub async fn refresh_catalog(
    client: Arc<dyn MarketDataClient>,
    cache: SymbolCache,
    catalog: watch::Sender<SymbolCatalog>,
) {
    match client.list_symbols().await {
        Ok(symbols) => {
            let symbols = SymbolList::new(symbols, cache.quote_currency());
            info!(total = symbols.len(), "Symbol list refreshed");
            cache.save(&symbols).await;
            catalog.send_replace(SymbolCatalog {
                symbols,
                status: CatalogStatus::Fresh,
            });
        }
        Err(e) => {
            warn!(%e, "Cannot list symbols - keep cached ones");
            catalog.send_modify(|catalog| catalog.status = CatalogStatus::Failed(e.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use market_data::testing::ScriptedMarketData;

    use super::*;

    fn symbols(raw: &[&str]) -> Vec<Symbol> {
        raw.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn list_is_sorted_unique_and_filtered() {
        let list = SymbolList::new(
            symbols(&["SOL/USDT", "BTC/USDT", "ETH/BTC", "BTC/USDT", "ADA/USDT"]),
            "USDT",
        );
        let texts: Vec<String> = list.as_slice().iter().map(ToString::to_string).collect();
        assert_eq!(texts, ["ADA/USDT", "BTC/USDT", "SOL/USDT"]);
    }

    #[tokio::test]
    async fn refresh_publishes_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SymbolCache::new(dir.path().join("symbols.json"), "USDT");
        let client = Arc::new(ScriptedMarketData::new());
        client.set_symbols(Some(symbols(&["ETH/USDT", "BTC/USDT", "ETH/BTC"])));
        let (tx, rx) = watch::channel(SymbolCatalog::cached(SymbolList::default()));

        refresh_catalog(client, cache.clone(), tx).await;

        let catalog = rx.borrow().clone();
        assert_eq!(catalog.status, CatalogStatus::Fresh);
        assert_eq!(catalog.symbols.len(), 2);
        assert_eq!(cache.load().await, catalog.symbols);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_cached_list() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SymbolCache::new(dir.path().join("symbols.json"), "USDT");
        let client = Arc::new(ScriptedMarketData::new());
        let cached = SymbolList::new(symbols(&["BTC/USDT"]), "USDT");
        let (tx, rx) = watch::channel(SymbolCatalog::cached(cached.clone()));

        refresh_catalog(client, cache.clone(), tx).await;

        let catalog = rx.borrow().clone();
        assert!(matches!(catalog.status, CatalogStatus::Failed(_)));
        assert_eq!(catalog.symbols, cached);
        assert!(cache.load().await.is_empty());
    }
}
