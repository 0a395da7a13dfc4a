use std::path::PathBuf;

use sources_common::Symbol;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::symbols::SymbolList;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache file is not a list of symbols: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Last listed symbols, stored as a JSON array of `BASE/QUOTE` strings.
///
/// The only owner of the cache file. Nothing here is fatal: a broken or
/// missing file reads as an empty list and failed writes are only logged.
#[derive(Debug, Clone)]
pub struct SymbolCache {
    path: PathBuf,
    quote_currency: String,
}

impl SymbolCache {
    pub fn new(path: impl Into<PathBuf>, quote_currency: &str) -> Self {
        Self {
            path: path.into(),
            quote_currency: quote_currency.to_string(),
        }
    }

    pub fn quote_currency(&self) -> &str {
        &self.quote_currency
    }

    pub async fn load(&self) -> SymbolList {
        match self.read().await {
            Ok(symbols) => {
                info!(total = symbols.len(), path = ?self.path, "Loaded cached symbols");
                symbols
            }
            Err(CacheError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "No symbol cache yet");
                SymbolList::default()
            }
            Err(e) => {
                warn!(%e, path = ?self.path, "Cannot load symbol cache - start empty");
                SymbolList::default()
            }
        }
    }

    pub async fn save(&self, symbols: &SymbolList) {
        if let Err(e) = self.write(symbols).await {
            warn!(%e, path = ?self.path, "Cannot save symbol cache");
        }
    }

    async fn read(&self) -> Result<SymbolList, CacheError> {
        let mut file = tokio::fs::File::open(&self.path).await?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).await?;

        let raw: Vec<String> = serde_json::from_slice(&buf)?;
        let symbols = raw.iter().filter_map(|s| match s.parse::<Symbol>() {
            Ok(symbol) => Some(symbol),
            Err(e) => {
                debug!(%e, "Skip cached entry");
                None
            }
        });
        Ok(SymbolList::new(symbols, &self.quote_currency))
    }

    async fn write(&self, symbols: &SymbolList) -> Result<(), CacheError> {
        let data = serde_json::to_vec(symbols)?;
        let tmp_path = self.path.with_extension("tmp");

        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.path).await?;
        debug!(total = symbols.len(), path = ?self.path, "Saved symbol cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(raw: &[&str]) -> SymbolList {
        SymbolList::new(raw.iter().map(|s| s.parse().unwrap()), "USDT")
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SymbolCache::new(dir.path().join("cached_symbols.json"), "USDT");
        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cached_symbols.json");
        let cache = SymbolCache::new(path.clone(), "USDT");
        let symbols = list(&["SOL/USDT", "BTC/USDT"]);

        cache.save(&symbols).await;

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!path.with_extension("tmp").exists());
        assert_eq!(raw, r#"["BTC/USDT","SOL/USDT"]"#);
        assert_eq!(cache.load().await, symbols);
    }

    #[tokio::test]
    async fn load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SymbolCache::new(dir.path().join("cached_symbols.json"), "USDT");
        cache.save(&list(&["ETH/USDT", "ADA/USDT"])).await;

        let first = cache.load().await;
        let second = cache.load().await;
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[tokio::test]
    async fn corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cached_symbols.json");
        std::fs::write(&path, "{ not json").unwrap();

        let cache = SymbolCache::new(path, "USDT");
        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_entries_are_skipped_and_list_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cached_symbols.json");
        std::fs::write(
            &path,
            r#"["SOL/USDT", "garbage", "BTC/USDT", "ETH/BTC", "SOL/USDT"]"#,
        )
        .unwrap();

        let cache = SymbolCache::new(path, "USDT");
        assert_eq!(cache.load().await, list(&["BTC/USDT", "SOL/USDT"]));
    }

    #[tokio::test]
    async fn unwritable_path_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SymbolCache::new(dir.path().join("missing").join("cache.json"), "USDT");

        cache.save(&list(&["BTC/USDT"])).await;
        assert!(cache.load().await.is_empty());
    }
}
