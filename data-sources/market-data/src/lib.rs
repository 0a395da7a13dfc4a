use std::collections::HashMap;

use async_trait::async_trait;
use sources_common::Symbol;
use thiserror::Error;

pub mod quote;

pub use quote::Quote;

#[cfg(feature = "binance")]
mod binance_adaptor;

#[cfg(feature = "binance")]
pub use binance_adaptor::*;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[derive(Error, Debug)]
pub enum Error {
    #[cfg(feature = "binance")]
    #[error(transparent)]
    Binance(#[from] binance::Error),

    #[error("Market data unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view on an exchange.
///
/// Every call may fail; callers treat failures as "no data" rather than
/// aborting.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// All pairs currently open for trading, in no particular order.
    async fn list_symbols(&self) -> Result<Vec<Symbol>, Error>;

    /// `Ok(None)` when the exchange does not know the pair.
    async fn get_quote(&self, symbol: &Symbol) -> Result<Option<Quote>, Error>;

    /// Pairs without a quote are absent from the map.
    async fn get_quotes(&self, symbols: &[Symbol]) -> Result<HashMap<Symbol, Quote>, Error>;
}
