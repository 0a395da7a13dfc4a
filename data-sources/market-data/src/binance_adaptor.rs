use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use binance::{
    spot::{exchange_info::ExchangeInfoRequest, ticker::Ticker24hr},
    BinanceClient,
};
use futures::future::join_all;
use sources_common::Symbol;
use tracing::{debug, info, warn};
use url::Url;

use crate::{Error, MarketDataClient, Quote};

pub use binance::spot::DEFAULT_API_HOST;

pub struct BinanceMarketData {
    client: BinanceClient,
}

impl BinanceMarketData {
    pub fn new(api_host: Url, timeout: Duration) -> Result<Self, Error> {
        let client = BinanceClient::new(api_host, timeout)?;
        Ok(Self { client })
    }

    async fn get_quotes_one_by_one(&self, symbols: &[Symbol]) -> HashMap<Symbol, Quote> {
        let results = join_all(symbols.iter().map(|symbol| async move {
            match self.get_quote(symbol).await {
                Ok(quote) => quote,
                Err(e) => {
                    warn!(%symbol, %e, "Cannot fetch ticker");
                    None
                }
            }
        }))
        .await;

        results
            .into_iter()
            .flatten()
            .map(|quote| (quote.symbol.clone(), quote))
            .collect()
    }
}

fn quote_from_ticker(symbol: Symbol, ticker: Ticker24hr) -> Quote {
    Quote {
        symbol,
        last: ticker.last_price,
        open: ticker.open_price,
        high: ticker.high_price,
        low: ticker.low_price,
        vwap: ticker.weighted_avg_price,
    }
}

fn symbol_from_exchange(bs: binance::spot::exchange_info::Symbol) -> Symbol {
    Symbol::new(bs.base_asset, bs.quote_asset)
}

#[async_trait]
impl MarketDataClient for BinanceMarketData {
    async fn list_symbols(&self) -> Result<Vec<Symbol>, Error> {
        let info = self
            .client
            .fetch_exchange_info(ExchangeInfoRequest::spot())
            .await?;

        let symbols: Vec<Symbol> = info
            .parsed_symbols()
            .filter(|s| s.is_spot_tradable())
            .map(symbol_from_exchange)
            .collect();
        info!(total = symbols.len(), "Collected trading symbols");
        Ok(symbols)
    }

    async fn get_quote(&self, symbol: &Symbol) -> Result<Option<Quote>, Error> {
        match self.client.fetch_ticker(&symbol.ticker()).await {
            Ok(ticker) => Ok(Some(quote_from_ticker(symbol.clone(), ticker))),
            Err(e) if e.is_invalid_symbol() => {
                debug!(%symbol, "Unknown symbol");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_quotes(&self, symbols: &[Symbol]) -> Result<HashMap<Symbol, Quote>, Error> {
        let by_ticker: HashMap<String, &Symbol> =
            symbols.iter().map(|s| (s.ticker(), s)).collect();
        let tickers: Vec<String> = by_ticker.keys().cloned().collect();

        match self.client.fetch_tickers(&tickers).await {
            Ok(fetched) => Ok(fetched
                .into_iter()
                .filter_map(|ticker| {
                    let symbol = (*by_ticker.get(&ticker.symbol)?).clone();
                    Some((symbol.clone(), quote_from_ticker(symbol, ticker)))
                })
                .collect()),
            // One unknown pair rejects the whole batch; ask pair by pair instead.
            Err(e) if e.is_invalid_symbol() => {
                warn!(%e, "Batch rejected, falling back to single tickers");
                Ok(self.get_quotes_one_by_one(symbols).await)
            }
            Err(e) => Err(e.into()),
        }
    }
}
