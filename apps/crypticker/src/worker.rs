use std::{collections::HashMap, sync::Arc};

use app::worker::CycleWorker;
use async_trait::async_trait;
use chrono::Local;
use market_data::{MarketDataClient, Quote};
use sources_common::Symbol;
use tracing::{debug, info, warn};

use crate::rows::{sort_by_volatility, DerivedRow, Snapshot};

/// Used whenever the conversion quote cannot be obtained.
pub const FALLBACK_RATE: f64 = 1.0;

/// Fetches quotes for the selection and turns them into sorted table rows.
pub struct QuotePoller {
    client: Arc<dyn MarketDataClient>,
    quote_currency: String,
    display_currency: String,
}

impl QuotePoller {
    pub fn new(
        client: Arc<dyn MarketDataClient>,
        quote_currency: &str,
        display_currency: &str,
    ) -> Self {
        Self {
            client,
            quote_currency: quote_currency.to_uppercase(),
            display_currency: display_currency.to_uppercase(),
        }
    }

    async fn last_price(&self, symbol: &Symbol) -> Option<f64> {
        match self.client.get_quote(symbol).await {
            Ok(quote) => quote.and_then(|q| q.last).filter(|p| *p > 0.0),
            Err(e) => {
                warn!(%symbol, %e, "Cannot fetch conversion quote");
                None
            }
        }
    }

    /// Quote currency → display currency. Tries the direct pair, then the
    /// inverse one, then falls back to [`FALLBACK_RATE`].
    pub async fn conversion_rate(&self) -> f64 {
        if self.quote_currency == self.display_currency {
            return FALLBACK_RATE;
        }

        let direct = Symbol::new(self.quote_currency.as_str(), self.display_currency.as_str());
        if let Some(rate) = self.last_price(&direct).await {
            return rate;
        }

        let inverse = direct.inverse();
        if let Some(price) = self.last_price(&inverse).await {
            return 1.0 / price;
        }

        debug!(%direct, "No conversion quote - use fallback rate");
        FALLBACK_RATE
    }

    async fn quotes(&self, symbols: &[Symbol]) -> HashMap<Symbol, Quote> {
        match self.client.get_quotes(symbols).await {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(%e, "Cannot fetch quotes - no data this cycle");
                HashMap::new()
            }
        }
    }
}

#[async_trait]
impl CycleWorker for QuotePoller {
    type Input = Vec<Symbol>;
    type Output = Snapshot;

    fn has_work(&self, input: &Vec<Symbol>) -> bool {
        !input.is_empty()
    }

    async fn cycle(&self, input: Vec<Symbol>) -> Snapshot {
        let rate = self.conversion_rate().await;
        let quotes = self.quotes(&input).await;

        let mut rows: Vec<DerivedRow> = input
            .iter()
            .filter_map(|symbol| quotes.get(symbol))
            .map(|quote| DerivedRow::derive(quote, rate))
            .collect();
        sort_by_volatility(&mut rows);

        info!(requested = input.len(), received = rows.len(), rate, "Quotes refreshed");
        Snapshot {
            rows,
            rate,
            updated_at: Local::now(),
        }
    }
}
