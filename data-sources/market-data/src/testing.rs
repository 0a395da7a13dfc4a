//! In-memory [`MarketDataClient`] with scripted answers for tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex, MutexGuard,
    },
    time::Duration,
};

use async_trait::async_trait;
use sources_common::Symbol;

use crate::{Error, MarketDataClient, Quote};

#[derive(Default)]
pub struct ScriptedMarketData {
    symbols: Mutex<Option<Vec<Symbol>>>,
    quotes: Mutex<HashMap<Symbol, Quote>>,
    failing: Mutex<HashSet<Symbol>>,
    fail_batches: AtomicBool,
    latency: Mutex<Duration>,
    quote_calls: AtomicUsize,
    batch_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` makes `list_symbols` fail.
    pub fn set_symbols(&self, symbols: Option<Vec<Symbol>>) {
        *locked(&self.symbols) = symbols;
    }

    pub fn set_quote(&self, quote: Quote) {
        locked(&self.quotes).insert(quote.symbol.clone(), quote);
    }

    pub fn fail_symbol(&self, symbol: Symbol) {
        locked(&self.failing).insert(symbol);
    }

    pub fn fail_batches(&self, fail: bool) {
        self.fail_batches.store(fail, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Duration) {
        *locked(&self.latency) = latency;
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// Highest number of requests that were ever served at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);
        let latency = *locked(&self.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        guard
    }
}

#[async_trait]
impl MarketDataClient for ScriptedMarketData {
    async fn list_symbols(&self) -> Result<Vec<Symbol>, Error> {
        let _guard = self.enter().await;
        locked(&self.symbols)
            .clone()
            .ok_or_else(|| Error::Unavailable("symbols".into()))
    }

    async fn get_quote(&self, symbol: &Symbol) -> Result<Option<Quote>, Error> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = self.enter().await;
        if locked(&self.failing).contains(symbol) {
            return Err(Error::Unavailable(symbol.to_string()));
        }
        Ok(locked(&self.quotes).get(symbol).cloned())
    }

    async fn get_quotes(&self, symbols: &[Symbol]) -> Result<HashMap<Symbol, Quote>, Error> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = self.enter().await;
        if self.fail_batches.load(Ordering::SeqCst) {
            return Err(Error::Unavailable("batch".into()));
        }
        let quotes = locked(&self.quotes);
        Ok(symbols
            .iter()
            .filter_map(|s| quotes.get(s).map(|q| (s.clone(), q.clone())))
            .collect())
    }
}
