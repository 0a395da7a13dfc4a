use std::time::Duration;

use app::{RefreshLoop, RunState, StartError};
use sources_common::Symbol;
use thiserror::Error;
use tokio::{runtime::Handle, sync::watch};
use tracing::info;

use crate::{
    rows::Snapshot,
    selection::{self, SelectionState},
    symbols::{CatalogStatus, SymbolCatalog, SymbolList},
    worker::QuotePoller,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalError {
    #[error("Interval must be a number of seconds, got <{0}>")]
    NotANumber(String),

    #[error("Interval must be a positive number of seconds, got <{0}>")]
    NotPositive(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Interval(#[from] IntervalError),

    #[error("Select at least one symbol")]
    Start(#[from] StartError),
}

pub fn parse_interval(text: &str) -> Result<Duration, IntervalError> {
    let trimmed = text.trim();
    let secs: f64 = trimmed
        .parse()
        .map_err(|_| IntervalError::NotANumber(trimmed.to_string()))?;
    if !(secs > 0.0) {
        return Err(IntervalError::NotPositive(trimmed.to_string()));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| IntervalError::NotANumber(trimmed.to_string()))
}

/// Everything the window can do, in one place: selection, run control and
/// the data to render.
pub struct Ticker {
    selection: SelectionState,
    refresh: RefreshLoop<QuotePoller>,
    snapshot: watch::Receiver<Option<Snapshot>>,
    catalog: watch::Receiver<SymbolCatalog>,
}

impl Ticker {
    pub fn new(
        poller: QuotePoller,
        runtime: Handle,
        initial_selection: Vec<Symbol>,
        interval: Duration,
        catalog: watch::Receiver<SymbolCatalog>,
    ) -> Self {
        let (selection, selection_rx) = SelectionState::new(initial_selection);
        let refresh = RefreshLoop::new(poller.into(), runtime, selection_rx, interval);
        let snapshot = refresh.subscribe();

        Self {
            selection,
            refresh,
            snapshot,
            catalog,
        }
    }

    /// Flips the symbol and restarts a running loop so the next cycle uses
    /// the new selection.
    pub fn toggle(&mut self, symbol: &Symbol) -> bool {
        let selected = self.selection.toggle(symbol);
        self.refresh.restart();
        selected
    }

    pub fn is_selected(&self, symbol: &Symbol) -> bool {
        self.selection.is_selected(symbol)
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    /// Invalid text leaves the current interval untouched.
    pub fn set_interval(&mut self, text: &str) -> Result<Duration, IntervalError> {
        let interval = parse_interval(text)?;
        if interval != self.refresh.period() {
            info!(?interval, "Set refresh interval");
            self.refresh.set_period(interval);
        }
        Ok(interval)
    }

    pub fn interval(&self) -> Duration {
        self.refresh.period()
    }

    pub fn start(&mut self) -> Result<(), StartError> {
        self.refresh.start()
    }

    /// Applies the interval text, then starts. Nothing starts on bad input.
    pub fn submit(&mut self, interval_text: &str) -> Result<(), SubmitError> {
        self.set_interval(interval_text)?;
        self.start()?;
        Ok(())
    }

    pub fn stop(&mut self) {
        self.refresh.stop()
    }

    pub fn run_state(&self) -> RunState {
        self.refresh.state()
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.snapshot.borrow().clone()
    }

    /// Checkbox entries for the search text; the selection is not affected.
    pub fn filter(&self, text: &str) -> Vec<Symbol> {
        let catalog = self.catalog.borrow();
        selection::filter(catalog.symbols.as_slice(), text)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn symbols(&self) -> SymbolList {
        self.catalog.borrow().symbols.clone()
    }

    pub fn catalog_status(&self) -> CatalogStatus {
        self.catalog.borrow().status.clone()
    }
}
