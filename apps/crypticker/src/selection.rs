use std::collections::BTreeSet;

use sources_common::Symbol;
use tokio::sync::watch;
use tracing::debug;

/// Pairs the user wants tracked.
///
/// Every change republishes the whole set, so the refresh loop reading the
/// receiver at cycle start always sees a consistent selection.
pub struct SelectionState {
    selected: BTreeSet<Symbol>,
    publish: watch::Sender<Vec<Symbol>>,
}

impl SelectionState {
    pub fn new(initial: impl IntoIterator<Item = Symbol>) -> (Self, watch::Receiver<Vec<Symbol>>) {
        let selected: BTreeSet<Symbol> = initial.into_iter().collect();
        let (publish, rx) = watch::channel(selected.iter().cloned().collect());
        (Self { selected, publish }, rx)
    }

    /// Returns whether the symbol is selected afterwards.
    pub fn toggle(&mut self, symbol: &Symbol) -> bool {
        let selected = if self.selected.remove(symbol) {
            false
        } else {
            self.selected.insert(symbol.clone());
            true
        };
        debug!(%symbol, selected, "Toggle symbol");
        self.publish.send_replace(self.snapshot());
        selected
    }

    pub fn is_selected(&self, symbol: &Symbol) -> bool {
        self.selected.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn snapshot(&self) -> Vec<Symbol> {
        self.selected.iter().cloned().collect()
    }
}

/// Entries to render for the search text. An empty search renders nothing.
pub fn filter<'a>(symbols: &'a [Symbol], text: &str) -> Vec<&'a Symbol> {
    if text.is_empty() {
        return Vec::new();
    }
    let needle = text.to_lowercase();
    symbols
        .iter()
        .filter(|s| s.to_string().to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(raw: &str) -> Symbol {
        raw.parse().unwrap()
    }

    #[test]
    fn toggle_publishes_whole_set() {
        let (mut selection, rx) = SelectionState::new([symbol("BTC/USDT")]);
        assert_eq!(*rx.borrow(), vec![symbol("BTC/USDT")]);

        assert!(selection.toggle(&symbol("ETH/USDT")));
        assert_eq!(*rx.borrow(), vec![symbol("BTC/USDT"), symbol("ETH/USDT")]);

        assert!(!selection.toggle(&symbol("BTC/USDT")));
        assert_eq!(*rx.borrow(), vec![symbol("ETH/USDT")]);
        assert!(!selection.is_selected(&symbol("BTC/USDT")));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn toggling_twice_restores() {
        let (mut selection, _rx) = SelectionState::new(Vec::new());
        selection.toggle(&symbol("SOL/USDT"));
        selection.toggle(&symbol("SOL/USDT"));
        assert_eq!(selection.len(), 0);
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let symbols = vec![symbol("BTC/USDT"), symbol("ETH/USDT"), symbol("WBTC/USDT")];
        let found: Vec<String> = filter(&symbols, "btc").iter().map(|s| s.to_string()).collect();
        assert_eq!(found, ["BTC/USDT", "WBTC/USDT"]);
        assert_eq!(filter(&symbols, "/usdt").len(), 3);
        assert!(filter(&symbols, "doge").is_empty());
    }

    #[test]
    fn empty_filter_renders_nothing() {
        let symbols = vec![symbol("BTC/USDT"), symbol("ETH/USDT")];
        assert!(filter(&symbols, "").is_empty());
    }

    #[test]
    fn filter_does_not_touch_selection() {
        let symbols = vec![symbol("BTC/USDT"), symbol("ETH/USDT")];
        let (selection, rx) = SelectionState::new([symbol("ETH/USDT")]);
        let _ = filter(&symbols, "btc");
        assert_eq!(selection.snapshot(), vec![symbol("ETH/USDT")]);
        assert_eq!(*rx.borrow(), vec![symbol("ETH/USDT")]);
    }
}
