use sources_common::Symbol;

/// Snapshot of a pair's 24h statistics, denominated in its quote asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: Symbol,
    pub last: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub vwap: Option<f64>,
}

impl Quote {
    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            last: None,
            open: None,
            high: None,
            low: None,
            vwap: None,
        }
    }
}
