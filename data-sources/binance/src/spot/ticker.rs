use serde::{Deserialize, Serialize};
use toolset::deser_opt_float_from_string;

#[derive(Serialize, Debug, Default)]
pub struct TickerQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// JSON encoded list, e.g. `["BTCUSDT","ETHUSDT"]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols: Option<String>,
}

impl TickerQuery {
    pub fn single(ticker: impl Into<String>) -> Self {
        Self {
            symbol: Some(ticker.into()),
            symbols: None,
        }
    }

    pub fn batch(tickers: &[String]) -> Result<Self, serde_json::Error> {
        Ok(Self {
            symbol: None,
            symbols: Some(serde_json::to_string(tickers)?),
        })
    }
}

/// Rolling 24h statistics; every price may be absent for fresh or halted pairs.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ticker24hr {
    pub symbol: String,
    #[serde(default, deserialize_with = "deser_opt_float_from_string")]
    pub last_price: Option<f64>,
    #[serde(default, deserialize_with = "deser_opt_float_from_string")]
    pub open_price: Option<f64>,
    #[serde(default, deserialize_with = "deser_opt_float_from_string")]
    pub high_price: Option<f64>,
    #[serde(default, deserialize_with = "deser_opt_float_from_string")]
    pub low_price: Option<f64>,
    #[serde(default, deserialize_with = "deser_opt_float_from_string")]
    pub weighted_avg_price: Option<f64>,
}
