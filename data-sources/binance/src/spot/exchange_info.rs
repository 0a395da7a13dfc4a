use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolset::deser_duration_from_integer;

#[derive(Debug, Default, Serialize)]
pub struct ExchangeInfoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<String>,
}

impl ExchangeInfoRequest {
    /// Only pairs with spot permissions.
    pub fn spot() -> Self {
        Self {
            permissions: Some("SPOT".into()),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
    pub timezone: String,
    #[serde(deserialize_with = "deser_duration_from_integer")]
    pub server_time: Duration,
    pub symbols: Vec<Value>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolStatus {
    PreTrading,
    Trading,
    PostTrading,
    EndOfDay,
    Halt,
    AuctionMatch,
    Break,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub symbol: String,
    pub status: SymbolStatus,
    pub base_asset: String,
    pub quote_asset: String,
    #[serde(default)]
    pub is_spot_trading_allowed: bool,
}

impl Symbol {
    pub fn is_spot_tradable(&self) -> bool {
        self.status == SymbolStatus::Trading && self.is_spot_trading_allowed
    }
}

impl ExchangeInfo {
    /// Symbols which can be parsed, malformed entries are skipped.
    pub fn parsed_symbols(self) -> impl Iterator<Item = Symbol> {
        self.symbols
            .into_iter()
            .filter_map(|v| serde_json::from_value::<Symbol>(v).ok())
    }
}
