use std::{borrow::Cow, cmp::Ordering, fmt, iter, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Trading pair such as `BTC/USDT`.
///
/// The text form `BASE/QUOTE` is what users see and what gets cached; the
/// exchange form (`BTCUSDT`) is produced by [`Symbol::ticker`]. Ordering
/// follows the text form byte by byte.
#[derive(Debug, Clone, PartialEq, Hash, Eq)]
pub struct Symbol {
    pub base_asset: String,
    pub quote_asset: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Incorrect symbol <{0}>: expected BASE/QUOTE")]
pub struct ParseSymbolError(pub String);

impl Symbol {
    pub fn new(base_asset: impl Into<String>, quote_asset: impl Into<String>) -> Self {
        Self {
            base_asset: base_asset.into(),
            quote_asset: quote_asset.into(),
        }
    }

    pub fn ticker(&self) -> String {
        format!("{}{}", self.base_asset, self.quote_asset)
    }

    pub fn inverse(&self) -> Self {
        Self::new(self.quote_asset.clone(), self.base_asset.clone())
    }

    fn text_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.base_asset
            .bytes()
            .chain(iter::once(b'/'))
            .chain(self.quote_asset.bytes())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base_asset, self.quote_asset)
    }
}

impl FromStr for Symbol {
    type Err = ParseSymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((base, quote))
                if !base.is_empty() && !quote.is_empty() && !quote.contains('/') =>
            {
                Ok(Symbol::new(base, quote))
            }
            _ => Err(ParseSymbolError(s.to_string())),
        }
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text_bytes().cmp(other.text_bytes())
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let string_value = Cow::<str>::deserialize(deserializer)?;
        string_value.as_ref().parse().map_err(de::Error::custom)
    }
}
