use chrono::{DateTime, Local};
use market_data::Quote;
use sources_common::Symbol;

/// One table line, every price already converted to the display currency.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub symbol: Symbol,
    pub price: Option<f64>,
    pub volatility_pct: Option<f64>,
    pub percent_change_pct: Option<f64>,
    pub open: Option<f64>,
    pub vwap: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
}

/// Whole result of one poll cycle, published at once.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub rows: Vec<DerivedRow>,
    pub rate: f64,
    pub updated_at: DateTime<Local>,
}

fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Intraday range relative to the low, in percent.
pub fn volatility_pct(high: Option<f64>, low: Option<f64>) -> Option<f64> {
    let (high, low) = (non_zero(high)?, non_zero(low)?);
    Some((high - low) / low * 100.0)
}

pub fn percent_change_pct(last: Option<f64>, open: Option<f64>) -> Option<f64> {
    let (last, open) = (non_zero(last)?, non_zero(open)?);
    Some((last - open) / open * 100.0)
}

impl DerivedRow {
    pub fn derive(quote: &Quote, rate: f64) -> Self {
        let convert = |v: Option<f64>| v.map(|v| v * rate);
        let (price, open, high, low) = (
            convert(quote.last),
            convert(quote.open),
            convert(quote.high),
            convert(quote.low),
        );

        Self {
            symbol: quote.symbol.clone(),
            price,
            volatility_pct: volatility_pct(high, low),
            percent_change_pct: percent_change_pct(price, open),
            open,
            vwap: convert(quote.vwap),
            high,
            low,
        }
    }

    fn volatility_key(&self) -> f64 {
        self.volatility_pct.unwrap_or(0.0)
    }
}

/// Most volatile first; rows without volatility count as 0. Stable.
pub fn sort_by_volatility(rows: &mut [DerivedRow]) {
    rows.sort_by(|a, b| b.volatility_key().total_cmp(&a.volatility_key()));
}

pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.6}"),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn btc_quote() -> Quote {
        Quote {
            last: Some(100.0),
            open: Some(80.0),
            high: Some(120.0),
            low: Some(90.0),
            vwap: Some(95.0),
            ..Quote::empty(Symbol::new("BTC", "USDT"))
        }
    }

    fn row(name: &str, volatility_pct: Option<f64>) -> DerivedRow {
        DerivedRow {
            volatility_pct,
            ..DerivedRow::derive(&Quote::empty(Symbol::new(name, "USDT")), 1.0)
        }
    }

    #[test]
    fn volatility_formula() {
        assert_eq!(volatility_pct(Some(110.0), Some(100.0)), Some(10.0));
        assert_eq!(volatility_pct(Some(100.0), Some(100.0)), Some(0.0));
        assert_eq!(volatility_pct(Some(110.0), Some(0.0)), None);
        assert_eq!(volatility_pct(Some(110.0), None), None);
        assert_eq!(volatility_pct(None, Some(100.0)), None);
    }

    #[test]
    fn percent_change_formula() {
        assert_eq!(percent_change_pct(Some(100.0), Some(80.0)), Some(25.0));
        assert_eq!(percent_change_pct(Some(40.0), Some(80.0)), Some(-50.0));
        assert_eq!(percent_change_pct(Some(100.0), Some(0.0)), None);
        assert_eq!(percent_change_pct(Some(100.0), None), None);
    }

    #[test]
    fn derive_btc_scenario() {
        let row = DerivedRow::derive(&btc_quote(), 1.0);

        assert_eq!(row.symbol.to_string(), "BTC/USDT");
        assert_eq!(row.price, Some(100.0));
        let volatility = row.volatility_pct.unwrap();
        assert!((volatility - 33.333_333_333).abs() < 1e-6);
        assert_eq!(row.percent_change_pct, Some(25.0));
        assert_eq!(row.open, Some(80.0));
        assert_eq!(row.vwap, Some(95.0));
        assert_eq!(row.high, Some(120.0));
        assert_eq!(row.low, Some(90.0));
    }

    #[test]
    fn rate_scales_prices_only() {
        let raw = DerivedRow::derive(&btc_quote(), 1.0);
        let converted = DerivedRow::derive(&btc_quote(), 0.5);

        assert_eq!(converted.price, Some(50.0));
        assert_eq!(converted.open, Some(40.0));
        assert_eq!(converted.vwap, Some(47.5));
        assert_eq!(converted.high, Some(60.0));
        assert_eq!(converted.low, Some(45.0));
        let (a, b) = (raw.volatility_pct.unwrap(), converted.volatility_pct.unwrap());
        assert!((a - b).abs() < 1e-9);
        assert_eq!(converted.percent_change_pct, raw.percent_change_pct);
    }

    #[test]
    fn missing_fields_stay_undefined() {
        let row = DerivedRow::derive(&Quote::empty(Symbol::new("NEW", "USDT")), 0.9);
        assert_eq!(row.price, None);
        assert_eq!(row.volatility_pct, None);
        assert_eq!(row.percent_change_pct, None);
        assert_eq!(format_value(row.vwap), "N/A");
    }

    #[test]
    fn sort_descending_undefined_last_and_stable() {
        let mut rows = vec![
            row("A", Some(3.0)),
            row("B", None),
            row("C", Some(7.0)),
            row("D", None),
            row("E", Some(1.0)),
        ];
        sort_by_volatility(&mut rows);

        let order: Vec<String> = rows.iter().map(|r| r.symbol.base_asset.clone()).collect();
        assert_eq!(order, ["C", "A", "E", "B", "D"]);
        let volatility: Vec<Option<f64>> = rows.iter().map(|r| r.volatility_pct).collect();
        assert_eq!(volatility, [Some(7.0), Some(3.0), Some(1.0), None, None]);
    }

    #[test]
    fn format_six_decimals() {
        assert_eq!(format_value(Some(1.5)), "1.500000");
        assert_eq!(format_value(Some(33.333_333_333_3)), "33.333333");
        assert_eq!(format_value(None), "N/A");
    }
}
