use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum Response<T> {
    Success(T),
    Error { code: i64, msg: String },
}

#[cfg(test)]
mod test {
    use super::Response;
    use crate::spot::ticker::Ticker24hr;

    #[test]
    fn error_envelope() {
        let raw_msg = r#"{"code":-1121,"msg":"Invalid symbol."}"#;

        let response: Response<Ticker24hr> = serde_json::from_str(raw_msg).unwrap();
        let Response::Error { code, msg } = response else {
            panic!("nope");
        };

        assert_eq!(code, -1121);
        assert_eq!(msg, "Invalid symbol.");
    }

    #[test]
    fn success_list() {
        let raw_msg = r#"[{"symbol":"BTCUSDT","lastPrice":"100.0"}]"#;

        let response: Response<Vec<Ticker24hr>> = serde_json::from_str(raw_msg).unwrap();
        let Response::Success(tickers) = response else {
            panic!("nope");
        };

        assert_eq!(tickers.len(), 1);
        assert_eq!(tickers[0].last_price, Some(100.0));
    }
}
