use core::fmt;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::{error::Error, protocol::Response};

use self::{
    exchange_info::{ExchangeInfo, ExchangeInfoRequest},
    ticker::{Ticker24hr, TickerQuery},
};

pub mod exchange_info;
pub mod ticker;

pub const DEFAULT_API_HOST: &str = "https://api.binance.com";

/// Public (unsigned) spot REST endpoints.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    api_host: Url,
    http: reqwest::Client,
}

impl BinanceClient {
    pub fn new(api_host: Url, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { api_host, http })
    }

    pub fn api_host(&self) -> &Url {
        &self.api_host
    }

    pub async fn fetch<Q, R>(&self, path: &str, query: Q) -> Result<R, Error>
    where
        Q: Serialize + fmt::Debug,
        R: DeserializeOwned,
    {
        let mut url = self.api_host.join(path)?;
        let qs = serde_qs::to_string(&query)?;

        debug!(?query, ?qs, "Run query");

        if !qs.is_empty() {
            url.set_query(Some(&qs));
        }
        let result = self.http.get(url).send().await?.text().await?;

        match serde_json::from_str::<Response<R>>(&result) {
            Ok(Response::Success(t)) => Ok(t),
            Ok(Response::Error { code, msg }) => Err(Error::ApiError {
                path: path.to_string(),
                code,
                msg,
            }),
            Err(e) => Err(Error::SerdeError(e, result)),
        }
    }

    pub async fn fetch_exchange_info(
        &self,
        exchange_info: ExchangeInfoRequest,
    ) -> Result<ExchangeInfo, Error> {
        let info: ExchangeInfo = self.fetch("/api/v3/exchangeInfo", exchange_info).await?;
        info!(total = info.symbols.len(), "Fetched exchange info");
        Ok(info)
    }

    pub async fn fetch_ticker(&self, ticker: &str) -> Result<Ticker24hr, Error> {
        self.fetch("/api/v3/ticker/24hr", TickerQuery::single(ticker))
            .await
    }

    pub async fn fetch_tickers(&self, tickers: &[String]) -> Result<Vec<Ticker24hr>, Error> {
        if tickers.is_empty() {
            return Ok(Vec::new());
        }
        let query = TickerQuery::batch(tickers)
            .map_err(|e| Error::SerdeError(e, format!("{tickers:?}")))?;
        self.fetch("/api/v3/ticker/24hr", query).await
    }
}
