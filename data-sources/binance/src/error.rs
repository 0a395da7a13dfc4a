use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot parse message <{1}>: {0}")]
    SerdeError(serde_json::Error, String),

    #[error("Cannot build query: {0}")]
    QueryError(#[from] serde_qs::Error),

    #[error("Cannot build url: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Http request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Binance rejected {path} with {code} ({msg})")]
    ApiError { path: String, code: i64, msg: String },
}

impl Error {
    /// Error code returned by Binance for an unknown symbol.
    pub const INVALID_SYMBOL: i64 = -1121;

    pub fn is_invalid_symbol(&self) -> bool {
        matches!(self, Error::ApiError { code, .. } if *code == Self::INVALID_SYMBOL)
    }
}
