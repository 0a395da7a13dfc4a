use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use sources_common::Symbol;
use thiserror::Error;
use toolset::deserialize_url;
use tracing::Level;
use url::Url;

/// Looked up in the working directory; every field is optional.
pub const CONFIG_PATH: &str = "crypticker.yaml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] io::Error),

    #[error("Cannot parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_url")]
    pub api_host: Url,
    pub quote_currency: String,
    pub display_currency: String,
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub cache_path: PathBuf,
    pub default_selection: Vec<Symbol>,
    log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: default_api_host(),
            quote_currency: "USDT".into(),
            display_currency: "EUR".into(),
            interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            cache_path: PathBuf::from("cached_symbols.json"),
            default_selection: ["BTC", "ETH", "LTC", "SOL", "TRUMP"]
                .into_iter()
                .map(|base| Symbol::new(base, "USDT"))
                .collect(),
            log_level: "info".into(),
        }
    }
}

fn default_api_host() -> Url {
    Url::parse(market_data::DEFAULT_API_HOST).expect("default api host is a valid url")
}

impl Config {
    /// Missing file means defaults.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        match File::open(path) {
            Ok(file) => Ok(serde_yaml::from_reader(file)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn log_level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }
}
