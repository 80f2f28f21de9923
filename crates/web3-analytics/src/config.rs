//! Configuration
//!
//! Endpoints, credentials and analysis defaults. Built once (usually from the
//! environment) and handed to each client at construction.

use std::time::Duration;

use crate::analysis::indicators::MAX_LOOKBACK;
use crate::error::{AnalyticsError, Result};

/// Where the tools get their raw data from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataSourceMode {
    /// Public HTTP APIs
    Live,
    /// Built-in deterministic fixtures
    Mock,
}

impl DataSourceMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "live" => Some(Self::Live),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AnalyticsConfig {
    /// DefiLlama API base URL
    pub llama_api_url: String,

    /// CoinMarketCap API base URL
    pub cmc_api_url: String,

    /// CoinMarketCap API key (token tools are disabled without it)
    pub cmc_api_key: Option<String>,

    /// Etherscan API base URL
    pub etherscan_api_url: String,

    /// Etherscan API key
    pub etherscan_api_key: Option<String>,

    /// KuCoin REST base URL (order books, tickers, candles)
    pub kucoin_api_url: String,

    /// Per-request HTTP timeout in seconds
    pub http_timeout_secs: u64,

    /// Default order-book depth for liquidity analysis
    pub default_book_depth: usize,

    /// Default lookback period for indicators
    pub default_lookback: usize,

    /// TVL threshold for the top-growing protocol list
    pub min_protocol_tvl: f64,

    pub data_source: DataSourceMode,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            llama_api_url: "https://api.llama.fi".into(),
            cmc_api_url: "https://pro-api.coinmarketcap.com".into(),
            cmc_api_key: None,
            etherscan_api_url: "https://api.etherscan.io".into(),
            etherscan_api_key: None,
            kucoin_api_url: "https://api.kucoin.com".into(),
            http_timeout_secs: 30,
            default_book_depth: 10,
            default_lookback: 14,
            min_protocol_tvl: 1_000_000.0,
            data_source: DataSourceMode::Live,
        }
    }
}

impl AnalyticsConfig {
    /// Read configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            llama_api_url: env_or("LLAMA_API_URL", defaults.llama_api_url),
            cmc_api_url: env_or("CMC_API_URL", defaults.cmc_api_url),
            cmc_api_key: env_opt("CMC_API_KEY"),
            etherscan_api_url: env_or("ETHERSCAN_API_URL", defaults.etherscan_api_url),
            etherscan_api_key: env_opt("ETHERSCAN_API_KEY"),
            kucoin_api_url: env_or("KUCOIN_API_URL", defaults.kucoin_api_url),
            http_timeout_secs: env_parse("HTTP_TIMEOUT_SECS").unwrap_or(defaults.http_timeout_secs),
            default_book_depth: env_parse("DEFAULT_BOOK_DEPTH").unwrap_or(defaults.default_book_depth),
            default_lookback: env_parse("DEFAULT_LOOKBACK").unwrap_or(defaults.default_lookback),
            min_protocol_tvl: env_parse("MIN_PROTOCOL_TVL").unwrap_or(defaults.min_protocol_tvl),
            data_source: env_opt("ANALYTICS_DATA_SOURCE")
                .and_then(|s| DataSourceMode::parse(&s))
                .unwrap_or(defaults.data_source),
        }
    }

    /// Reject values no analysis can run with
    pub fn validate(&self) -> Result<()> {
        if self.http_timeout_secs == 0 {
            return Err(AnalyticsError::Config("HTTP_TIMEOUT_SECS must be positive".into()));
        }
        if self.default_book_depth == 0 {
            return Err(AnalyticsError::Config("DEFAULT_BOOK_DEPTH must be positive".into()));
        }
        if !(2..=MAX_LOOKBACK).contains(&self.default_lookback) {
            return Err(AnalyticsError::Config(format!(
                "DEFAULT_LOOKBACK must be between 2 and {MAX_LOOKBACK}"
            )));
        }
        if !self.min_protocol_tvl.is_finite() || self.min_protocol_tvl < 0.0 {
            return Err(AnalyticsError::Config("MIN_PROTOCOL_TVL must be a non-negative number".into()));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Shared HTTP client honoring the configured timeout
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http_timeout())
            .user_agent(concat!("web3-analytics/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AnalyticsError::Config(format!("HTTP client: {}", e)))
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: String) -> String {
    env_opt(key).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_opt(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalyticsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_book_depth, 10);
        assert_eq!(config.default_lookback, 14);
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_zero_depth() {
        let config = AnalyticsConfig {
            default_book_depth: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AnalyticsError::Config(_))));
    }

    #[test]
    fn test_validate_bounds_lookback() {
        for default_lookback in [1, MAX_LOOKBACK + 1] {
            let config = AnalyticsConfig {
                default_lookback,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(AnalyticsError::Config(_))));
        }
    }

    #[test]
    fn test_data_source_mode_parse() {
        assert_eq!(DataSourceMode::parse(" MOCK "), Some(DataSourceMode::Mock));
        assert_eq!(DataSourceMode::parse("live"), Some(DataSourceMode::Live));
        assert_eq!(DataSourceMode::parse("replay"), None);
    }
}
