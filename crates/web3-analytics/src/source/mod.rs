//! Data Sources
//!
//! Collaborator traits the tools fetch raw data through, with HTTP
//! implementations for the public APIs and deterministic in-memory fixtures.
//!
//! Clients make exactly one request per call: no retries, no backoff.
//! A non-success HTTP status or an API-level error becomes
//! [`AnalyticsError::UpstreamUnavailable`].

mod coinmarketcap;
mod etherscan;
mod kucoin;
mod llama;
mod mock;

pub use coinmarketcap::CoinMarketCapClient;
pub use etherscan::EtherscanClient;
pub use kucoin::KucoinClient;
pub use llama::LlamaClient;
pub use mock::MockDataSource;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{AnalyticsConfig, DataSourceMode};
use crate::error::{AnalyticsError, Result};
use crate::model::{
    ChainInfo, ChainTvlPoint, NftCollection, NftMarketplace, ProtocolRecord, Timeframe, TokenListing,
    TokenQuoteDetail, VolumeSeries, VolumeVenue,
};
use crate::normalize::CandleLayout;

/// Order books, tickers and candles of a trading venue.
///
/// Payloads are returned raw; [`crate::normalize`] turns them into models.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// `market` is a `BASE/QUOTE` pair, e.g. `INJ/USDT`
    async fn order_book(&self, market: &str) -> Result<Value>;

    async fn ticker(&self, market: &str) -> Result<Value>;

    /// Up to `limit` most recent candles
    async fn candles(&self, market: &str, timeframe: Timeframe, limit: usize) -> Result<Value>;

    /// Every spot market the venue lists
    async fn markets(&self) -> Result<Value>;

    /// Column order of array-encoded candles from [`Self::candles`]
    fn candle_layout(&self) -> CandleLayout;

    fn name(&self) -> &str;
}

/// TVL, DEX volume and NFT aggregates
#[async_trait]
pub trait DefiDataSource: Send + Sync {
    async fn protocols(&self) -> Result<Vec<ProtocolRecord>>;

    /// Daily TVL history, oldest first
    async fn chain_tvl_history(&self, chain: &ChainInfo) -> Result<Vec<ChainTvlPoint>>;

    async fn dex_overview(&self) -> Result<Vec<VolumeVenue>>;

    /// Daily volume series of one DEX
    async fn dex_volume_chart(&self, dex: &str) -> Result<VolumeSeries>;

    async fn nft_collections(&self) -> Result<Vec<NftCollection>>;

    async fn nft_marketplaces(&self) -> Result<Vec<NftMarketplace>>;

    fn name(&self) -> &str;
}

#[async_trait]
pub trait TokenListingSource: Send + Sync {
    async fn listings(&self) -> Result<Vec<TokenListing>>;

    /// Detailed quotes keyed by listing id (as a string)
    async fn quotes(&self, id: u64) -> Result<HashMap<String, TokenQuoteDetail>>;

    fn name(&self) -> &str;
}

#[async_trait]
pub trait GasOracleSource: Send + Sync {
    /// Raw gas oracle response
    async fn gas_oracle(&self) -> Result<Value>;

    fn name(&self) -> &str;
}

/// The set of collaborators the tools are built from
#[derive(Clone)]
pub struct DataSources {
    pub market: Arc<dyn MarketDataSource>,
    pub defi: Arc<dyn DefiDataSource>,
    /// `None` when no listing API key is configured
    pub tokens: Option<Arc<dyn TokenListingSource>>,
    pub gas: Arc<dyn GasOracleSource>,
}

impl DataSources {
    /// Sources selected by `config.data_source`
    pub fn from_config(config: &AnalyticsConfig) -> Result<Self> {
        match config.data_source {
            DataSourceMode::Live => Self::live(config),
            DataSourceMode::Mock => Ok(Self::mock()),
        }
    }

    /// HTTP clients sharing one connection pool
    pub fn live(config: &AnalyticsConfig) -> Result<Self> {
        let http = config.http_client()?;

        let tokens = config.cmc_api_key.as_ref().map(|key| {
            Arc::new(CoinMarketCapClient::new(http.clone(), &config.cmc_api_url, key)) as Arc<dyn TokenListingSource>
        });

        Ok(Self {
            market: Arc::new(KucoinClient::new(http.clone(), &config.kucoin_api_url)),
            defi: Arc::new(LlamaClient::new(http.clone(), &config.llama_api_url)),
            tokens,
            gas: Arc::new(EtherscanClient::new(
                http,
                &config.etherscan_api_url,
                config.etherscan_api_key.clone(),
            )),
        })
    }

    pub fn mock() -> Self {
        let mock = Arc::new(MockDataSource::new());
        Self {
            market: mock.clone(),
            defi: mock.clone(),
            tokens: Some(mock.clone()),
            gas: mock,
        }
    }
}

/// Send a request and decode the JSON body, mapping failure statuses to
/// [`AnalyticsError::UpstreamUnavailable`]
pub(crate) async fn fetch_json<T: DeserializeOwned>(request: reqwest::RequestBuilder, what: &str) -> Result<T> {
    let response = request.send().await.map_err(|e| {
        tracing::warn!(what, error = %e, "Request failed");
        AnalyticsError::Network(e)
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(what, %status, "Upstream returned an error status");
        return Err(AnalyticsError::UpstreamUnavailable(format!(
            "{} returned {}: {}",
            what,
            status,
            body.chars().take(200).collect::<String>()
        )));
    }

    Ok(response.json::<T>().await?)
}
