//! DefiLlama client
//!
//! Protocol TVL, chain TVL history, DEX volumes and NFT aggregates.

use async_trait::async_trait;
use serde::Deserialize;

use super::{fetch_json, DefiDataSource};
use crate::error::Result;
use crate::model::{
    ChainInfo, ChainTvlPoint, NftCollection, NftMarketplace, ProtocolRecord, VolumeSeries, VolumeVenue,
};

#[derive(Clone, Debug)]
pub struct LlamaClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DexOverview {
    #[serde(default)]
    protocols: Vec<RawDex>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDex {
    name: String,
    #[serde(default)]
    chains: Option<Vec<String>>,
    #[serde(default)]
    total24h: Option<f64>,
    #[serde(default)]
    total7d: Option<f64>,
    #[serde(default, rename = "change_7d")]
    change_7d: Option<f64>,
    #[serde(default)]
    category: Option<String>,
}

impl From<RawDex> for VolumeVenue {
    fn from(raw: RawDex) -> Self {
        Self {
            name: raw.name,
            chains: raw.chains.unwrap_or_default(),
            volume_24h: raw.total24h.unwrap_or(0.0),
            volume_7d: raw.total7d.unwrap_or(0.0),
            change_7d: raw.change_7d,
            kind: raw.category,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DexSummary {
    #[serde(default)]
    total_data_chart: VolumeSeries,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCollection {
    #[serde(default)]
    name: String,
    #[serde(default)]
    chain: Option<String>,
    #[serde(default, rename = "floorPriceUSD")]
    floor_price_usd: Option<f64>,
    #[serde(default, rename = "dailyVolumeUSD")]
    daily_volume_usd: Option<f64>,
    #[serde(default)]
    daily_change: Option<f64>,
    #[serde(default)]
    weekly_change: Option<f64>,
}

impl From<RawCollection> for NftCollection {
    fn from(raw: RawCollection) -> Self {
        Self {
            name: raw.name,
            chain: raw.chain,
            floor_price_usd: raw.floor_price_usd,
            daily_volume_usd: raw.daily_volume_usd.unwrap_or(0.0),
            daily_change: raw.daily_change,
            weekly_change: raw.weekly_change,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMarketplace {
    #[serde(default)]
    name: String,
    #[serde(default)]
    chains: Option<Vec<String>>,
    #[serde(default, rename = "dailyVolumeUSD")]
    daily_volume_usd: Option<f64>,
    #[serde(default, rename = "weeklyVolumeUSD")]
    weekly_volume_usd: Option<f64>,
    #[serde(default)]
    market_share: Option<f64>,
}

impl From<RawMarketplace> for NftMarketplace {
    fn from(raw: RawMarketplace) -> Self {
        Self {
            name: raw.name,
            chains: raw.chains.unwrap_or_default(),
            daily_volume_usd: raw.daily_volume_usd.unwrap_or(0.0),
            weekly_volume_usd: raw.weekly_volume_usd,
            market_share: raw.market_share.unwrap_or(0.0),
        }
    }
}

impl LlamaClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL slug of a DEX display name: `Uniswap V3` -> `uniswap-v3`
    fn slug(name: &str) -> String {
        name.trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '-' })
            .collect()
    }
}

#[async_trait]
impl DefiDataSource for LlamaClient {
    async fn protocols(&self) -> Result<Vec<ProtocolRecord>> {
        let url = self.url("/protocols");
        tracing::debug!(url = %url, "DefiLlama request");
        fetch_json(self.client.get(&url), "DefiLlama protocols").await
    }

    async fn chain_tvl_history(&self, chain: &ChainInfo) -> Result<Vec<ChainTvlPoint>> {
        let url = self.url(&format!("/v2/historicalChainTvl/{}", chain.llama_name()));
        tracing::debug!(url = %url, "DefiLlama request");
        fetch_json(self.client.get(&url), "DefiLlama chain TVL").await
    }

    async fn dex_overview(&self) -> Result<Vec<VolumeVenue>> {
        let url = self.url("/overview/dexs");
        tracing::debug!(url = %url, "DefiLlama request");

        let overview: DexOverview = fetch_json(
            self.client.get(&url).query(&[
                ("excludeTotalDataChart", "true"),
                ("excludeTotalDataChartBreakdown", "true"),
                ("dataType", "dailyVolume"),
            ]),
            "DefiLlama DEX overview",
        )
        .await?;

        Ok(overview.protocols.into_iter().map(VolumeVenue::from).collect())
    }

    async fn dex_volume_chart(&self, dex: &str) -> Result<VolumeSeries> {
        let url = self.url(&format!("/summary/dexs/{}", Self::slug(dex)));
        tracing::debug!(url = %url, "DefiLlama request");

        let summary: DexSummary = fetch_json(
            self.client.get(&url).query(&[("dataType", "dailyVolume")]),
            "DefiLlama DEX summary",
        )
        .await?;

        Ok(summary.total_data_chart)
    }

    async fn nft_collections(&self) -> Result<Vec<NftCollection>> {
        let url = self.url("/nfts/collections");
        tracing::debug!(url = %url, "DefiLlama request");

        let raw: Vec<RawCollection> = fetch_json(self.client.get(&url), "DefiLlama NFT collections").await?;
        Ok(raw.into_iter().map(NftCollection::from).collect())
    }

    async fn nft_marketplaces(&self) -> Result<Vec<NftMarketplace>> {
        let url = self.url("/nfts/marketplaces");
        tracing::debug!(url = %url, "DefiLlama request");

        let raw: Vec<RawMarketplace> = fetch_json(self.client.get(&url), "DefiLlama NFT marketplaces").await?;
        Ok(raw.into_iter().map(NftMarketplace::from).collect())
    }

    fn name(&self) -> &str {
        "defillama"
    }
}
