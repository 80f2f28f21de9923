//! Mock Data Source
//!
//! Deterministic fixtures for every source trait. Used by the tests and by
//! the server's `mock` data mode. Raw market payloads mimic the live venues
//! so they go through the same normalization.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use super::{DefiDataSource, GasOracleSource, MarketDataSource, TokenListingSource};
use crate::error::{AnalyticsError, Result};
use crate::model::{
    ChainInfo, ChainTvlPoint, CurrencyQuote, NftCollection, NftMarketplace, ProtocolRecord, Timeframe,
    TokenListing, TokenQuoteDetail, VolumePoint, VolumeSeries, VolumeVenue, SUPPORTED_CHAINS,
};
use crate::normalize::CandleLayout;

/// Unix seconds of the most recent fixture candle / TVL point
const ANCHOR_SECS: i64 = 1_717_200_000;
const DAY_SECS: i64 = 86_400;
const BOOK_LEVELS: u32 = 15;

/// In-memory data source with static fixtures
pub struct MockDataSource {
    /// When false every call fails as an upstream outage
    available: bool,
}

impl Default for MockDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDataSource {
    pub fn new() -> Self {
        Self { available: true }
    }

    /// A source whose every call fails with `UpstreamUnavailable`
    pub fn unavailable() -> Self {
        Self { available: false }
    }

    fn guard(&self) -> Result<()> {
        if self.available {
            Ok(())
        } else {
            Err(AnalyticsError::UpstreamUnavailable("mock source offline".into()))
        }
    }

    /// (base price, bars of history)
    fn market(market: &str) -> Result<(&'static str, Decimal, usize)> {
        let key = market.trim().replace(['-', '_'], "/").to_uppercase();
        match key.as_str() {
            "INJ/USDT" => Ok(("INJ/USDT", dec!(24.30), 500)),
            "ETH/USDT" => Ok(("ETH/USDT", dec!(3450), 500)),
            "SOL/USDT" => Ok(("SOL/USDT", dec!(195), 500)),
            "ETH/BTC" => Ok(("ETH/BTC", dec!(0.0512), 500)),
            // freshly listed market with a short history
            "NEW/USDT" => Ok(("NEW/USDT", dec!(0.85), 10)),
            _ => Err(AnalyticsError::not_found("Market", market.trim())),
        }
    }

    fn book_levels(base: Decimal, side: Decimal) -> Vec<(Decimal, Decimal)> {
        (1..=BOOK_LEVELS)
            .map(|k| {
                let offset = base * dec!(0.001) * Decimal::from(k);
                let price = (base + side * offset).round_dp(4);
                (price, dec!(10) + Decimal::from(k * 3))
            })
            .collect()
    }

    fn protocol_fixtures() -> Vec<ProtocolRecord> {
        let evm_all = ["Ethereum", "Arbitrum", "Optimism", "Polygon", "Base"];
        vec![
            ProtocolRecord::new("Lido", "Liquid Staking", 30_000_000_000.0, 2.1, &["Ethereum"]),
            ProtocolRecord::new("EigenLayer", "Restaking", 15_000_000_000.0, -0.8, &["Ethereum"]),
            ProtocolRecord::new("Aave", "Lending", 12_000_000_000.0, 1.2, &evm_all),
            ProtocolRecord::new("Uniswap", "Dexes", 5_000_000_000.0, 3.5, &evm_all),
            ProtocolRecord::new("Jito", "Liquid Staking", 2_500_000_000.0, 6.4, &["Solana"]),
            ProtocolRecord::new("Raydium", "Dexes", 1_800_000_000.0, 9.1, &["Solana"]),
            ProtocolRecord::new("GMX", "Derivatives", 600_000_000.0, -3.1, &["Arbitrum"]),
            ProtocolRecord::new("Velodrome", "Dexes", 300_000_000.0, 2.2, &["OP Mainnet"]),
            ProtocolRecord::new("Helix", "Dexes", 40_000_000.0, 4.0, &["Injective"]),
            ProtocolRecord::new("Mito", "Yield", 12_000_000.0, -1.5, &["Injective"]),
            ProtocolRecord::new("Dust Farm", "Yield", 200_000.0, 85.0, &["Base"]),
            ProtocolRecord::new("Offchain Vault", "CEX", 1_000_000_000.0, 0.0, &[]),
        ]
    }

    fn dex_fixtures() -> Vec<VolumeVenue> {
        let dex = |name: &str, chains: &[&str], volume_24h: f64, change_7d: f64| VolumeVenue {
            name: name.to_string(),
            chains: chains.iter().map(|c| (*c).to_string()).collect(),
            volume_24h,
            volume_7d: volume_24h * 7.2,
            change_7d: Some(change_7d),
            kind: Some("Dexes".into()),
        };
        vec![
            dex("Uniswap", &["Ethereum", "Arbitrum", "Optimism", "Polygon", "Base"], 1_200_000_000.0, 4.2),
            dex("Raydium", &["Solana"], 900_000_000.0, 11.0),
            dex("PancakeSwap", &["BSC", "Ethereum", "Base"], 700_000_000.0, -2.0),
            dex("Aerodrome", &["Base"], 400_000_000.0, 6.5),
            dex("Velodrome", &["OP Mainnet"], 60_000_000.0, 1.1),
            dex("Camelot", &["Arbitrum"], 40_000_000.0, -7.3),
            dex("QuickSwap", &["Polygon"], 30_000_000.0, 0.4),
            dex("Helix", &["Injective"], 1_250_000.0, -2.5),
        ]
    }

    /// Days of volume history per DEX; Helix is recently listed
    fn chart_days(name: &str) -> usize {
        if name.eq_ignore_ascii_case("Helix") { 3 } else { 40 }
    }

    fn quote_fixture(listing: &TokenListing, price: Decimal, supply: Decimal, rank: u32) -> TokenQuoteDetail {
        let usd = CurrencyQuote {
            price: Some(price),
            market_cap: Some(price * supply),
            volume_24h: Some((price * supply * dec!(0.04)).round_dp(2)),
            percent_change_1h: Some(0.35),
            percent_change_24h: Some(-1.8),
            percent_change_7d: Some(5.2),
            percent_change_30d: Some(-12.4),
            last_updated: Some("2024-06-01T00:00:00.000Z".into()),
        };
        TokenQuoteDetail {
            id: listing.id,
            name: listing.name.clone(),
            symbol: listing.symbol.clone(),
            circulating_supply: Some(supply),
            total_supply: Some(supply),
            max_supply: None,
            cmc_rank: Some(rank),
            quote: HashMap::from([("USD".to_string(), usd)]),
        }
    }
}

fn listing(id: u64, name: &str, symbol: &str) -> TokenListing {
    TokenListing {
        id,
        name: name.into(),
        symbol: symbol.into(),
    }
}

#[async_trait]
impl MarketDataSource for MockDataSource {
    async fn order_book(&self, market: &str) -> Result<Value> {
        self.guard()?;
        let (symbol, base, _) = Self::market(market)?;
        let bids = Self::book_levels(base, Decimal::NEGATIVE_ONE);
        let asks = Self::book_levels(base, Decimal::ONE);

        // INJ comes in the chain indexer's shape, the rest like a CEX
        if symbol == "INJ/USDT" {
            let side = |levels: Vec<(Decimal, Decimal)>| {
                levels
                    .into_iter()
                    .map(|(p, q)| json!({"price": p.to_string(), "quantity": q.to_string()}))
                    .collect::<Vec<_>>()
            };
            Ok(json!({"orderbook": {"buys": side(bids), "sells": side(asks)}}))
        } else {
            let side = |levels: Vec<(Decimal, Decimal)>| {
                levels
                    .into_iter()
                    .map(|(p, q)| json!([p.to_string(), q.to_string()]))
                    .collect::<Vec<_>>()
            };
            Ok(json!({"code": "200000", "data": {"bids": side(bids), "asks": side(asks)}}))
        }
    }

    async fn ticker(&self, market: &str) -> Result<Value> {
        self.guard()?;
        let (symbol, base, _) = Self::market(market)?;
        let step = base * dec!(0.001);
        Ok(json!({
            "code": "200000",
            "data": {
                "symbol": symbol.replace('/', "-"),
                "last": base.to_string(),
                "changeRate": "0.0342",
                "vol": "1523000.5",
                "buy": (base - step).round_dp(4).to_string(),
                "sell": (base + step).round_dp(4).to_string()
            }
        }))
    }

    async fn candles(&self, market: &str, timeframe: Timeframe, limit: usize) -> Result<Value> {
        self.guard()?;
        let (_, base, history) = Self::market(market)?;
        let base = base.to_f64().unwrap_or(1.0);
        let count = limit.min(history);
        let step = timeframe.duration_secs();

        // newest first, as the venue returns them
        let rows: Vec<Value> = (0..count)
            .map(|age| {
                let i = (history - age) as f64;
                let close = base * (1.0 + 0.03 * (i / 4.0).sin() + 0.0005 * i);
                let open = base * (1.0 + 0.03 * ((i - 1.0) / 4.0).sin() + 0.0005 * (i - 1.0));
                let high = open.max(close) * 1.004;
                let low = open.min(close) * 0.996;
                let volume = 1_000.0 + 25.0 * (i % 17.0);
                json!([
                    (ANCHOR_SECS - step * age as i64).to_string(),
                    format!("{:.6}", open),
                    format!("{:.6}", close),
                    format!("{:.6}", high),
                    format!("{:.6}", low),
                    format!("{:.4}", volume),
                    format!("{:.4}", volume * close),
                ])
            })
            .collect();

        Ok(json!({"code": "200000", "data": rows}))
    }

    async fn markets(&self) -> Result<Value> {
        self.guard()?;
        let listed = [
            ("INJ", "USDT", "0.001", true),
            ("ETH", "USDT", "0.01", true),
            ("SOL", "USDT", "0.01", true),
            ("NEW", "USDT", "0.0001", true),
            ("ETH", "BTC", "0.00001", true),
            // delisted, kept in the venue's catalogue
            ("OLD", "USDT", "0.0001", false),
        ];
        let rows: Vec<Value> = listed
            .iter()
            .map(|(base, quote, price_tick, enabled)| {
                json!({
                    "symbol": format!("{base}-{quote}"),
                    "baseCurrency": base,
                    "quoteCurrency": quote,
                    "priceIncrement": price_tick,
                    "baseIncrement": "0.0001",
                    "enableTrading": enabled
                })
            })
            .collect();
        Ok(json!({"code": "200000", "data": rows}))
    }

    fn candle_layout(&self) -> CandleLayout {
        CandleLayout::Kucoin
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[async_trait]
impl DefiDataSource for MockDataSource {
    async fn protocols(&self) -> Result<Vec<ProtocolRecord>> {
        self.guard()?;
        Ok(Self::protocol_fixtures())
    }

    async fn chain_tvl_history(&self, chain: &ChainInfo) -> Result<Vec<ChainTvlPoint>> {
        self.guard()?;
        let rank = SUPPORTED_CHAINS.iter().position(|c| c.id == chain.id).unwrap_or(0);
        let base = 1_000_000_000.0 * (SUPPORTED_CHAINS.len() - rank) as f64;

        Ok((0..30)
            .map(|i| ChainTvlPoint {
                date: ANCHOR_SECS - DAY_SECS * (29 - i),
                tvl: base * (1.0 + 0.005 * i as f64),
            })
            .collect())
    }

    async fn dex_overview(&self) -> Result<Vec<VolumeVenue>> {
        self.guard()?;
        Ok(Self::dex_fixtures())
    }

    async fn dex_volume_chart(&self, dex: &str) -> Result<VolumeSeries> {
        self.guard()?;
        let venue = Self::dex_fixtures()
            .into_iter()
            .find(|v| v.name.eq_ignore_ascii_case(dex.trim()))
            .ok_or_else(|| AnalyticsError::not_found("DEX", dex.trim()))?;

        let days = Self::chart_days(&venue.name);
        Ok((0..days)
            .map(|i| VolumePoint {
                timestamp: ANCHOR_SECS - DAY_SECS * (days - 1 - i) as i64,
                volume: venue.volume_24h * (0.8 + 0.01 * i as f64),
            })
            .collect())
    }

    async fn nft_collections(&self) -> Result<Vec<NftCollection>> {
        self.guard()?;
        let collection = |name: &str, chain: Option<&str>, floor: f64, volume: f64, weekly: f64| NftCollection {
            name: name.to_string(),
            chain: chain.map(str::to_string),
            floor_price_usd: Some(floor),
            daily_volume_usd: volume,
            daily_change: Some(weekly / 7.0),
            weekly_change: Some(weekly),
        };
        Ok(vec![
            collection("Pudgy Penguins", Some("Ethereum"), 36_000.0, 1_900_000.0, 14.0),
            collection("CryptoPunks", Some("Ethereum"), 120_000.0, 1_400_000.0, -3.0),
            collection("Mad Lads", Some("Solana"), 18_000.0, 650_000.0, 22.5),
            collection("Bored Ape Yacht Club", Some("Ethereum"), 42_000.0, 600_000.0, -8.2),
            collection("Tensorians", Some("Solana"), 2_100.0, 120_000.0, 4.1),
            collection("Ninja Squad", Some("Injective"), 350.0, 9_000.0, 31.0),
            collection("Untracked Drop", None, 15.0, 2_500.0, 0.0),
        ])
    }

    async fn nft_marketplaces(&self) -> Result<Vec<NftMarketplace>> {
        self.guard()?;
        let marketplace = |name: &str, chains: &[&str], volume: f64, share: f64| NftMarketplace {
            name: name.to_string(),
            chains: chains.iter().map(|c| (*c).to_string()).collect(),
            daily_volume_usd: volume,
            weekly_volume_usd: Some(volume * 7.0),
            market_share: share,
        };
        Ok(vec![
            marketplace("OpenSea", &["Ethereum", "Polygon", "Base"], 1_750_000.0, 0.35),
            marketplace("Blur", &["Ethereum", "Blast"], 2_250_000.0, 0.45),
            marketplace("Magic Eden", &["Solana", "Ethereum"], 750_000.0, 0.15),
            marketplace("Tensor", &["Solana"], 250_000.0, 0.05),
        ])
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[async_trait]
impl TokenListingSource for MockDataSource {
    async fn listings(&self) -> Result<Vec<TokenListing>> {
        self.guard()?;
        Ok(vec![
            listing(1027, "Ethereum", "ETH"),
            listing(5426, "Solana", "SOL"),
            listing(7226, "Injective", "INJ"),
            listing(11841, "Arbitrum", "ARB"),
            // listed without a quote
            listing(99999, "Delisted Token", "GONE"),
        ])
    }

    async fn quotes(&self, id: u64) -> Result<HashMap<String, TokenQuoteDetail>> {
        self.guard()?;
        let detail = match id {
            1027 => Self::quote_fixture(&listing(1027, "Ethereum", "ETH"), dec!(3450), dec!(120000000), 2),
            5426 => Self::quote_fixture(&listing(5426, "Solana", "SOL"), dec!(195), dec!(460000000), 5),
            7226 => Self::quote_fixture(&listing(7226, "Injective", "INJ"), dec!(24.30), dec!(97727483), 37),
            11841 => Self::quote_fixture(&listing(11841, "Arbitrum", "ARB"), dec!(0.92), dec!(3600000000), 48),
            _ => return Ok(HashMap::new()),
        };
        Ok(HashMap::from([(id.to_string(), detail)]))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[async_trait]
impl GasOracleSource for MockDataSource {
    async fn gas_oracle(&self) -> Result<Value> {
        self.guard()?;
        Ok(json!({
            "status": "1",
            "message": "OK",
            "result": {
                "LastBlock": "19987654",
                "SafeGasPrice": "6",
                "ProposeGasPrice": "7",
                "FastGasPrice": "9",
                "suggestBaseFee": "5.871",
                "gasUsedRatio": "0.41,0.53,0.98"
            }
        }))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize_candles, normalize_gas_oracle, normalize_order_book, normalize_ticker};

    #[tokio::test]
    async fn test_mock_books_normalize() {
        let mock = MockDataSource::new();
        for market in ["INJ/USDT", "eth-usdt"] {
            let book = normalize_order_book(&mock.order_book(market).await.unwrap()).unwrap();
            assert_eq!(book.bids.len(), BOOK_LEVELS as usize);
            assert!(book.best_bid().unwrap() < book.best_ask().unwrap());
        }
    }

    #[tokio::test]
    async fn test_mock_ticker_normalizes() {
        let mock = MockDataSource::new();
        let ticker = normalize_ticker(&mock.ticker("INJ/USDT").await.unwrap(), "INJ/USDT").unwrap();
        assert_eq!(ticker.last_price, Some(dec!(24.30)));
        assert_eq!(ticker.change_24h_percent, Some(dec!(3.42)));
    }

    #[tokio::test]
    async fn test_mock_candles_are_ascending_and_capped() {
        let mock = MockDataSource::new();
        let raw = mock.candles("INJ/USDT", Timeframe::H1, 64).await.unwrap();
        let bars = normalize_candles(&raw, mock.candle_layout()).unwrap();
        assert_eq!(bars.len(), 64);
        assert!(bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(bars.last().unwrap().timestamp, ANCHOR_SECS * 1000);

        let short = mock.candles("NEW/USDT", Timeframe::H1, 64).await.unwrap();
        assert_eq!(normalize_candles(&short, CandleLayout::Kucoin).unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_unknown_market() {
        let mock = MockDataSource::new();
        assert!(matches!(
            mock.order_book("DOGE/EUR").await,
            Err(AnalyticsError::NotFound { kind: "Market", .. })
        ));
    }

    #[tokio::test]
    async fn test_unavailable_source() {
        let mock = MockDataSource::unavailable();
        let err = mock.protocols().await.unwrap_err();
        assert_eq!(err.code(), "UPSTREAM_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_mock_gas_oracle() {
        let gas = normalize_gas_oracle(&MockDataSource::new().gas_oracle().await.unwrap()).unwrap();
        assert_eq!(gas.fast_gwei, dec!(9));
        assert_eq!(gas.last_block, Some(19_987_654));
    }
}
