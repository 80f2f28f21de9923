//! Domain Models
//!
//! Normalized market-data and DeFi records shared by the analyzers.
//! Order-book and quote amounts use `rust_decimal`; statistical series
//! (candles, TVL, volumes, percentages) use `f64`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// One price level of an order book
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub price: Decimal,
    pub quantity: Decimal,
}

impl OrderBookLevel {
    /// Build a level, rejecting non-positive prices and negative quantities
    pub fn new(price: Decimal, quantity: Decimal) -> Option<Self> {
        (price > Decimal::ZERO && quantity >= Decimal::ZERO).then_some(Self { price, quantity })
    }

    /// Quote-currency value of the level, `None` when it exceeds `Decimal` range
    pub fn notional(&self) -> Option<Decimal> {
        self.price.checked_mul(self.quantity)
    }
}

/// Bids sorted by descending price, asks by ascending price.
///
/// Crossed books (best bid >= best ask) are kept as delivered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
}

impl OrderBook {
    pub fn new(mut bids: Vec<OrderBookLevel>, mut asks: Vec<OrderBookLevel>) -> Self {
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        asks.sort_by(|a, b| a.price.cmp(&b.price));
        Self { bids, asks }
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|l| l.price)
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|l| l.price)
    }
}

/// 24h ticker statistics for a market
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketTicker {
    pub symbol: String,
    pub last_price: Option<Decimal>,
    pub change_24h_percent: Option<Decimal>,
    pub volume_24h: Option<Decimal>,
    pub best_bid: Option<Decimal>,
    pub best_ask: Option<Decimal>,
}

/// Spot pair listed by a venue, with its tick sizes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpotMarket {
    /// `BASE/QUOTE`
    pub ticker: String,
    /// Venue identifier: exchange symbol or on-chain market id
    pub market_id: String,
    pub base_token: String,
    pub quote_token: String,
    pub min_price_tick_size: Option<Decimal>,
    pub min_quantity_tick_size: Option<Decimal>,
    pub trading_enabled: bool,
}

/// One candle. Timestamps are unix milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Candle interval label accepted by the indicator tool
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "1w")]
    W1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 8] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
        Timeframe::W1,
    ];

    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        Self::ALL.into_iter().find(|tf| tf.label() == label)
    }

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
            Timeframe::W1 => "1w",
        }
    }

    pub fn duration_secs(self) -> i64 {
        match self {
            Timeframe::M1 => 60,
            Timeframe::M5 => 300,
            Timeframe::M15 => 900,
            Timeframe::M30 => 1_800,
            Timeframe::H1 => 3_600,
            Timeframe::H4 => 14_400,
            Timeframe::D1 => 86_400,
            Timeframe::W1 => 604_800,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A DeFi protocol as listed by the TVL aggregator.
///
/// Null or missing `tvl` / `change_7d` read as 0, a missing category as "Other".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProtocolRecord {
    #[serde(default)]
    pub name: String,

    #[serde(default = "other_category", deserialize_with = "other_if_null")]
    pub category: String,

    #[serde(default, deserialize_with = "zero_if_null")]
    pub tvl: f64,

    #[serde(default)]
    pub change_1d: Option<f64>,

    #[serde(default, deserialize_with = "zero_if_null")]
    pub change_7d: f64,

    #[serde(default, deserialize_with = "empty_if_null")]
    pub chains: Vec<String>,
}

impl ProtocolRecord {
    pub fn new(name: impl Into<String>, category: impl Into<String>, tvl: f64, change_7d: f64, chains: &[&str]) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            tvl,
            change_1d: None,
            change_7d,
            chains: chains.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// Case-insensitive chain membership
    pub fn is_on_chain(&self, chain: &ChainInfo) -> bool {
        self.chains.iter().any(|c| chain.matches(c))
    }
}

/// One point of a chain's historical TVL
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainTvlPoint {
    /// Unix seconds
    pub date: i64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub tvl: f64,
}

/// A `(timestamp, volume)` observation, deserializable from `[ts, volume]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "(i64, Option<f64>)")]
pub struct VolumePoint {
    pub timestamp: i64,
    pub volume: f64,
}

impl From<(i64, Option<f64>)> for VolumePoint {
    fn from((timestamp, volume): (i64, Option<f64>)) -> Self {
        Self {
            timestamp,
            volume: volume.unwrap_or(0.0),
        }
    }
}

pub type VolumeSeries = Vec<VolumePoint>;

/// A trading venue ranked by volume: a DEX or an NFT marketplace
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VolumeVenue {
    pub name: String,
    pub chains: Vec<String>,
    pub volume_24h: f64,
    pub volume_7d: f64,
    pub change_7d: Option<f64>,
    pub kind: Option<String>,
}

/// An NFT collection with its daily trading stats
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NftCollection {
    pub name: String,
    pub chain: Option<String>,
    pub floor_price_usd: Option<f64>,
    pub daily_volume_usd: f64,
    pub daily_change: Option<f64>,
    pub weekly_change: Option<f64>,
}

/// An NFT marketplace; `market_share` is a fraction in `[0, 1]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NftMarketplace {
    pub name: String,
    pub chains: Vec<String>,
    pub daily_volume_usd: f64,
    pub weekly_volume_usd: Option<f64>,
    pub market_share: f64,
}

/// Entry of the token-listing search result
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenListing {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
}

/// Detailed token quote, shaped like the listing API's quote endpoint
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenQuoteDetail {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub circulating_supply: Option<Decimal>,
    #[serde(default)]
    pub total_supply: Option<Decimal>,
    #[serde(default)]
    pub max_supply: Option<Decimal>,
    #[serde(default)]
    pub cmc_rank: Option<u32>,
    /// Quotes keyed by convert currency (e.g. "USD")
    #[serde(default)]
    pub quote: HashMap<String, CurrencyQuote>,
}

impl TokenQuoteDetail {
    pub fn usd(&self) -> Option<&CurrencyQuote> {
        self.quote.get("USD")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyQuote {
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub market_cap: Option<Decimal>,
    #[serde(default)]
    pub volume_24h: Option<Decimal>,
    #[serde(default)]
    pub percent_change_1h: Option<f64>,
    #[serde(default)]
    pub percent_change_24h: Option<f64>,
    #[serde(default)]
    pub percent_change_7d: Option<f64>,
    #[serde(default)]
    pub percent_change_30d: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Gas prices in gwei
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GasPrices {
    pub last_block: Option<u64>,
    pub safe_gwei: Decimal,
    pub propose_gwei: Decimal,
    pub fast_gwei: Decimal,
    pub base_fee_gwei: Option<Decimal>,
}

/// Entry of the fixed chain alias table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ChainInfo {
    /// Identifier accepted by the tools (lowercase)
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Names the TVL aggregator uses for this chain
    pub llama_names: &'static [&'static str],
    /// Whether the chain is EVM-compatible (gas oracle applies)
    pub evm: bool,
}

impl ChainInfo {
    /// Case-insensitive match against any of the aggregator's names
    pub fn matches(&self, chain_name: &str) -> bool {
        self.llama_names.iter().any(|n| n.eq_ignore_ascii_case(chain_name.trim()))
    }

    /// Name used in the aggregator's per-chain endpoints
    pub fn llama_name(&self) -> &'static str {
        self.llama_names.first().copied().unwrap_or(self.name)
    }

    /// Look up a chain by tool identifier, case-insensitively
    pub fn lookup(id: &str) -> Option<&'static ChainInfo> {
        let id = id.trim();
        SUPPORTED_CHAINS.iter().find(|c| c.id.eq_ignore_ascii_case(id))
    }

    /// Comma-separated list of supported identifiers, for error messages
    pub fn supported_ids() -> String {
        SUPPORTED_CHAINS.iter().map(|c| c.id).collect::<Vec<_>>().join(", ")
    }
}

pub const SUPPORTED_CHAINS: &[ChainInfo] = &[
    ChainInfo { id: "ethereum", name: "Ethereum", llama_names: &["Ethereum"], evm: true },
    ChainInfo { id: "injective", name: "Injective", llama_names: &["Injective"], evm: false },
    ChainInfo { id: "solana", name: "Solana", llama_names: &["Solana"], evm: false },
    ChainInfo { id: "arbitrum", name: "Arbitrum", llama_names: &["Arbitrum"], evm: true },
    ChainInfo { id: "optimism", name: "Optimism", llama_names: &["Optimism", "OP Mainnet"], evm: true },
    ChainInfo { id: "polygon", name: "Polygon", llama_names: &["Polygon"], evm: true },
    ChainInfo { id: "base", name: "Base", llama_names: &["Base"], evm: true },
];

fn other_category() -> String {
    "Other".into()
}

fn zero_if_null<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Option::<f64>::deserialize(d).map(|v| v.unwrap_or(0.0))
}

fn other_if_null<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(d).map(|v| v.filter(|s| !s.is_empty()).unwrap_or_else(other_category))
}

fn empty_if_null<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Option::<Vec<String>>::deserialize(d).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_order_book_sorts_sides() {
        let book = OrderBook::new(
            vec![
                OrderBookLevel::new(dec!(9), dec!(1)).unwrap(),
                OrderBookLevel::new(dec!(10), dec!(2)).unwrap(),
            ],
            vec![
                OrderBookLevel::new(dec!(12), dec!(1)).unwrap(),
                OrderBookLevel::new(dec!(11), dec!(1)).unwrap(),
            ],
        );
        assert_eq!(book.best_bid(), Some(dec!(10)));
        assert_eq!(book.best_ask(), Some(dec!(11)));
    }

    #[test]
    fn test_level_invariant() {
        assert!(OrderBookLevel::new(dec!(0), dec!(1)).is_none());
        assert!(OrderBookLevel::new(dec!(1), dec!(-1)).is_none());
        assert!(OrderBookLevel::new(dec!(1), dec!(0)).is_some());
    }

    #[test]
    fn test_protocol_record_tolerates_nulls() {
        let record: ProtocolRecord = serde_json::from_value(json!({
            "name": "Lido",
            "category": null,
            "tvl": null,
            "change_7d": null,
            "chains": null
        }))
        .unwrap();
        assert_eq!(record.category, "Other");
        assert_eq!(record.tvl, 0.0);
        assert_eq!(record.change_7d, 0.0);
        assert!(record.chains.is_empty());

        let record: ProtocolRecord = serde_json::from_value(json!({ "name": "Aave" })).unwrap();
        assert_eq!(record.category, "Other");
    }

    #[test]
    fn test_volume_point_from_pair() {
        let points: VolumeSeries = serde_json::from_value(json!([[1700000000, 12.5], [1700086400, null]])).unwrap();
        assert_eq!(points[0].volume, 12.5);
        assert_eq!(points[1].volume, 0.0);
    }

    #[test]
    fn test_chain_lookup() {
        let optimism = ChainInfo::lookup("Optimism").unwrap();
        assert!(optimism.matches("op mainnet"));
        assert!(optimism.evm);
        assert!(ChainInfo::lookup("mars").is_none());
        assert!(ChainInfo::supported_ids().starts_with("ethereum, injective"));
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!(Timeframe::parse("1H"), Some(Timeframe::H1));
        assert_eq!(Timeframe::parse("2h"), None);
        assert_eq!(Timeframe::D1.to_string(), "1d");
    }
}
