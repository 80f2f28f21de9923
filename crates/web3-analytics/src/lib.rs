//! # web3-analytics
//!
//! Market-data aggregation and indicator computation for web3 markets,
//! exposed as tools behind the `toolkit_core::Tool` contract.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   raw JSON    ┌─────────────┐   models   ┌──────────────┐
//! │   source     │ ────────────► │  normalize  │ ─────────► │   analysis   │
//! │ KuCoin       │               │ order books │            │ liquidity    │
//! │ DefiLlama    │   typed recs  │ tickers     │            │ indicators   │
//! │ CoinMarketCap│ ──────────────┼─────────────┼──────────► │ trends       │
//! │ Etherscan    │               │ candles/gas │            │ volume, nft  │
//! └──────────────┘               └─────────────┘            └──────┬───────┘
//!        ▲                                                         │ report
//!        │ Arc<dyn …Source>                                        ▼
//! ┌──────┴──────────────────────────────────────────────────────────────────┐
//! │ svckit: get_market_data · list_markets · analyze_order_book ·           │
//! │ calculate_technical_indicators · analyze_chain_metrics ·                │
//! │ track_defi_trends · monitor_token_metrics · analyze_dex_volume ·        │
//! │ track_nft_trends                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `analysis` and `normalize` are synchronous and free of I/O; all network
//! access lives in `source`.

pub mod analysis;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod source;
pub mod svckit;

pub use config::{AnalyticsConfig, DataSourceMode};
pub use error::{AnalyticsError, Result};
pub use model::{ChainInfo, OhlcvBar, OrderBook, OrderBookLevel, ProtocolRecord, SpotMarket, Timeframe, SUPPORTED_CHAINS};
pub use source::{DataSources, DefiDataSource, GasOracleSource, MarketDataSource, TokenListingSource};
pub use svckit::register_tools;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{
        ChainMetricsTool, DefiTrendsTool, DexVolumeTool, ListMarketsTool, MarketDataTool, NftTrendsTool,
        OrderBookTool, TechnicalIndicatorsTool, TokenMetricsTool,
    };
}
