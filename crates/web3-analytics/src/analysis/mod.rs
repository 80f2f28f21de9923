//! Pure analyzers. No I/O, no shared state.

pub mod chain_metrics;
pub mod indicators;
pub mod liquidity;
pub mod markets;
pub mod nft;
pub mod token_quote;
pub mod trends;
pub mod volume;

pub use chain_metrics::{analyze_chain_metrics, ChainMetrics, ChainProtocol};
pub use indicators::{compute_indicators, HistoryGap, IndicatorSnapshot};
pub use liquidity::{analyze_liquidity, market_snapshot, LiquidityReport, MarketSnapshot};
pub use markets::{list_spot_markets, MarketListing};
pub use nft::{track_nft_trends, NftTrendReport};
pub use token_quote::{find_listing, format_token_quote, TokenMetrics};
pub use trends::{track_defi_trends, DefiTrendReport, TrendOptions};
pub use volume::{filter_by_chain, find_venue, rank_by_volume, volume_trend, DexVolumeDetail, DexVolumeReport, VolumeTrend};
