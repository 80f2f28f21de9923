//! Liquidity & Spread Analyzer
//!
//! Depth-limited liquidity sums, midpoint and relative spread of an order book.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};
use crate::model::{MarketTicker, OrderBook, OrderBookLevel};

pub const DEFAULT_DEPTH: usize = 10;

/// Liquidity metrics over the top `depth` levels of each side.
///
/// `midpoint` and `spread_percentage` are `None` (serialized as `null`)
/// whenever either side of the book is empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiquidityReport {
    pub depth: usize,
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
    pub bid_levels: usize,
    pub ask_levels: usize,
    pub bid_liquidity: Decimal,
    pub ask_liquidity: Decimal,
    pub total_liquidity: Decimal,
    pub midpoint: Option<Decimal>,
    pub spread_percentage: Option<Decimal>,
}

pub fn analyze_liquidity(book: &OrderBook, depth: usize) -> Result<LiquidityReport> {
    if depth == 0 {
        return Err(AnalyticsError::InvalidInput("depth must be a positive integer".into()));
    }

    let bids: Vec<OrderBookLevel> = book.bids.iter().take(depth).copied().collect();
    let asks: Vec<OrderBookLevel> = book.asks.iter().take(depth).copied().collect();

    let bid_liquidity = side_liquidity("bid", &bids)?;
    let ask_liquidity = side_liquidity("ask", &asks)?;
    let total_liquidity = bid_liquidity
        .checked_add(ask_liquidity)
        .ok_or_else(|| AnalyticsError::NotComputable("total liquidity exceeds decimal range".into()))?;

    let midpoint = match (book.best_bid(), book.best_ask()) {
        (Some(bid), Some(ask)) => Some(
            bid.checked_add(ask)
                .ok_or_else(|| AnalyticsError::NotComputable("midpoint exceeds decimal range".into()))?
                / Decimal::TWO,
        ),
        _ => None,
    };

    let spread_percentage = match (book.best_bid(), book.best_ask(), midpoint) {
        (Some(bid), Some(ask), Some(mid)) if !mid.is_zero() => {
            Some((ask - bid) / mid * Decimal::ONE_HUNDRED)
        }
        _ => None,
    };

    Ok(LiquidityReport {
        depth,
        bid_levels: bids.len(),
        ask_levels: asks.len(),
        bids,
        asks,
        bid_liquidity,
        ask_liquidity,
        total_liquidity,
        midpoint,
        spread_percentage,
    })
}

/// Sum of level notionals; overflow is reported rather than wrapped
fn side_liquidity(side: &str, levels: &[OrderBookLevel]) -> Result<Decimal> {
    levels.iter().try_fold(Decimal::ZERO, |acc, level| {
        level
            .notional()
            .and_then(|n| acc.checked_add(n))
            .ok_or_else(|| AnalyticsError::NotComputable(format!("{side} liquidity exceeds decimal range")))
    })
}

/// Headline quote for a market: ticker stats plus top of book
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub last_price: Option<Decimal>,
    pub change_24h_percent: Option<Decimal>,
    pub volume_24h: Option<Decimal>,
    pub best_bid: Option<Decimal>,
    pub best_ask: Option<Decimal>,
    /// Absolute `best_ask - best_bid`
    pub spread: Option<Decimal>,
}

/// Combine a ticker with the book; the book's top levels take precedence
/// over the ticker's bid/ask fields.
pub fn market_snapshot(ticker: &MarketTicker, book: &OrderBook) -> MarketSnapshot {
    let best_bid = book.best_bid().or(ticker.best_bid);
    let best_ask = book.best_ask().or(ticker.best_ask);

    MarketSnapshot {
        symbol: ticker.symbol.clone(),
        last_price: ticker.last_price,
        change_24h_percent: ticker.change_24h_percent,
        volume_24h: ticker.volume_24h,
        best_bid,
        best_ask,
        spread: best_bid.zip(best_ask).and_then(|(bid, ask)| ask.checked_sub(bid)),
    }
}
