//! Order Book Tool
//!
//! Depth-limited liquidity and spread of one market's order book.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use toolkit_core::{ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::{finish, optional_usize, or_na, required_str};
use crate::analysis::liquidity::{analyze_liquidity, LiquidityReport};
use crate::error::Result;
use crate::normalize::normalize_order_book;
use crate::source::MarketDataSource;

const NAME: &str = "analyze_order_book";

#[derive(Serialize)]
struct OrderBookReport {
    market: String,
    #[serde(flatten)]
    liquidity: LiquidityReport,
}

pub struct OrderBookTool {
    market: Arc<dyn MarketDataSource>,
    default_depth: usize,
}

impl OrderBookTool {
    pub fn new(market: Arc<dyn MarketDataSource>, default_depth: usize) -> Self {
        Self { market, default_depth }
    }

    async fn analyze(&self, market: &str, depth: Result<usize>) -> Result<OrderBookReport> {
        let depth = depth?;
        let raw = self.market.order_book(market).await?;
        let book = normalize_order_book(&raw)?;

        Ok(OrderBookReport {
            market: market.to_string(),
            liquidity: analyze_liquidity(&book, depth)?,
        })
    }
}

fn render(r: &OrderBookReport) -> String {
    let l = &r.liquidity;
    format!(
        "Order book {} (top {} levels, {} bids / {} asks):\n  Bid liquidity: {}\n  Ask liquidity: {}\n  Total liquidity: {}\n  Midpoint: {}\n  Spread: {}",
        r.market,
        l.depth,
        l.bid_levels,
        l.ask_levels,
        l.bid_liquidity.round_dp(2),
        l.ask_liquidity.round_dp(2),
        l.total_liquidity.round_dp(2),
        or_na(l.midpoint),
        l.spread_percentage.map_or_else(|| "N/A".into(), |s| format!("{:.4}%", s)),
    )
}

#[async_trait]
impl Tool for OrderBookTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Analyze order book depth: bid/ask liquidity over the top levels, midpoint and spread percentage.".into(),
            parameters: vec![
                ParameterSchema::required("market", "string", "Market pair, e.g. 'INJ/USDT'"),
                ParameterSchema::optional("depth", "integer", "Number of price levels per side to include")
                    .with_default(serde_json::json!(self.default_depth)),
            ],
            category: Some("market_data".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let market = required_str(call, "market")?;
        let depth = optional_usize(call, "depth", self.default_depth);
        finish(NAME, self.analyze(market, depth).await, render)
    }
}
