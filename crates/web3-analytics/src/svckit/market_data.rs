//! Market Data Tool
//!
//! Headline quote for one market: last price, 24h stats and top of book.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;

use toolkit_core::{ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::{finish, or_na, required_str, signed_pct};
use crate::analysis::liquidity::{market_snapshot, MarketSnapshot};
use crate::error::Result;
use crate::normalize::{normalize_order_book, normalize_ticker};
use crate::source::MarketDataSource;

const NAME: &str = "get_market_data";

pub struct MarketDataTool {
    market: Arc<dyn MarketDataSource>,
}

impl MarketDataTool {
    pub fn new(market: Arc<dyn MarketDataSource>) -> Self {
        Self { market }
    }

    async fn snapshot(&self, market: &str) -> Result<MarketSnapshot> {
        let (ticker, book) = tokio::try_join!(self.market.ticker(market), self.market.order_book(market))?;
        let ticker = normalize_ticker(&ticker, market)?;
        let book = normalize_order_book(&book)?;
        Ok(market_snapshot(&ticker, &book))
    }
}

fn render(s: &MarketSnapshot) -> String {
    format!(
        "Market {}:\n  Last price: {}\n  24h change: {}\n  24h volume: {}\n  Best bid / ask: {} / {}\n  Spread: {}",
        s.symbol,
        or_na(s.last_price),
        signed_pct(s.change_24h_percent.and_then(|c| c.to_f64())),
        or_na(s.volume_24h),
        or_na(s.best_bid),
        or_na(s.best_ask),
        or_na(s.spread),
    )
}

#[async_trait]
impl Tool for MarketDataTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Get the current price, 24h change, 24h volume and best bid/ask of a spot market.".into(),
            parameters: vec![ParameterSchema::required(
                "market",
                "string",
                "Market pair, e.g. 'INJ/USDT'",
            )],
            category: Some("market_data".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let market = required_str(call, "market")?;
        finish(NAME, self.snapshot(market).await, render)
    }
}
