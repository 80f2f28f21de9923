//! Market Listing Tool
//!
//! Spot markets a venue lists, with base/quote tokens and tick sizes.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use toolkit_core::{ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::{finish, or_na};
use crate::analysis::markets::{list_spot_markets, MarketListing};
use crate::error::Result;
use crate::normalize::normalize_markets;
use crate::source::MarketDataSource;

const NAME: &str = "list_markets";
/// Rows shown in the text summary; `data` always carries every market
const SUMMARY_ROWS: usize = 25;

#[derive(Serialize)]
struct MarketListReport {
    venue: String,
    #[serde(flatten)]
    listing: MarketListing,
}

pub struct ListMarketsTool {
    market: Arc<dyn MarketDataSource>,
}

impl ListMarketsTool {
    pub fn new(market: Arc<dyn MarketDataSource>) -> Self {
        Self { market }
    }

    async fn list(&self, quote_token: Option<&str>) -> Result<MarketListReport> {
        let raw = self.market.markets().await?;
        let markets = normalize_markets(&raw)?;
        tracing::debug!(venue = self.market.name(), listed = markets.len(), "Markets loaded");

        Ok(MarketListReport {
            venue: self.market.name().to_string(),
            listing: list_spot_markets(markets, quote_token),
        })
    }
}

fn render(r: &MarketListReport) -> String {
    let l = &r.listing;
    let mut out = match &l.quote_filter {
        Some(quote) => format!("{} spot markets quoted in {} on {}:", l.count, quote, r.venue),
        None => format!("{} spot markets on {}:", l.count, r.venue),
    };
    for m in l.markets.iter().take(SUMMARY_ROWS) {
        out.push_str(&format!(
            "\n  {} (price tick {}, quantity tick {})",
            m.ticker,
            or_na(m.min_price_tick_size),
            or_na(m.min_quantity_tick_size),
        ));
    }
    if l.count > SUMMARY_ROWS {
        out.push_str(&format!("\n  ... and {} more", l.count - SUMMARY_ROWS));
    }
    out
}

#[async_trait]
impl Tool for ListMarketsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "List the tradable spot markets of the venue with their base/quote tokens and tick sizes.".into(),
            parameters: vec![ParameterSchema::optional(
                "quote_token",
                "string",
                "Only markets quoted in this token, e.g. 'USDT'",
            )],
            category: Some("market_data".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        finish(NAME, self.list(call.get_str("quote_token")).await, render)
    }
}
