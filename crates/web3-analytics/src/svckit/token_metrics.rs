//! Token Metrics Tool

use std::sync::Arc;

use async_trait::async_trait;

use toolkit_core::{ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::{finish, or_na, required_str, signed_pct};
use crate::analysis::token_quote::{find_listing, format_token_quote, TokenMetrics};
use crate::error::Result;
use crate::source::TokenListingSource;

const NAME: &str = "monitor_token_metrics";

pub struct TokenMetricsTool {
    tokens: Arc<dyn TokenListingSource>,
}

impl TokenMetricsTool {
    pub fn new(tokens: Arc<dyn TokenListingSource>) -> Self {
        Self { tokens }
    }

    async fn analyze(&self, symbol: &str) -> Result<TokenMetrics> {
        let listings = self.tokens.listings().await?;
        let listing = find_listing(&listings, symbol)?;
        tracing::debug!(symbol, id = listing.id, "Token listing matched");

        let quotes = self.tokens.quotes(listing.id).await?;
        format_token_quote(listing, &quotes)
    }
}

fn render(m: &TokenMetrics) -> String {
    format!(
        "{} ({}) rank #{}:\n  Price: ${}\n  Market cap: ${}\n  24h volume: ${}\n  Change 1h / 24h / 7d / 30d: {} / {} / {} / {}\n  Supply circulating / total / max: {} / {} / {}",
        m.name,
        m.symbol,
        or_na(m.cmc_rank),
        or_na(m.price_usd),
        or_na(m.market_cap.map(|v| v.round_dp(0))),
        or_na(m.volume_24h.map(|v| v.round_dp(0))),
        signed_pct(m.change_1h),
        signed_pct(m.change_24h),
        signed_pct(m.change_7d),
        signed_pct(m.change_30d),
        or_na(m.circulating_supply),
        or_na(m.total_supply),
        or_na(m.max_supply),
    )
}

#[async_trait]
impl Tool for TokenMetricsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Get a token's price, market cap, volume, price changes, supply and rank by ticker symbol.".into(),
            parameters: vec![ParameterSchema::required("symbol", "string", "Token ticker, e.g. 'INJ'")],
            category: Some("market_data".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let symbol = required_str(call, "symbol")?;
        finish(NAME, self.analyze(symbol).await, render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockDataSource;
    use serde_json::json;

    fn tool() -> TokenMetricsTool {
        TokenMetricsTool::new(Arc::new(MockDataSource::new()))
    }

    #[tokio::test]
    async fn test_quote_by_symbol() {
        let call = ToolCall::new(NAME).with_arg("symbol", json!("inj"));
        let result = tool().execute(&call).await.unwrap();

        assert!(result.success, "{}", result.output);
        let data = result.data.unwrap();
        assert_eq!(data["symbol"], "INJ");
        assert_eq!(data["cmc_rank"], 37);
        assert!(data["max_supply"].is_null());
        assert!(result.output.contains("Injective (INJ) rank #37"));
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let call = ToolCall::new(NAME).with_arg("symbol", json!("NOPE"));
        let result = tool().execute(&call).await.unwrap();
        assert_eq!(result.code.as_deref(), Some("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_listing_without_quote() {
        let call = ToolCall::new(NAME).with_arg("symbol", json!("GONE"));
        let result = tool().execute(&call).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.code.as_deref(), Some("NOT_FOUND"));
        assert!(result.data.is_none());
    }
}
