//! DeFi Trends Tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use toolkit_core::{ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::{finish, signed_pct, usd_compact};
use crate::analysis::trends::{track_defi_trends, DefiTrendReport, TrendOptions};
use crate::error::{AnalyticsError, Result};
use crate::source::DefiDataSource;

const NAME: &str = "track_defi_trends";

pub struct DefiTrendsTool {
    defi: Arc<dyn DefiDataSource>,
    min_protocol_tvl: f64,
}

impl DefiTrendsTool {
    pub fn new(defi: Arc<dyn DefiDataSource>, min_protocol_tvl: f64) -> Self {
        Self { defi, min_protocol_tvl }
    }

    async fn analyze(&self, call: &ToolCall) -> Result<DefiTrendReport> {
        let min_protocol_tvl = match call.arguments.get("min_tvl") {
            None => self.min_protocol_tvl,
            Some(_) => call
                .get_f64("min_tvl")
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| AnalyticsError::InvalidInput("min_tvl must be a non-negative number".into()))?,
        };

        let protocols = self.defi.protocols().await?;
        tracing::debug!(protocols = protocols.len(), min_protocol_tvl, "Aggregating DeFi trends");

        Ok(track_defi_trends(&protocols, &TrendOptions { min_protocol_tvl }))
    }
}

fn render(r: &DefiTrendReport) -> String {
    let mut out = format!("DeFi trends (total TVL {}):\n  Top growing categories:", usd_compact(r.total_defi_tvl));
    for c in &r.top_growing_categories {
        out.push_str(&format!(
            "\n    {} {} 7d, {} across {} protocols",
            c.category,
            signed_pct(Some(c.change_7d)),
            usd_compact(c.total_tvl),
            c.count
        ));
    }
    out.push_str("\n  Top growing protocols:");
    for p in &r.top_growing_protocols {
        out.push_str(&format!("\n    {} ({}) {} 7d, {}", p.name, p.category, signed_pct(Some(p.change_7d)), usd_compact(p.tvl)));
    }
    out.push_str("\n  Chain dominance:");
    for c in &r.chain_dominance {
        out.push_str(&format!("\n    {} {:.2}% ({})", c.chain, c.percentage, usd_compact(c.tvl)));
    }
    out
}

#[async_trait]
impl Tool for DefiTrendsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Track DeFi trends: fastest-growing categories and protocols by 7d TVL change, and TVL dominance per chain.".into(),
            parameters: vec![ParameterSchema::optional(
                "min_tvl",
                "number",
                "Minimum protocol TVL (USD) for the top growing protocols list",
            )
            .with_default(json!(self.min_protocol_tvl))],
            category: Some("defi".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        finish(NAME, self.analyze(call).await, render)
    }
}
