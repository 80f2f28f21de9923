//! Service Kit - Analytics Tools
//!
//! Tools that implement `toolkit_core::Tool`: each parses its arguments,
//! fetches raw data through the sources, and runs the normalizer and the
//! matching analyzer.
//!
//! Domain and upstream failures come back as failed [`ToolResult`]s with a
//! machine-readable code; `Err` is reserved for calls that break the tool
//! contract.

mod chain_metrics;
mod defi_trends;
mod dex_volume;
mod market_data;
mod markets;
mod nft_trends;
mod order_book;
mod technical_indicators;
mod token_metrics;

pub use chain_metrics::ChainMetricsTool;
pub use defi_trends::DefiTrendsTool;
pub use dex_volume::DexVolumeTool;
pub use market_data::MarketDataTool;
pub use markets::ListMarketsTool;
pub use nft_trends::NftTrendsTool;
pub use order_book::OrderBookTool;
pub use technical_indicators::TechnicalIndicatorsTool;
pub use token_metrics::TokenMetricsTool;

use std::fmt::Display;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use toolkit_core::{Result as CoreResult, ToolCall, ToolError, ToolRegistry, ToolResult};

use crate::config::AnalyticsConfig;
use crate::error::{AnalyticsError, Result};
use crate::source::DataSources;

/// Register every tool the sources can serve.
///
/// The token tool is skipped when no listing source is configured.
pub fn register_tools(registry: &mut ToolRegistry, sources: &DataSources, config: &AnalyticsConfig) {
    registry.register(MarketDataTool::new(sources.market.clone()));
    registry.register(ListMarketsTool::new(sources.market.clone()));
    registry.register(OrderBookTool::new(sources.market.clone(), config.default_book_depth));
    registry.register(TechnicalIndicatorsTool::new(sources.market.clone(), config.default_lookback));
    registry.register(ChainMetricsTool::new(sources.defi.clone(), sources.gas.clone()));
    registry.register(DefiTrendsTool::new(sources.defi.clone(), config.min_protocol_tvl));
    registry.register(DexVolumeTool::new(sources.defi.clone()));
    registry.register(NftTrendsTool::new(sources.defi.clone()));

    match &sources.tokens {
        Some(tokens) => registry.register(TokenMetricsTool::new(tokens.clone())),
        None => tracing::warn!("CMC_API_KEY not set, monitor_token_metrics disabled"),
    }
}

/// Failed result carrying the error's code
fn failure(tool: &str, err: &AnalyticsError) -> ToolResult {
    if err.is_recoverable() {
        tracing::debug!(tool, code = err.code(), error = %err, "Tool call rejected");
    } else {
        tracing::warn!(tool, code = err.code(), error = %err, "Tool call failed");
    }
    ToolResult::failure(tool, err.to_string()).with_code(err.code())
}

/// Successful result with the report as data, stamped with the current time
fn success<T: Serialize>(tool: &str, output: String, report: &T) -> CoreResult<ToolResult> {
    let mut data = serde_json::to_value(report)?;
    if let Value::Object(map) = &mut data {
        map.insert("timestamp".into(), Value::String(Utc::now().to_rfc3339()));
    }
    Ok(ToolResult::success(tool, output).with_data(data))
}

fn finish<T: Serialize>(tool: &str, outcome: Result<T>, render: impl FnOnce(&T) -> String) -> CoreResult<ToolResult> {
    match outcome {
        Ok(report) => success(tool, render(&report), &report),
        Err(e) => Ok(failure(tool, &e)),
    }
}

/// Required string argument
fn required_str<'a>(call: &'a ToolCall, key: &str) -> CoreResult<&'a str> {
    call.get_str(key)
        .ok_or_else(|| ToolError::ToolValidation(format!("Missing required parameter: {}", key)))
}

/// Optional positive integer argument; present but unusable values are invalid input
fn optional_usize(call: &ToolCall, key: &str, default: usize) -> Result<usize> {
    if call.arguments.get(key).is_none_or(Value::is_null) {
        return Ok(default);
    }
    call.get_u64(key)
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| AnalyticsError::InvalidInput(format!("{} must be a non-negative integer", key)))
}

fn or_na<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn fixed(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.*}", decimals, v))
}

fn signed_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:+.2}%", v))
}

/// `1234567.8` -> `$1.23M`
fn usd_compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("${:.2}K", value / 1e3)
    } else {
        format!("${:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_mock_tools() {
        let mut registry = ToolRegistry::new();
        register_tools(&mut registry, &DataSources::mock(), &AnalyticsConfig::default());
        assert_eq!(registry.len(), 9);
        assert!(registry.get("monitor_token_metrics").is_some());
        assert!(registry.get("list_markets").is_some());
    }

    #[test]
    fn test_token_tool_skipped_without_source() {
        let mut sources = DataSources::mock();
        sources.tokens = None;
        let mut registry = ToolRegistry::new();
        register_tools(&mut registry, &sources, &AnalyticsConfig::default());
        assert_eq!(registry.len(), 8);
        assert!(registry.get("monitor_token_metrics").is_none());
    }

    #[test]
    fn test_optional_usize() {
        let call = ToolCall::new("t")
            .with_arg("depth", json!(5))
            .with_arg("bad", json!(-3))
            .with_arg("empty", json!(null));
        assert_eq!(optional_usize(&call, "depth", 10).unwrap(), 5);
        assert_eq!(optional_usize(&call, "missing", 10).unwrap(), 10);
        assert_eq!(optional_usize(&call, "empty", 10).unwrap(), 10);
        assert!(matches!(optional_usize(&call, "bad", 10), Err(AnalyticsError::InvalidInput(_))));
    }

    #[test]
    fn test_formatting_helpers() {
        assert_eq!(usd_compact(1_234_567.8), "$1.23M");
        assert_eq!(usd_compact(42.0), "$42.00");
        assert_eq!(signed_pct(Some(3.456)), "+3.46%");
        assert_eq!(fixed(None, 2), "N/A");
        assert_eq!(or_na(Some(7)), "7");
    }

    #[test]
    fn test_failure_carries_code() {
        let result = failure("analyze_dex_volume", &AnalyticsError::not_found("DEX", "nope"));
        assert!(!result.success);
        assert_eq!(result.code.as_deref(), Some("NOT_FOUND"));
        assert_eq!(result.output, "DEX 'nope' not found");
    }
}
