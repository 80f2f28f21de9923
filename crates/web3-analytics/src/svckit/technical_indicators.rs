//! Technical Indicators Tool
//!
//! RSI, SMA(20/50), Bollinger Bands and MACD over a market's candles.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

use toolkit_core::{ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::{finish, fixed, optional_usize, required_str};
use crate::analysis::indicators::{compute_indicators, IndicatorSnapshot, MAX_LOOKBACK, SMA_LONG};
use crate::error::{AnalyticsError, Result};
use crate::model::Timeframe;
use crate::normalize::normalize_candles;
use crate::source::MarketDataSource;

const NAME: &str = "calculate_technical_indicators";
const DEFAULT_TIMEFRAME: Timeframe = Timeframe::H1;

#[derive(Serialize)]
struct IndicatorReport {
    market: String,
    timeframe: Timeframe,
    /// Venue the candles came from
    data_source: String,
    #[serde(flatten)]
    snapshot: IndicatorSnapshot,
}

pub struct TechnicalIndicatorsTool {
    market: Arc<dyn MarketDataSource>,
    default_lookback: usize,
}

impl TechnicalIndicatorsTool {
    pub fn new(market: Arc<dyn MarketDataSource>, default_lookback: usize) -> Self {
        Self { market, default_lookback }
    }

    async fn analyze(&self, call: &ToolCall, market: &str) -> Result<IndicatorReport> {
        let timeframe = match call.get_str("timeframe") {
            None => DEFAULT_TIMEFRAME,
            Some(label) => Timeframe::parse(label).ok_or_else(|| {
                let known: Vec<&str> = Timeframe::ALL.iter().map(|tf| tf.label()).collect();
                AnalyticsError::InvalidInput(format!(
                    "unsupported timeframe '{}', expected one of {}",
                    label,
                    known.join(", ")
                ))
            })?,
        };
        let lookback = optional_usize(call, "lookback_period", self.default_lookback)?;
        if !(2..=MAX_LOOKBACK).contains(&lookback) {
            return Err(AnalyticsError::InvalidInput(format!(
                "lookback_period must be between 2 and {MAX_LOOKBACK}"
            )));
        }

        // enough for the slowest indicator on top of the lookback window
        let limit = lookback + SMA_LONG;
        let raw = self.market.candles(market, timeframe, limit).await?;
        let bars = normalize_candles(&raw, self.market.candle_layout())?;
        tracing::debug!(market, %timeframe, requested = limit, received = bars.len(), "Candles loaded");

        Ok(IndicatorReport {
            market: market.to_string(),
            timeframe,
            data_source: self.market.name().to_string(),
            snapshot: compute_indicators(&bars, lookback)?,
        })
    }
}

fn render(r: &IndicatorReport) -> String {
    let s = &r.snapshot;
    let mut out = format!(
        "{} {} ({} bars from {}):\n  Last price: {:.4}\n  RSI({}): {}\n  SMA 20 / 50: {} / {}\n  Bollinger({}): {} / {} / {}\n  MACD: {} (signal {}, histogram {})",
        r.market,
        r.timeframe,
        s.bars_used,
        r.data_source,
        s.last_price,
        s.lookback,
        fixed(s.rsi, 2),
        fixed(s.sma_20, 4),
        fixed(s.sma_50, 4),
        s.lookback,
        fixed(s.bollinger_upper, 4),
        fixed(s.bollinger_middle, 4),
        fixed(s.bollinger_lower, 4),
        fixed(s.macd_line, 4),
        fixed(s.macd_signal, 4),
        fixed(s.macd_histogram, 4),
    );
    for gap in &s.insufficient_history {
        out.push_str(&format!(
            "\n  {}: needs {} bars, have {}",
            gap.indicator, gap.required, gap.available
        ));
    }
    out
}

#[async_trait]
impl Tool for TechnicalIndicatorsTool {
    fn schema(&self) -> ToolSchema {
        let timeframes = Timeframe::ALL.iter().map(|tf| json!(tf.label())).collect();
        ToolSchema {
            name: NAME.into(),
            description: "Calculate RSI, SMA 20/50, Bollinger Bands and MACD from recent candles of a market.".into(),
            parameters: vec![
                ParameterSchema::required("market", "string", "Market pair, e.g. 'INJ/USDT'"),
                ParameterSchema::optional("timeframe", "string", "Candle interval")
                    .with_default(json!(DEFAULT_TIMEFRAME.label()))
                    .with_enum(timeframes),
                ParameterSchema::optional("lookback_period", "integer", "Period for RSI and Bollinger Bands (2 to 1000)")
                    .with_default(json!(self.default_lookback)),
            ],
            category: Some("market_data".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let market = required_str(call, "market")?;
        finish(NAME, self.analyze(call, market).await, render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockDataSource;

    fn tool() -> TechnicalIndicatorsTool {
        TechnicalIndicatorsTool::new(Arc::new(MockDataSource::new()), 14)
    }

    #[tokio::test]
    async fn test_full_history() {
        let call = ToolCall::new(NAME)
            .with_arg("market", json!("INJ/USDT"))
            .with_arg("timeframe", json!("4h"));
        let result = tool().execute(&call).await.unwrap();

        assert!(result.success, "{}", result.output);
        let data = result.data.unwrap();
        assert_eq!(data["timeframe"], "4h");
        assert_eq!(data["data_source"], "mock");
        assert_eq!(data["bars_used"], 64);
        let rsi = data["rsi"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&rsi));
        assert!(data["insufficient_history"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_short_history_reports_gaps() {
        let call = ToolCall::new(NAME).with_arg("market", json!("NEW/USDT"));
        let result = tool().execute(&call).await.unwrap();

        assert!(result.success, "{}", result.output);
        let data = result.data.unwrap();
        assert!(data["sma_20"].is_null());
        assert!(data["macd_line"].is_null());
        let gaps: Vec<&str> = data["insufficient_history"]
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["indicator"].as_str().unwrap())
            .collect();
        assert_eq!(gaps, vec!["rsi", "sma_20", "sma_50", "bollinger", "macd"]);
    }

    #[tokio::test]
    async fn test_bad_timeframe() {
        let call = ToolCall::new(NAME)
            .with_arg("market", json!("INJ/USDT"))
            .with_arg("timeframe", json!("2h"));
        let result = tool().execute(&call).await.unwrap();
        assert_eq!(result.code.as_deref(), Some("INVALID_INPUT"));
        assert!(result.output.contains("1m, 5m"));
    }

    #[tokio::test]
    async fn test_lookback_too_small() {
        let call = ToolCall::new(NAME)
            .with_arg("market", json!("INJ/USDT"))
            .with_arg("lookback_period", json!(1));
        let result = tool().execute(&call).await.unwrap();
        assert_eq!(result.code.as_deref(), Some("INVALID_INPUT"));
    }

    #[tokio::test]
    async fn test_lookback_above_cap() {
        for lookback in [json!(MAX_LOOKBACK + 1), json!(u64::MAX)] {
            let call = ToolCall::new(NAME)
                .with_arg("market", json!("INJ/USDT"))
                .with_arg("lookback_period", lookback);
            let result = tool().execute(&call).await.unwrap();
            assert!(!result.success);
            assert_eq!(result.code.as_deref(), Some("INVALID_INPUT"));
            assert!(result.output.contains("between 2 and 1000"));
        }
    }
}
