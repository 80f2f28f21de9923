//! KuCoin REST client
//!
//! Public market endpoints only. Candles from this venue stand in for the
//! chain's own market history.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use super::{fetch_json, MarketDataSource};
use crate::error::{AnalyticsError, Result};
use crate::model::Timeframe;
use crate::normalize::CandleLayout;

const SUCCESS_CODE: &str = "200000";

#[derive(Clone, Debug)]
pub struct KucoinClient {
    base_url: String,
    client: reqwest::Client,
}

impl KucoinClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// `INJ/USDT` -> `INJ-USDT`
    fn symbol(market: &str) -> String {
        market.trim().replace(['/', '_'], "-").to_uppercase()
    }

    fn interval(timeframe: Timeframe) -> &'static str {
        match timeframe {
            Timeframe::M1 => "1min",
            Timeframe::M5 => "5min",
            Timeframe::M15 => "15min",
            Timeframe::M30 => "30min",
            Timeframe::H1 => "1hour",
            Timeframe::H4 => "4hour",
            Timeframe::D1 => "1day",
            Timeframe::W1 => "1week",
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "KuCoin request");

        let body: Value = fetch_json(self.client.get(&url).query(query), "KuCoin").await?;
        check_code(body)
    }
}

/// Reject responses whose envelope carries a non-success code
fn check_code(body: Value) -> Result<Value> {
    match body.get("code").and_then(Value::as_str) {
        Some(code) if code != SUCCESS_CODE => {
            let msg = body.get("msg").and_then(Value::as_str).unwrap_or("unknown error");
            Err(AnalyticsError::UpstreamUnavailable(format!("KuCoin error {}: {}", code, msg)))
        }
        _ => Ok(body),
    }
}

#[async_trait]
impl MarketDataSource for KucoinClient {
    async fn order_book(&self, market: &str) -> Result<Value> {
        self.get("/api/v1/market/orderbook/level2_20", &[("symbol", Self::symbol(market))])
            .await
    }

    async fn ticker(&self, market: &str) -> Result<Value> {
        self.get("/api/v1/market/stats", &[("symbol", Self::symbol(market))]).await
    }

    async fn candles(&self, market: &str, timeframe: Timeframe, limit: usize) -> Result<Value> {
        let end = Utc::now().timestamp();
        let span = timeframe
            .duration_secs()
            .saturating_mul(i64::try_from(limit).unwrap_or(i64::MAX));
        let start = end.saturating_sub(span);

        self.get(
            "/api/v1/market/candles",
            &[
                ("symbol", Self::symbol(market)),
                ("type", Self::interval(timeframe).to_string()),
                ("startAt", start.to_string()),
                ("endAt", end.to_string()),
            ],
        )
        .await
    }

    async fn markets(&self) -> Result<Value> {
        self.get("/api/v2/symbols", &[]).await
    }

    fn candle_layout(&self) -> CandleLayout {
        CandleLayout::Kucoin
    }

    fn name(&self) -> &str {
        "kucoin"
    }
}
