//! CoinMarketCap client

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{fetch_json, TokenListingSource};
use crate::error::{AnalyticsError, Result};
use crate::model::{TokenListing, TokenQuoteDetail};

const LISTING_LIMIT: &str = "5000";
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

#[derive(Clone, Debug)]
pub struct CoinMarketCapClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    status: Option<Status>,
    data: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
struct Status {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    error_message: Option<String>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<T> {
        let status = self.status.unwrap_or_default();
        if status.error_code != 0 {
            return Err(AnalyticsError::UpstreamUnavailable(format!(
                "CoinMarketCap error {}: {}",
                status.error_code,
                status.error_message.unwrap_or_default()
            )));
        }
        self.data
            .ok_or_else(|| AnalyticsError::MalformedPayload("CoinMarketCap response has no data".into()))
    }
}

impl CoinMarketCapClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)], what: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "CoinMarketCap request");

        let request = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query);

        let envelope: Envelope<T> = fetch_json(request, what).await?;
        envelope.into_data()
    }
}

#[async_trait]
impl TokenListingSource for CoinMarketCapClient {
    async fn listings(&self) -> Result<Vec<TokenListing>> {
        self.get(
            "/v1/cryptocurrency/listings/latest",
            &[("limit", LISTING_LIMIT.to_string()), ("convert", "USD".to_string())],
            "CoinMarketCap listings",
        )
        .await
    }

    async fn quotes(&self, id: u64) -> Result<HashMap<String, TokenQuoteDetail>> {
        self.get(
            "/v2/cryptocurrency/quotes/latest",
            &[("id", id.to_string()), ("convert", "USD".to_string())],
            "CoinMarketCap quotes",
        )
        .await
    }

    fn name(&self) -> &str {
        "coinmarketcap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_error_status() {
        let envelope: Envelope<Vec<TokenListing>> = serde_json::from_value(json!({
            "status": {"error_code": 1002, "error_message": "API key missing."},
            "data": null
        }))
        .unwrap();
        let err = envelope.into_data().unwrap_err();
        assert!(matches!(err, AnalyticsError::UpstreamUnavailable(_)));
        assert!(err.to_string().contains("API key missing."));
    }

    #[test]
    fn test_listing_envelope() {
        let envelope: Envelope<Vec<TokenListing>> = serde_json::from_value(json!({
            "status": {"error_code": 0, "error_message": null},
            "data": [{"id": 7226, "name": "Injective", "symbol": "INJ", "cmc_rank": 37}]
        }))
        .unwrap();
        let listings = envelope.into_data().unwrap();
        assert_eq!(listings[0].id, 7226);
    }
}
