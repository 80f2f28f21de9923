//! Etherscan gas oracle client

use async_trait::async_trait;
use serde_json::Value;

use super::{fetch_json, GasOracleSource};
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct EtherscanClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl EtherscanClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }
}

#[async_trait]
impl GasOracleSource for EtherscanClient {
    async fn gas_oracle(&self) -> Result<Value> {
        let url = format!("{}/api", self.base_url);
        tracing::debug!(url = %url, "Etherscan gas oracle request");

        let mut query = vec![("module", "gastracker"), ("action", "gasoracle")];
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.as_str()));
        }

        fetch_json(self.client.get(&url).query(&query), "Etherscan gas oracle").await
    }

    fn name(&self) -> &str {
        "etherscan"
    }
}
