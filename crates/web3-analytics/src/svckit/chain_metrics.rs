//! Chain Metrics Tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use toolkit_core::{ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::{finish, required_str, signed_pct, usd_compact};
use crate::analysis::chain_metrics::{analyze_chain_metrics, ChainMetrics};
use crate::error::{AnalyticsError, Result};
use crate::model::{ChainInfo, GasPrices, SUPPORTED_CHAINS};
use crate::normalize::normalize_gas_oracle;
use crate::source::{DefiDataSource, GasOracleSource};

const NAME: &str = "analyze_chain_metrics";

pub struct ChainMetricsTool {
    defi: Arc<dyn DefiDataSource>,
    gas: Arc<dyn GasOracleSource>,
}

impl ChainMetricsTool {
    pub fn new(defi: Arc<dyn DefiDataSource>, gas: Arc<dyn GasOracleSource>) -> Self {
        Self { defi, gas }
    }

    /// Gas is best-effort: a failing oracle leaves the TVL metrics intact
    async fn gas_prices(&self, chain: &ChainInfo) -> Option<GasPrices> {
        if !chain.evm {
            return None;
        }
        match self.gas.gas_oracle().await.and_then(|raw| normalize_gas_oracle(&raw)) {
            Ok(gas) => Some(gas),
            Err(e) => {
                tracing::warn!(chain = chain.id, source = self.gas.name(), error = %e, "Gas oracle unavailable");
                None
            }
        }
    }

    async fn analyze(&self, chain_id: &str) -> Result<ChainMetrics> {
        let chain = ChainInfo::lookup(chain_id).ok_or_else(|| {
            AnalyticsError::not_found("Chain", format!("{} (supported: {})", chain_id, ChainInfo::supported_ids()))
        })?;

        let (history, protocols, gas) = tokio::join!(
            self.defi.chain_tvl_history(chain),
            self.defi.protocols(),
            self.gas_prices(chain),
        );

        Ok(analyze_chain_metrics(chain, &history?, &protocols?, gas))
    }
}

fn render(m: &ChainMetrics) -> String {
    let mut out = format!(
        "{} chain metrics:\n  TVL: {}\n  TVL change 24h / 7d: {} / {}\n  Protocols: {}",
        m.name,
        usd_compact(m.tvl_usd),
        signed_pct(m.tvl_change_24h),
        signed_pct(m.tvl_change_7d),
        m.protocols_count,
    );
    for (rank, p) in m.top_protocols.iter().enumerate() {
        out.push_str(&format!("\n  {}. {} ({}) {}", rank + 1, p.name, p.category, usd_compact(p.tvl)));
    }
    match (&m.gas, m.gas_applicable) {
        (Some(gas), _) => out.push_str(&format!(
            "\n  Gas (gwei) safe / standard / fast: {} / {} / {}",
            gas.safe_gwei, gas.propose_gwei, gas.fast_gwei
        )),
        (None, true) => out.push_str("\n  Gas: unavailable"),
        (None, false) => out.push_str("\n  Gas: not applicable"),
    }
    out
}

#[async_trait]
impl Tool for ChainMetricsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Analyze a blockchain: TVL and its 24h/7d change, protocol count, top protocols and gas prices for EVM chains.".into(),
            parameters: vec![ParameterSchema::required("chain_id", "string", "Chain identifier")
                .with_enum(SUPPORTED_CHAINS.iter().map(|c| json!(c.id)).collect())],
            category: Some("onchain".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let chain_id = required_str(call, "chain_id")?;
        finish(NAME, self.analyze(chain_id).await, render)
    }
}
