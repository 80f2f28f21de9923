//! Chain Metrics Analyzer
//!
//! Per-chain TVL level and change, protocol count and leaders, and a gas
//! snapshot where the chain is EVM-compatible.

use serde::{Deserialize, Serialize};

use crate::model::{ChainInfo, ChainTvlPoint, GasPrices, ProtocolRecord};

pub const TOP_CHAIN_PROTOCOLS: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainProtocol {
    pub name: String,
    pub tvl: f64,
    pub category: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainMetrics {
    pub chain_id: String,
    pub name: String,
    /// Latest point of the TVL history, 0 when there is none
    pub tvl_usd: f64,
    pub tvl_change_24h: Option<f64>,
    pub tvl_change_7d: Option<f64>,
    pub protocols_count: usize,
    pub top_protocols: Vec<ChainProtocol>,
    pub gas_applicable: bool,
    pub gas: Option<GasPrices>,
}

/// Percent change of the last point against the point `back` entries earlier
fn change_over(history: &[ChainTvlPoint], back: usize) -> Option<f64> {
    let last = history.last()?;
    let base = history.len().checked_sub(back + 1).map(|i| history[i].tvl)?;
    (base != 0.0).then(|| (last.tvl - base) / base * 100.0)
}

/// `gas` is ignored for non-EVM chains
pub fn analyze_chain_metrics(
    chain: &ChainInfo,
    history: &[ChainTvlPoint],
    protocols: &[ProtocolRecord],
    gas: Option<GasPrices>,
) -> ChainMetrics {
    let mut history = history.to_vec();
    history.sort_by_key(|p| p.date);

    let mut on_chain: Vec<&ProtocolRecord> = protocols.iter().filter(|p| p.is_on_chain(chain)).collect();
    on_chain.sort_by(|a, b| b.tvl.total_cmp(&a.tvl));

    ChainMetrics {
        chain_id: chain.id.to_string(),
        name: chain.name.to_string(),
        tvl_usd: history.last().map_or(0.0, |p| p.tvl),
        tvl_change_24h: change_over(&history, 1),
        tvl_change_7d: change_over(&history, 7),
        protocols_count: on_chain.len(),
        top_protocols: on_chain
            .iter()
            .take(TOP_CHAIN_PROTOCOLS)
            .map(|p| ChainProtocol {
                name: p.name.clone(),
                tvl: p.tvl,
                category: p.category.clone(),
            })
            .collect(),
        gas_applicable: chain.evm,
        gas: if chain.evm { gas } else { None },
    }
}
