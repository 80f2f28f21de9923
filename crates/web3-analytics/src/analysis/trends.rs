//! Protocol/Chain Trend Aggregator
//!
//! Groups protocols by category and by chain, computes TVL-weighted growth
//! and chain dominance, and ranks the results.
//!
//! Protocols with an empty chain list are skipped when attributing TVL to
//! chains; they still count toward their category.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::ProtocolRecord;

pub const TOP_CATEGORIES: usize = 5;
pub const PROTOCOLS_PER_CATEGORY: usize = 3;
pub const TOP_CHAINS: usize = 10;
pub const TOP_PROTOCOLS: usize = 10;
pub const DEFAULT_MIN_PROTOCOL_TVL: f64 = 1_000_000.0;

#[derive(Clone, Debug)]
pub struct TrendOptions {
    /// Protocols must exceed this TVL to enter the top-growing list
    pub min_protocol_tvl: f64,
}

impl Default for TrendOptions {
    fn default() -> Self {
        Self {
            min_protocol_tvl: DEFAULT_MIN_PROTOCOL_TVL,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProtocolSummary {
    pub name: String,
    pub tvl: f64,
    pub change_7d: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryTrend {
    pub category: String,
    pub count: usize,
    pub total_tvl: f64,
    /// TVL-weighted mean of the members' 7d change; 0 when `total_tvl` is 0
    pub change_7d: f64,
    pub top_protocols: Vec<ProtocolSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrowingProtocol {
    pub name: String,
    pub category: String,
    pub tvl: f64,
    pub change_7d: f64,
    pub chains: Vec<String>,
}

/// TVL attributed to one chain
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainDominance {
    pub chain: String,
    pub protocol_count: usize,
    pub tvl: f64,
    pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DefiTrendReport {
    pub top_growing_categories: Vec<CategoryTrend>,
    pub top_growing_protocols: Vec<GrowingProtocol>,
    pub chain_dominance: Vec<ChainDominance>,
    pub total_defi_tvl: f64,
}

/// All categories, ranked by weighted 7d change (descending), then by TVL.
/// Ties keep first-appearance order.
pub fn aggregate_categories(protocols: &[ProtocolRecord]) -> Vec<CategoryTrend> {
    struct Acc<'a> {
        category: &'a str,
        total_tvl: f64,
        weighted_change: f64,
        members: Vec<&'a ProtocolRecord>,
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Acc> = Vec::new();

    for protocol in protocols {
        let slot = *index.entry(protocol.category.as_str()).or_insert_with(|| {
            groups.push(Acc {
                category: &protocol.category,
                total_tvl: 0.0,
                weighted_change: 0.0,
                members: Vec::new(),
            });
            groups.len() - 1
        });

        let acc = &mut groups[slot];
        acc.total_tvl += protocol.tvl;
        acc.weighted_change += protocol.change_7d * protocol.tvl;
        acc.members.push(protocol);
    }

    let mut trends: Vec<CategoryTrend> = groups
        .into_iter()
        .map(|mut acc| {
            acc.members.sort_by(|a, b| b.tvl.total_cmp(&a.tvl));
            CategoryTrend {
                category: acc.category.to_string(),
                count: acc.members.len(),
                total_tvl: acc.total_tvl,
                change_7d: if acc.total_tvl > 0.0 {
                    acc.weighted_change / acc.total_tvl
                } else {
                    0.0
                },
                top_protocols: acc
                    .members
                    .iter()
                    .take(PROTOCOLS_PER_CATEGORY)
                    .map(|p| ProtocolSummary {
                        name: p.name.clone(),
                        tvl: p.tvl,
                        change_7d: p.change_7d,
                    })
                    .collect(),
            }
        })
        .collect();

    trends.sort_by(|a, b| {
        b.change_7d
            .total_cmp(&a.change_7d)
            .then_with(|| b.total_tvl.total_cmp(&a.total_tvl))
    });
    trends
}

/// Every chain's attributed TVL, ranked descending, with the grand total.
///
/// A protocol's TVL is split evenly across the chains it lists.
pub fn chain_dominance(protocols: &[ProtocolRecord]) -> (Vec<ChainDominance>, f64) {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut chains: Vec<ChainDominance> = Vec::new();

    for protocol in protocols.iter().filter(|p| !p.chains.is_empty()) {
        let share = protocol.tvl / protocol.chains.len() as f64;
        for chain in &protocol.chains {
            let slot = *index.entry(chain.as_str()).or_insert_with(|| {
                chains.push(ChainDominance {
                    chain: chain.clone(),
                    protocol_count: 0,
                    tvl: 0.0,
                    percentage: 0.0,
                });
                chains.len() - 1
            });
            chains[slot].tvl += share;
            chains[slot].protocol_count += 1;
        }
    }

    let total: f64 = chains.iter().map(|c| c.tvl).sum();
    for chain in &mut chains {
        chain.percentage = if total > 0.0 { chain.tvl / total * 100.0 } else { 0.0 };
    }
    chains.sort_by(|a, b| b.tvl.total_cmp(&a.tvl));

    (chains, total)
}

/// Protocols above `min_tvl`, ranked by 7d change
pub fn top_growing_protocols(protocols: &[ProtocolRecord], min_tvl: f64) -> Vec<GrowingProtocol> {
    let mut eligible: Vec<&ProtocolRecord> = protocols.iter().filter(|p| p.tvl > min_tvl).collect();
    eligible.sort_by(|a, b| b.change_7d.total_cmp(&a.change_7d));

    eligible
        .into_iter()
        .take(TOP_PROTOCOLS)
        .map(|p| GrowingProtocol {
            name: p.name.clone(),
            category: p.category.clone(),
            tvl: p.tvl,
            change_7d: p.change_7d,
            chains: p.chains.clone(),
        })
        .collect()
}

pub fn track_defi_trends(protocols: &[ProtocolRecord], options: &TrendOptions) -> DefiTrendReport {
    let mut categories = aggregate_categories(protocols);
    categories.truncate(TOP_CATEGORIES);

    let (mut chains, total_defi_tvl) = chain_dominance(protocols);
    chains.truncate(TOP_CHAINS);

    DefiTrendReport {
        top_growing_categories: categories,
        top_growing_protocols: top_growing_protocols(protocols, options.min_protocol_tvl),
        chain_dominance: chains,
        total_defi_tvl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ProtocolRecord> {
        vec![
            ProtocolRecord::new("Lido", "Liquid Staking", 30_000_000.0, 2.0, &["Ethereum"]),
            ProtocolRecord::new("Jito", "Liquid Staking", 10_000_000.0, 10.0, &["Solana"]),
            ProtocolRecord::new("Uniswap", "Dexes", 6_000_000.0, -4.0, &["Ethereum", "Arbitrum", "Base"]),
            ProtocolRecord::new("Helix", "Dexes", 2_000_000.0, 20.0, &["Injective"]),
            ProtocolRecord::new("Aave", "Lending", 12_000_000.0, 1.0, &["Ethereum", "Polygon"]),
            ProtocolRecord::new("Tiny", "Lending", 500_000.0, 90.0, &["Base"]),
        ]
    }

    #[test]
    fn test_category_weighted_change() {
        let categories = aggregate_categories(&sample());
        let staking = categories.iter().find(|c| c.category == "Liquid Staking").unwrap();

        let expected = (2.0 * 30e6 + 10.0 * 10e6) / 40e6;
        assert!((staking.change_7d - expected).abs() < 1e-9);
        assert_eq!(staking.count, 2);
        assert_eq!(staking.total_tvl, 40_000_000.0);
        assert_eq!(staking.top_protocols[0].name, "Lido");
    }

    #[test]
    fn test_categories_ranked_by_growth() {
        let categories = aggregate_categories(&sample());
        let order: Vec<&str> = categories.iter().map(|c| c.category.as_str()).collect();
        // lending 4.56, staking 4.0, dexes 2.0
        assert_eq!(order, vec!["Lending", "Liquid Staking", "Dexes"]);
    }

    #[test]
    fn test_zero_tvl_category_reports_zero_change() {
        let protocols = vec![
            ProtocolRecord::new("Ghost", "Gaming", 0.0, 55.0, &["Ethereum"]),
            ProtocolRecord::new("Flat", "Bridge", 1_000.0, 0.0, &["Ethereum"]),
            ProtocolRecord::new("Down", "CDP", 1_000.0, -3.0, &["Ethereum"]),
        ];
        let categories = aggregate_categories(&protocols);
        let gaming = categories.iter().find(|c| c.category == "Gaming").unwrap();

        assert_eq!(gaming.change_7d, 0.0);
        assert!(gaming.change_7d.is_finite());
        let order: Vec<&str> = categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(order, vec!["Bridge", "Gaming", "CDP"]);
    }

    #[test]
    fn test_chain_tvl_sums_to_total() {
        let protocols = sample();
        let (chains, total) = chain_dominance(&protocols);
        let protocol_total: f64 = protocols.iter().map(|p| p.tvl).sum();

        assert!((total - protocol_total).abs() < 1e-6);
        let chain_sum: f64 = chains.iter().map(|c| c.tvl).sum();
        assert!((chain_sum - total).abs() < 1e-6);
        let pct_sum: f64 = chains.iter().map(|c| c.percentage).sum();
        assert!((pct_sum - 100.0).abs() < 1e-9);

        assert_eq!(chains[0].chain, "Ethereum");
        assert!((chains[0].tvl - (30e6 + 2e6 + 6e6)).abs() < 1e-6);
    }

    #[test]
    fn test_protocols_without_chains_are_skipped() {
        let protocols = vec![
            ProtocolRecord::new("Listed", "Dexes", 100.0, 0.0, &["Base"]),
            ProtocolRecord::new("Orphan", "Dexes", 900.0, 0.0, &[]),
        ];
        let (chains, total) = chain_dominance(&protocols);
        assert_eq!(chains.len(), 1);
        assert_eq!(total, 100.0);
        assert_eq!(chains[0].percentage, 100.0);

        // still counted in its category
        assert_eq!(aggregate_categories(&protocols)[0].total_tvl, 1_000.0);
    }

    #[test]
    fn test_top_growing_respects_threshold() {
        let top = top_growing_protocols(&sample(), DEFAULT_MIN_PROTOCOL_TVL);
        let names: Vec<&str> = top.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Helix", "Jito", "Lido", "Aave", "Uniswap"]);
    }

    #[test]
    fn test_report_truncates() {
        let protocols: Vec<ProtocolRecord> = (0..30)
            .map(|i| {
                ProtocolRecord::new(
                    format!("P{}", i),
                    format!("Cat{}", i % 8),
                    2_000_000.0 + f64::from(i),
                    f64::from(i),
                    &["Ethereum"],
                )
            })
            .collect();
        let report = track_defi_trends(&protocols, &TrendOptions::default());
        assert_eq!(report.top_growing_categories.len(), TOP_CATEGORIES);
        assert_eq!(report.top_growing_protocols.len(), TOP_PROTOCOLS);
        assert!(report.top_growing_categories.iter().all(|c| c.top_protocols.len() <= PROTOCOLS_PER_CATEGORY));
        assert_eq!(report.top_growing_protocols[0].name, "P29");
    }
}
