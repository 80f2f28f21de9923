//! NFT Trend Aggregator

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::volume::TOP_VENUES;
use crate::model::{NftCollection, NftMarketplace};

pub const TOP_COLLECTIONS: usize = 20;
pub const UNKNOWN_CHAIN: &str = "Unknown";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceShare {
    pub name: String,
    pub chains: Vec<String>,
    pub daily_volume_usd: f64,
    pub weekly_volume_usd: Option<f64>,
    /// Percent of total marketplace volume
    pub market_share: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainNftVolume {
    pub chain: String,
    pub daily_volume_usd: f64,
    pub collections_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NftTrendReport {
    pub top_collections: Vec<NftCollection>,
    pub top_marketplaces: Vec<MarketplaceShare>,
    pub volume_by_chain: Vec<ChainNftVolume>,
}

pub fn track_nft_trends(collections: &[NftCollection], marketplaces: &[NftMarketplace]) -> NftTrendReport {
    let mut top_collections = collections.to_vec();
    top_collections.sort_by(|a, b| b.daily_volume_usd.total_cmp(&a.daily_volume_usd));
    top_collections.truncate(TOP_COLLECTIONS);

    let mut ranked: Vec<&NftMarketplace> = marketplaces.iter().collect();
    ranked.sort_by(|a, b| b.daily_volume_usd.total_cmp(&a.daily_volume_usd));
    let top_marketplaces = ranked
        .into_iter()
        .take(TOP_VENUES)
        .map(|m| MarketplaceShare {
            name: m.name.clone(),
            chains: m.chains.clone(),
            daily_volume_usd: m.daily_volume_usd,
            weekly_volume_usd: m.weekly_volume_usd,
            market_share: m.market_share * 100.0,
        })
        .collect();

    NftTrendReport {
        top_collections,
        top_marketplaces,
        volume_by_chain: volume_by_chain(collections),
    }
}

/// Daily volume and collection count per chain, descending by volume
pub fn volume_by_chain(collections: &[NftCollection]) -> Vec<ChainNftVolume> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut chains: Vec<ChainNftVolume> = Vec::new();

    for collection in collections {
        let chain = collection.chain.as_deref().filter(|c| !c.is_empty()).unwrap_or(UNKNOWN_CHAIN);
        let slot = *index.entry(chain).or_insert_with(|| {
            chains.push(ChainNftVolume {
                chain: chain.to_string(),
                daily_volume_usd: 0.0,
                collections_count: 0,
            });
            chains.len() - 1
        });
        chains[slot].daily_volume_usd += collection.daily_volume_usd;
        chains[slot].collections_count += 1;
    }

    chains.sort_by(|a, b| b.daily_volume_usd.total_cmp(&a.daily_volume_usd));
    chains
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(name: &str, chain: Option<&str>, volume: f64) -> NftCollection {
        NftCollection {
            name: name.into(),
            chain: chain.map(str::to_string),
            floor_price_usd: Some(1_000.0),
            daily_volume_usd: volume,
            daily_change: None,
            weekly_change: Some(-3.0),
        }
    }

    fn marketplace(name: &str, volume: f64, share: f64) -> NftMarketplace {
        NftMarketplace {
            name: name.into(),
            chains: vec!["Ethereum".into()],
            daily_volume_usd: volume,
            weekly_volume_usd: None,
            market_share: share,
        }
    }

    #[test]
    fn test_collections_ranked_and_truncated() {
        let collections: Vec<NftCollection> =
            (0..25).map(|i| collection(&format!("C{}", i), Some("Ethereum"), f64::from(i))).collect();
        let report = track_nft_trends(&collections, &[]);
        assert_eq!(report.top_collections.len(), TOP_COLLECTIONS);
        assert_eq!(report.top_collections[0].name, "C24");
        assert!(report.top_marketplaces.is_empty());
    }

    #[test]
    fn test_marketplace_share_as_percent() {
        let report = track_nft_trends(
            &[],
            &[marketplace("Blur", 300.0, 0.6), marketplace("OpenSea", 200.0, 0.4)],
        );
        assert_eq!(report.top_marketplaces[0].name, "Blur");
        assert!((report.top_marketplaces[0].market_share - 60.0).abs() < 1e-9);
        assert!((report.top_marketplaces[1].market_share - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_marketplaces_sharing_a_name_both_kept() {
        let mut solana = marketplace("Magic Eden", 80.0, 0.2);
        solana.chains = vec!["Solana".into()];
        let report = track_nft_trends(
            &[],
            &[marketplace("Magic Eden", 120.0, 0.3), solana, marketplace("Blur", 200.0, 0.5)],
        );

        let ranked: Vec<(&str, f64)> = report
            .top_marketplaces
            .iter()
            .map(|m| (m.name.as_str(), m.daily_volume_usd))
            .collect();
        assert_eq!(ranked, vec![("Blur", 200.0), ("Magic Eden", 120.0), ("Magic Eden", 80.0)]);
        assert_eq!(report.top_marketplaces[2].chains, vec!["Solana".to_string()]);
    }

    #[test]
    fn test_volume_by_chain_groups_unknown() {
        let chains = volume_by_chain(&[
            collection("A", Some("Ethereum"), 10.0),
            collection("B", None, 50.0),
            collection("C", Some("Solana"), 5.0),
            collection("D", Some("Ethereum"), 15.0),
            collection("E", Some(""), 1.0),
        ]);

        assert_eq!(chains[0].chain, UNKNOWN_CHAIN);
        assert_eq!(chains[0].collections_count, 2);
        assert_eq!(chains[0].daily_volume_usd, 51.0);
        assert_eq!(chains[1].chain, "Ethereum");
        assert_eq!(chains[1].daily_volume_usd, 25.0);
        assert_eq!(chains.len(), 3);
    }
}
