//! NFT Trends Tool

use std::sync::Arc;

use async_trait::async_trait;

use toolkit_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::{finish, signed_pct, usd_compact};
use crate::analysis::nft::{track_nft_trends, NftTrendReport};
use crate::error::Result;
use crate::source::DefiDataSource;

const NAME: &str = "track_nft_trends";

pub struct NftTrendsTool {
    defi: Arc<dyn DefiDataSource>,
}

impl NftTrendsTool {
    pub fn new(defi: Arc<dyn DefiDataSource>) -> Self {
        Self { defi }
    }

    async fn analyze(&self) -> Result<NftTrendReport> {
        let (collections, marketplaces) =
            tokio::try_join!(self.defi.nft_collections(), self.defi.nft_marketplaces())?;
        Ok(track_nft_trends(&collections, &marketplaces))
    }
}

fn render(r: &NftTrendReport) -> String {
    let mut out = String::from("NFT trends:\n  Top collections by daily volume:");
    for c in r.top_collections.iter().take(5) {
        out.push_str(&format!(
            "\n    {} ({}) {} 24h, {} 7d",
            c.name,
            c.chain.as_deref().unwrap_or("Unknown"),
            usd_compact(c.daily_volume_usd),
            signed_pct(c.weekly_change)
        ));
    }
    out.push_str("\n  Marketplaces:");
    for m in &r.top_marketplaces {
        out.push_str(&format!("\n    {} {:.1}% share, {} 24h", m.name, m.market_share, usd_compact(m.daily_volume_usd)));
    }
    out.push_str("\n  Volume by chain:");
    for c in &r.volume_by_chain {
        out.push_str(&format!("\n    {} {} ({} collections)", c.chain, usd_compact(c.daily_volume_usd), c.collections_count));
    }
    out
}

#[async_trait]
impl Tool for NftTrendsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Track NFT market trends: top collections and marketplaces by daily volume, and volume per chain.".into(),
            parameters: vec![],
            category: Some("nft".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, _call: &ToolCall) -> CoreResult<ToolResult> {
        finish(NAME, self.analyze().await, render)
    }
}
