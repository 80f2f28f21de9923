//! DEX Volume Tool
//!
//! One DEX's volume trend, or the top DEXes by 24h volume, optionally
//! restricted to a chain.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use toolkit_core::{ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use super::{finish, signed_pct, usd_compact};
use crate::analysis::volume::{
    filter_by_chain, find_venue, rank_by_volume, volume_trend, DexVolumeDetail, DexVolumeReport, TOP_VENUES,
};
use crate::error::Result;
use crate::model::SUPPORTED_CHAINS;
use crate::source::DefiDataSource;

const NAME: &str = "analyze_dex_volume";

pub struct DexVolumeTool {
    defi: Arc<dyn DefiDataSource>,
}

impl DexVolumeTool {
    pub fn new(defi: Arc<dyn DefiDataSource>) -> Self {
        Self { defi }
    }

    async fn analyze(&self, dex_name: Option<&str>, chain_id: Option<&str>) -> Result<DexVolumeReport> {
        let mut venues = self.defi.dex_overview().await?;
        if let Some(chain_id) = chain_id {
            venues = filter_by_chain(&venues, chain_id)?;
        }

        let Some(dex_name) = dex_name else {
            return Ok(DexVolumeReport::Top {
                venues: rank_by_volume(venues, TOP_VENUES),
                chain_filter: chain_id.map(str::to_lowercase),
            });
        };

        let venue = find_venue(&venues, dex_name, "DEX")?.clone();
        let series = self.defi.dex_volume_chart(&venue.name).await?;
        let trend = volume_trend(&series);
        tracing::debug!(dex = %venue.name, points = series.len(), "DEX volume trend");

        Ok(DexVolumeReport::Detail(DexVolumeDetail {
            volume_trend: trend.label(),
            venue,
            trend,
        }))
    }
}

fn render(r: &DexVolumeReport) -> String {
    match r {
        DexVolumeReport::Detail(d) => format!(
            "{} ({}):\n  Volume 24h / 7d: {} / {}\n  Avg daily volume 7d / 30d: {} / {}\n  Trend: {}",
            d.venue.name,
            d.venue.chains.join(", "),
            usd_compact(d.venue.volume_24h),
            usd_compact(d.venue.volume_7d),
            usd_compact(d.trend.avg_volume_7d),
            usd_compact(d.trend.avg_volume_30d),
            d.volume_trend,
        ),
        DexVolumeReport::Top { venues, chain_filter } => {
            let mut out = match chain_filter {
                Some(chain) => format!("Top DEXes on {} by 24h volume:", chain),
                None => "Top DEXes by 24h volume:".to_string(),
            };
            for (rank, v) in venues.iter().enumerate() {
                out.push_str(&format!(
                    "\n  {}. {} {} ({} 7d)",
                    rank + 1,
                    v.name,
                    usd_compact(v.volume_24h),
                    signed_pct(v.change_7d)
                ));
            }
            out
        }
    }
}

#[async_trait]
impl Tool for DexVolumeTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Analyze DEX trading volume: one DEX's 7d vs 30d average trend, or the top DEXes by 24h volume.".into(),
            parameters: vec![
                ParameterSchema::optional("dex_name", "string", "DEX to analyze; omit for the top DEXes"),
                ParameterSchema::optional("chain_id", "string", "Only DEXes active on this chain")
                    .with_enum(SUPPORTED_CHAINS.iter().map(|c| json!(c.id)).collect()),
            ],
            category: Some("defi".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let outcome = self.analyze(call.get_str("dex_name"), call.get_str("chain_id")).await;
        finish(NAME, outcome, render)
    }
}
