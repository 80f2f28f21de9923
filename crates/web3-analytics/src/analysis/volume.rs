//! DEX/NFT Volume Analyzer
//!
//! Venue filtering (by chain alias and by name), ranking by 24h volume and
//! short/long moving-average trend over a daily volume series.

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};
use crate::model::{ChainInfo, VolumePoint, VolumeVenue};

/// Points kept from the end of a volume series
pub const TREND_WINDOW: usize = 30;
/// Points in the short average
pub const SHORT_WINDOW: usize = 7;
pub const TOP_VENUES: usize = 10;

/// Short vs long average of a daily volume series.
///
/// `avg_volume_7d` is 0 when fewer than 7 points exist; in that case, and
/// when `avg_volume_30d` is 0, `change_percent` is `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VolumeTrend {
    pub points: usize,
    pub avg_volume_7d: f64,
    pub avg_volume_30d: f64,
    pub change_percent: Option<f64>,
}

impl VolumeTrend {
    /// `"12.34%"`, or `"N/A"` when no change is computable
    pub fn label(&self) -> String {
        self.change_percent
            .map_or_else(|| "N/A".to_string(), |pct| format!("{:.2}%", pct))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DexVolumeDetail {
    pub venue: VolumeVenue,
    pub trend: VolumeTrend,
    pub volume_trend: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DexVolumeReport {
    Detail(DexVolumeDetail),
    Top {
        venues: Vec<VolumeVenue>,
        chain_filter: Option<String>,
    },
}

pub fn volume_trend(series: &[VolumePoint]) -> VolumeTrend {
    let recent = &series[series.len().saturating_sub(TREND_WINDOW)..];

    if recent.is_empty() {
        return VolumeTrend {
            points: 0,
            avg_volume_7d: 0.0,
            avg_volume_30d: 0.0,
            change_percent: None,
        };
    }

    let mean = |points: &[VolumePoint]| points.iter().map(|p| p.volume).sum::<f64>() / points.len() as f64;

    let avg_30d = mean(recent);
    let avg_7d = if recent.len() >= SHORT_WINDOW {
        mean(&recent[recent.len() - SHORT_WINDOW..])
    } else {
        0.0
    };

    let change_percent = (recent.len() >= SHORT_WINDOW && avg_30d > 0.0).then(|| (avg_7d / avg_30d - 1.0) * 100.0);

    VolumeTrend {
        points: recent.len(),
        avg_volume_7d: avg_7d,
        avg_volume_30d: avg_30d,
        change_percent,
    }
}

/// Venues active on the chain with tool identifier `chain_id`
pub fn filter_by_chain(venues: &[VolumeVenue], chain_id: &str) -> Result<Vec<VolumeVenue>> {
    let chain = ChainInfo::lookup(chain_id).ok_or_else(|| AnalyticsError::not_found("Chain", chain_id))?;

    Ok(venues
        .iter()
        .filter(|v| v.chains.iter().any(|c| chain.matches(c)))
        .cloned()
        .collect())
}

/// Exact name match, ignoring case
pub fn find_venue<'a>(venues: &'a [VolumeVenue], name: &str, kind: &'static str) -> Result<&'a VolumeVenue> {
    let wanted = name.trim();
    venues
        .iter()
        .find(|v| v.name.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| AnalyticsError::not_found(kind, wanted))
}

/// Top `limit` venues by 24h volume, otherwise unmodified
pub fn rank_by_volume(mut venues: Vec<VolumeVenue>, limit: usize) -> Vec<VolumeVenue> {
    venues.sort_by(|a, b| b.volume_24h.total_cmp(&a.volume_24h));
    venues.truncate(limit);
    venues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(name: &str, volume_24h: f64, chains: &[&str]) -> VolumeVenue {
        VolumeVenue {
            name: name.into(),
            chains: chains.iter().map(|c| (*c).to_string()).collect(),
            volume_24h,
            volume_7d: volume_24h * 7.0,
            change_7d: Some(1.5),
            kind: Some("dexs".into()),
        }
    }

    fn series(volumes: &[f64]) -> Vec<VolumePoint> {
        volumes
            .iter()
            .enumerate()
            .map(|(i, v)| VolumePoint {
                timestamp: 1_700_000_000 + i as i64 * 86_400,
                volume: *v,
            })
            .collect()
    }

    #[test]
    fn test_short_series_zero_fills_without_error() {
        let trend = volume_trend(&series(&[100.0, 200.0, 300.0]));
        assert_eq!(trend.points, 3);
        assert_eq!(trend.avg_volume_7d, 0.0);
        assert_eq!(trend.avg_volume_30d, 200.0);
        assert_eq!(trend.change_percent, None);
        assert_eq!(trend.label(), "N/A");
    }

    #[test]
    fn test_trend_uses_last_thirty_points() {
        let mut volumes = vec![1_000_000.0; 10];
        volumes.extend(std::iter::repeat_n(10.0, 23));
        volumes.extend(std::iter::repeat_n(20.0, 7));
        let trend = volume_trend(&series(&volumes));

        assert_eq!(trend.points, TREND_WINDOW);
        assert_eq!(trend.avg_volume_7d, 20.0);
        let avg_30d = (23.0 * 10.0 + 7.0 * 20.0) / 30.0;
        assert!((trend.avg_volume_30d - avg_30d).abs() < 1e-9);
        let expected = (20.0 / avg_30d - 1.0) * 100.0;
        assert!((trend.change_percent.unwrap() - expected).abs() < 1e-9);
        assert_eq!(trend.label(), format!("{:.2}%", expected));
    }

    #[test]
    fn test_zero_average_reports_na() {
        let trend = volume_trend(&series(&[0.0; 8]));
        assert_eq!(trend.change_percent, None);
        assert_eq!(volume_trend(&[]).points, 0);
    }

    #[test]
    fn test_filter_by_chain_alias() {
        let venues = vec![
            venue("Velodrome", 5.0, &["OP Mainnet"]),
            venue("Uniswap", 9.0, &["Ethereum", "Optimism"]),
            venue("Helix", 1.0, &["Injective"]),
        ];
        let filtered = filter_by_chain(&venues, "optimism").unwrap();
        let names: Vec<&str> = filtered.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Velodrome", "Uniswap"]);

        assert!(matches!(
            filter_by_chain(&venues, "mars"),
            Err(AnalyticsError::NotFound { kind: "Chain", .. })
        ));
    }

    #[test]
    fn test_find_venue_ignores_case() {
        let venues = vec![venue("Uniswap V3", 9.0, &["Ethereum"])];
        assert_eq!(find_venue(&venues, "uniswap v3", "DEX").unwrap().name, "Uniswap V3");
        assert!(matches!(
            find_venue(&venues, "uniswap", "DEX"),
            Err(AnalyticsError::NotFound { kind: "DEX", .. })
        ));
    }

    #[test]
    fn test_rank_by_volume() {
        let venues: Vec<VolumeVenue> = (0..15).map(|i| venue(&format!("D{}", i), f64::from(i), &["Base"])).collect();
        let ranked = rank_by_volume(venues, TOP_VENUES);
        assert_eq!(ranked.len(), TOP_VENUES);
        assert_eq!(ranked[0].name, "D14");
        assert_eq!(ranked[0].change_7d, Some(1.5));
        assert!(ranked.windows(2).all(|w| w[0].volume_24h >= w[1].volume_24h));
    }
}
