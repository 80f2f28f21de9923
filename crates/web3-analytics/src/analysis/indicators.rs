//! Technical Indicator Engine
//!
//! RSI, SMA, Bollinger Bands and MACD over closing prices. Every indicator is
//! computed as a full trailing series (EMA is order dependent, so a single
//! window is never enough); [`compute_indicators`] reports the last bar.
//!
//! Conventions:
//! - RSI uses a simple rolling mean of gains and losses over the last `P`
//!   deltas. The first bar contributes a zero delta, so `P` bars are enough.
//!   A window without losses reads 100.
//! - Bollinger Bands use the sample standard deviation (n − 1) of the `P`
//!   window, at ±2σ around SMA(P).
//! - EMA is seeded with the first value, `α = 2 / (span + 1)`, no bias
//!   adjustment (pandas `ewm(span, adjust=False)`).

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};
use crate::model::OhlcvBar;

pub const DEFAULT_LOOKBACK: usize = 14;
/// Keeps `lookback + SMA_LONG` within one 1500-candle KuCoin page
pub const MAX_LOOKBACK: usize = 1000;
pub const SMA_SHORT: usize = 20;
pub const SMA_LONG: usize = 50;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BOLLINGER_WIDTH: f64 = 2.0;

/// An indicator left undefined for lack of bars
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryGap {
    pub indicator: String,
    pub required: usize,
    pub available: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Latest-bar indicator values; `None` fields are listed in `insufficient_history`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub last_price: f64,
    pub lookback: usize,
    pub rsi: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_middle: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub macd_line: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub bars_used: usize,
    pub insufficient_history: Vec<HistoryGap>,
}

pub fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Trailing simple mean; `None` until `period` values are available
pub fn sma_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            (i + 1 >= period).then(|| {
                let window = &values[i + 1 - period..=i];
                window.iter().sum::<f64>() / period as f64
            })
        })
        .collect()
}

/// Exponential moving average seeded with the first value
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &value in values {
        let next = match prev {
            None => value,
            Some(p) => alpha * value + (1.0 - alpha) * p,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

/// Rolling-mean RSI; `None` until `period` deltas are available
pub fn rsi_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let deltas: Vec<f64> = values
        .iter()
        .enumerate()
        .map(|(i, v)| if i == 0 { 0.0 } else { v - values[i - 1] })
        .collect();

    (0..deltas.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &deltas[i + 1 - period..=i];
            let avg_gain = window.iter().filter(|d| **d > 0.0).sum::<f64>() / period as f64;
            let avg_loss = -window.iter().filter(|d| **d < 0.0).sum::<f64>() / period as f64;

            if avg_loss == 0.0 {
                Some(100.0)
            } else {
                Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
            }
        })
        .collect()
}

/// Sample standard deviation over a trailing window
pub fn stddev_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period < 2 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            (i + 1 >= period).then(|| {
                let window = &values[i + 1 - period..=i];
                let mean = window.iter().sum::<f64>() / period as f64;
                let ss: f64 = window.iter().map(|v| (v - mean).powi(2)).sum();
                (ss / (period - 1) as f64).sqrt()
            })
        })
        .collect()
}

pub fn bollinger_series(values: &[f64], period: usize, width: f64) -> Vec<Option<BollingerBands>> {
    sma_series(values, period)
        .into_iter()
        .zip(stddev_series(values, period))
        .map(|(mean, sd)| {
            let (middle, sd) = (mean?, sd?);
            Some(BollingerBands {
                upper: middle + width * sd,
                middle,
                lower: middle - width * sd,
            })
        })
        .collect()
}

/// MACD line, signal and histogram for every bar
pub fn macd_series(values: &[f64], fast: usize, slow: usize, signal: usize) -> Vec<MacdPoint> {
    let fast_ema = ema_series(values, fast);
    let slow_ema = ema_series(values, slow);
    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = ema_series(&line, signal);

    line.iter()
        .zip(&signal_line)
        .map(|(&line, &signal)| MacdPoint {
            line,
            signal,
            histogram: line - signal,
        })
        .collect()
}

/// Compute the indicator snapshot for the most recent bar.
///
/// Indicators that need more bars than available are reported as `None`
/// and listed in `insufficient_history`.
pub fn compute_indicators(bars: &[OhlcvBar], lookback: usize) -> Result<IndicatorSnapshot> {
    if lookback < 2 {
        return Err(AnalyticsError::InvalidInput(
            "lookback period must be at least 2".into(),
        ));
    }

    let values = closes(bars);
    let Some(&last_price) = values.last() else {
        return Err(AnalyticsError::InsufficientHistory {
            indicator: "price".into(),
            required: 1,
            available: 0,
        });
    };

    let available = values.len();
    let mut gaps = Vec::new();
    let mut require = |indicator: &str, required: usize| {
        let ok = available >= required;
        if !ok {
            gaps.push(HistoryGap {
                indicator: indicator.to_string(),
                required,
                available,
            });
        }
        ok
    };

    let rsi = if require("rsi", lookback) {
        rsi_series(&values, lookback).last().copied().flatten()
    } else {
        None
    };

    let sma_20 = if require("sma_20", SMA_SHORT) {
        sma_series(&values, SMA_SHORT).last().copied().flatten()
    } else {
        None
    };

    let sma_50 = if require("sma_50", SMA_LONG) {
        sma_series(&values, SMA_LONG).last().copied().flatten()
    } else {
        None
    };

    let bands = if require("bollinger", lookback) {
        bollinger_series(&values, lookback, BOLLINGER_WIDTH).last().copied().flatten()
    } else {
        None
    };

    let macd = if require("macd", MACD_SLOW) {
        macd_series(&values, MACD_FAST, MACD_SLOW, MACD_SIGNAL).last().copied()
    } else {
        None
    };

    Ok(IndicatorSnapshot {
        last_price,
        lookback,
        rsi,
        sma_20,
        sma_50,
        bollinger_upper: bands.map(|b| b.upper),
        bollinger_middle: bands.map(|b| b.middle),
        bollinger_lower: bands.map(|b| b.lower),
        macd_line: macd.map(|m| m.line),
        macd_signal: macd.map(|m| m.signal),
        macd_histogram: macd.map(|m| m.histogram),
        bars_used: available,
        insufficient_history: gaps,
    })
}
