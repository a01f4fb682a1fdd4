// Presentation defaults for missing indicators live here, not in the indicator maths.

use serde::{Deserialize, Serialize};

use crate::config::INDICATORS;
use crate::domain::Bar;
use crate::models::IndicatorSnapshot;

/// Latest-bar indicators as reported in a forecast. Missing values become 0, RSI becomes neutral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSummary {
    pub ma_10: f64,
    pub ma_50: f64,
    pub ma_200: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,
    pub volume: u64,
    pub current_price: f64,
}

impl IndicatorSummary {
    pub fn from_snapshot(snapshot: &IndicatorSnapshot, last: &Bar) -> Self {
        Self {
            ma_10: snapshot.ma10.unwrap_or(0.0),
            ma_50: snapshot.ma50.unwrap_or(0.0),
            ma_200: snapshot.ma200.unwrap_or(0.0),
            rsi: snapshot.rsi.unwrap_or(INDICATORS.rsi_neutral),
            macd: snapshot.macd.unwrap_or(0.0),
            macd_signal: snapshot.macd_signal.unwrap_or(0.0),
            macd_histogram: snapshot.macd_histogram.unwrap_or(0.0),
            bb_upper: snapshot.bb_upper.unwrap_or(0.0),
            bb_middle: snapshot.bb_middle.unwrap_or(0.0),
            bb_lower: snapshot.bb_lower.unwrap_or(0.0),
            volume: last.volume,
            current_price: last.close,
        }
    }
}

/// Moving averages as reported by analysis. Missing values fall back to the current price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAverages {
    pub ma_10: f64,
    pub ma_50: f64,
    pub ma_200: f64,
}

impl MovingAverages {
    pub fn with_price_fallback(snapshot: &IndicatorSnapshot, current_price: f64) -> Self {
        Self {
            ma_10: snapshot.ma10.unwrap_or(current_price),
            ma_50: snapshot.ma50.unwrap_or(current_price),
            ma_200: snapshot.ma200.unwrap_or(current_price),
        }
    }
}
