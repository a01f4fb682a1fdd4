use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::config::{INDICATORS, IndicatorConfig};
use crate::models::{IndicatorSnapshot, MovingAverages};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

/// Rule-based signal from RSI and the short/mid moving averages.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationEngine {
    oversold: f64,
    overbought: f64,
    neutral_rsi: f64,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(&INDICATORS)
    }
}

impl RecommendationEngine {
    pub fn new(config: &IndicatorConfig) -> Self {
        Self {
            oversold: config.rsi_oversold,
            overbought: config.rsi_overbought,
            neutral_rsi: config.rsi_neutral,
        }
    }

    /// Missing RSI reads neutral, missing averages read as the current price.
    pub fn recommend(&self, snapshot: &IndicatorSnapshot, current_price: f64) -> Recommendation {
        let rsi = snapshot.rsi.unwrap_or(self.neutral_rsi);
        let ma = MovingAverages::with_price_fallback(snapshot, current_price);
        self.recommend_values(rsi, current_price, ma.ma_10, ma.ma_50)
    }

    pub fn recommend_values(&self, rsi: f64, price: f64, ma10: f64, ma50: f64) -> Recommendation {
        if rsi < self.oversold && price > ma10 && ma10 > ma50 {
            Recommendation::Buy
        } else if rsi > self.overbought && price < ma10 && ma10 < ma50 {
            Recommendation::Sell
        } else {
            Recommendation::Hold
        }
    }
}
