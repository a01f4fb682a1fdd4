use serde::{Deserialize, Serialize};

/// Indicator values for one bar. `None` means the indicator's lookback is not
/// yet satisfied at that bar; it is never replaced by a made-up number here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub ma10: Option<f64>,
    pub ma50: Option<f64>,
    pub ma200: Option<f64>,

    pub rsi: Option<f64>,

    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,

    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
}

impl IndicatorSnapshot {
    /// True once every indicator has enough history.
    pub fn is_complete(&self) -> bool {
        [
            self.ma10,
            self.ma50,
            self.ma200,
            self.rsi,
            self.macd,
            self.macd_signal,
            self.macd_histogram,
            self.bb_upper,
            self.bb_middle,
            self.bb_lower,
        ]
        .iter()
        .all(Option::is_some)
    }
}
