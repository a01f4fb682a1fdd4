//! Forecast pipeline configuration

use crate::config::Period;

pub struct ForecastConfig {
    /// Number of scaled closes fed to the model per prediction (L)
    pub window_len: usize,
    /// Fraction of sequences used for training; the rest is held out for evaluation
    pub split_ratio: f64,
    /// How many recent actual closes are echoed back in a forecast result
    pub recent_len: usize,
    pub default_period: Period,
    pub default_prediction_days: usize,
    /// Analysis requests always look at one year of history
    pub analysis_period: Period,
}

pub const FORECAST: ForecastConfig = ForecastConfig {
    window_len: 60,
    split_ratio: 0.8,
    recent_len: 60,
    default_period: Period::Y5,
    default_prediction_days: 30,
    analysis_period: Period::Y1,
};

impl ForecastConfig {
    /// Minimum number of closes for a forecast: one window plus at least one train and one test target.
    pub const fn min_history(&self) -> usize {
        self.window_len + 2
    }
}
