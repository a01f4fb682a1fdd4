// Feature engineering, scoring and signals around the forecast model
mod indicators;
mod metrics;
mod recommendation;
mod rollout;
mod scaler;

pub use {
    indicators::{
        IndicatorEngine, MacdSeries, bollinger_series, ema_series, macd_series, rsi_series,
        sma_series,
    },
    metrics::{Metrics, MetricsEvaluator},
    recommendation::{Recommendation, RecommendationEngine},
    rollout::{RollingWindow, rollout},
    scaler::{ScalerState, SequenceScaler, SequenceSet},
};
