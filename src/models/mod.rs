// Request outputs and the presentation defaults applied to them
mod analysis_result;
mod forecast;
mod indicator_snapshot;
mod report;
mod summary;

pub use {
    analysis_result::AnalysisResult,
    forecast::{ForecastResult, IssuerSummary, TrainingSummary},
    indicator_snapshot::IndicatorSnapshot,
    report::{render_analyses, render_forecast},
    summary::{IndicatorSummary, MovingAverages},
};
