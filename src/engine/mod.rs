// Request handling: validation, the worker pool and the per-request pipeline
mod core;
mod messages;
mod pipeline;
mod pool;

pub use {
    core::ForecastEngine,
    messages::{AnalysisRequest, ForecastRequest},
    pipeline::{run_analysis, run_forecast},
    pool::{JobHandle, WorkerPool},
};
