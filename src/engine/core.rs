use std::sync::Arc;

use crate::data::MarketDataSource;
use crate::engine::messages::{AnalysisRequest, ForecastRequest};
use crate::engine::pipeline;
use crate::engine::pool::WorkerPool;
use crate::error::Result;
use crate::models::{AnalysisResult, ForecastResult};

/// Request-accepting side of the service.
///
/// Market data is fetched on the async runtime; the CPU-heavy rest of each
/// request is handed to the worker pool and awaited. Requests share nothing
/// but the data source and the pool.
#[derive(Clone)]
pub struct ForecastEngine {
    source: Arc<dyn MarketDataSource>,
    pool: Arc<WorkerPool>,
}

impl ForecastEngine {
    pub fn new(source: Arc<dyn MarketDataSource>, pool: Arc<WorkerPool>) -> Self {
        Self { source, pool }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub async fn forecast(&self, req: ForecastRequest) -> Result<ForecastResult> {
        let series = self.source.fetch(&req.symbol, req.period).await?;
        log::debug!(
            "{}: {} bars from {}",
            req.label(),
            series.bars.len(),
            self.source.name()
        );

        let label = req.label();
        self.pool
            .submit(label, move || pipeline::run_forecast(&req, series))?
            .wait()
            .await
    }

    pub async fn analyze(&self, req: AnalysisRequest) -> Result<AnalysisResult> {
        let series = self.source.fetch(&req.symbol, req.period).await?;
        self.pool
            .submit(format!("analyze {}", req.symbol), move || {
                pipeline::run_analysis(series)
            })?
            .wait()
            .await
    }

    /// Drains the pool without blocking the runtime.
    pub async fn shutdown(&self) {
        let pool = Arc::clone(&self.pool);
        if let Err(e) = tokio::task::spawn_blocking(move || pool.shutdown()).await {
            log::error!("worker pool shutdown failed: {}", e);
        }
    }
}
