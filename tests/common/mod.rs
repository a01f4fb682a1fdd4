#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use stock_forecast::{
    Bar, ForecastEngine, ForecastError, IssuerInfo, MODEL, MarketDataSource, MarketSeries,
    ModelConfig, Period, PoolConfig, Result, Symbol, WorkerPool,
    utils::next_trading_days,
};

/// In-memory market data keyed by upper-case ticker.
#[derive(Default)]
pub struct StaticSource {
    series: HashMap<String, (Vec<Bar>, IssuerInfo)>,
    pub calls: AtomicUsize,
}

impl StaticSource {
    pub fn with(mut self, symbol: &str, bars: Vec<Bar>, info: IssuerInfo) -> Self {
        self.series.insert(symbol.to_string(), (bars, info));
        self
    }
}

#[async_trait]
impl MarketDataSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, symbol: &Symbol, _period: Period) -> Result<MarketSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.series.get(symbol.as_str()) {
            Some((bars, info)) => MarketSeries::new(symbol.clone(), bars.clone(), info.clone()),
            None => Err(ForecastError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "unknown symbol".into(),
            }),
        }
    }
}

/// Weekday bars with the given closes, starting after 2021-01-01.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    next_trading_days(start, closes.len())
        .into_iter()
        .zip(closes)
        .map(|(date, &c)| Bar::new(date, c * 0.99, c * 1.01, c * 0.98, c, 1_000_000))
        .collect()
}

/// Trending, oscillating price path.
pub fn wavy_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.05 * t + 4.0 * (t * 0.15).sin() + 1.5 * (t * 0.9).cos()
        })
        .collect()
}

/// Narrow, short-schedule network with a fixed seed.
pub fn quick_model() -> ModelConfig {
    ModelConfig {
        lstm_units: 8,
        lstm_layers: 3,
        dense_units: 4,
        epochs: 3,
        batch_size: 16,
        patience: 2,
        seed: Some(1234),
        ..MODEL
    }
}

pub fn engine_with(source: StaticSource, workers: usize) -> ForecastEngine {
    let pool = WorkerPool::start(PoolConfig {
        workers,
        queue_capacity: 16,
    })
    .unwrap();
    ForecastEngine::new(Arc::new(source), Arc::new(pool))
}
