//! Configuration module for the forecasting service.

// Can all be private now because we have a public re-export.
mod debug;
mod forecast;
mod indicators;
mod model;
mod pool;
mod types;
mod yahoo;

// Re-export commonly used items
pub use debug::{DF, LOG_PERFORMANCE, LogFlags};
pub use forecast::{FORECAST, ForecastConfig};
pub use indicators::{INDICATORS, IndicatorConfig};
pub use model::{MODEL, ModelConfig};
pub use pool::{POOL, PoolConfig};
pub use types::Period;
pub use yahoo::{YAHOO, YahooApiConfig, YahooConfig};
