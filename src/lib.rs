#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ml;
pub mod models;
pub mod utils;

// Re-export commonly used types outside of crate (for the binaries and integration tests)
pub use config::{FORECAST, MODEL, ModelConfig, POOL, Period, PoolConfig};
pub use data::{CsvSource, MarketDataSource, MarketSeries, YahooSource};
pub use domain::{Bar, IssuerInfo, Symbol};
pub use engine::{AnalysisRequest, ForecastEngine, ForecastRequest, WorkerPool};
pub use error::{ForecastError, Result};
pub use models::{AnalysisResult, ForecastResult};

// CLI argument parsing
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Worker threads for training and inference
    #[arg(long, default_value_t = POOL.workers, global = true)]
    pub workers: usize,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a model per symbol and forecast closing prices
    Forecast(ForecastArgs),
    /// Indicator snapshot and BUY/SELL/HOLD signal per symbol
    Analyze {
        #[arg(required = true)]
        symbols: Vec<String>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Forecast(_) => "forecast",
            Command::Analyze { .. } => "analyze",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ForecastArgs {
    #[arg(required = true)]
    pub symbols: Vec<String>,

    /// History to train on ("1y", "5y", "max", ...)
    #[arg(long, default_value = "5y", value_parser = parse_period)]
    pub period: Period,

    /// Trading days to forecast
    #[arg(long, default_value_t = FORECAST.default_prediction_days as i64, allow_negative_numbers = true)]
    pub days: i64,

    /// Override the maximum number of training epochs
    #[arg(long)]
    pub epochs: Option<usize>,

    /// Seed weight init, dropout and shuffling for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ForecastArgs {
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            epochs: self.epochs.unwrap_or(MODEL.epochs),
            seed: self.seed,
            ..MODEL
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

fn parse_period(text: &str) -> std::result::Result<Period, String> {
    Period::parse_keyword(text).map_err(|e| e.to_string())
}
