// Offline forecast from exported daily bars: reads `<dir>/<SYMBOL>.csv` instead of calling the provider.

use anyhow::{Result, bail};
use clap::Parser;
use std::{path::PathBuf, sync::Arc};
use stock_forecast::{
    CsvSource, FORECAST, ForecastEngine, ForecastRequest, MODEL, ModelConfig, POOL, Period,
    WorkerPool, models::render_forecast,
};

#[derive(Parser, Debug)]
#[command(about = "Forecast closing prices from local CSV files")]
struct Args {
    /// Directory holding one <SYMBOL>.csv per ticker (Date,Open,High,Low,Close,Adj Close,Volume)
    #[arg(long, default_value = "data")]
    dir: PathBuf,

    #[arg(required = true)]
    symbols: Vec<String>,

    #[arg(long, default_value = "max")]
    period: String,

    #[arg(long, default_value_t = FORECAST.default_prediction_days as i64)]
    days: i64,

    #[arg(long)]
    epochs: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Setup Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let period = Period::parse_keyword(&args.period)?;
    let model = ModelConfig {
        epochs: args.epochs.unwrap_or(MODEL.epochs),
        seed: args.seed,
        ..MODEL
    };

    log::info!(
        "Forecasting {:?} from {} ({} history, {} days)",
        args.symbols,
        args.dir.display(),
        period,
        args.days
    );

    // 2. Engine over the CSV directory
    let pool = Arc::new(WorkerPool::start(POOL)?);
    let engine = ForecastEngine::new(Arc::new(CsvSource::new(&args.dir)), pool);

    // 3. One symbol at a time; each request already uses every core through the pool
    let mut results = Vec::new();
    let mut failed = 0;
    for symbol in &args.symbols {
        let outcome = match ForecastRequest::new(symbol, period, args.days, model) {
            Ok(req) => engine.forecast(req).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(r) => results.push(r),
            Err(e) => {
                log::error!("{}: {}", symbol, e);
                failed += 1;
            }
        }
    }
    engine.shutdown().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for r in &results {
            println!("{}\n", render_forecast(r));
        }
    }

    if failed > 0 {
        bail!("{} of {} forecasts failed", failed, args.symbols.len());
    }
    Ok(())
}
