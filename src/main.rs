use {
    anyhow::{Context, Result},
    clap::Parser,
    futures::future::join_all,
    std::{panic, sync::Arc},
    stock_forecast::{
        AnalysisRequest, Cli, Command, ForecastEngine, ForecastRequest, OutputFormat, PoolConfig,
        POOL, WorkerPool, YahooSource,
        models::{render_analyses, render_forecast},
    },
};

fn init_log() {
    let (global_level, my_code_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Warn)
    };

    let mut builder = env_logger::Builder::new();

    builder
        .filter(None, global_level)
        .filter(Some("stock_forecast"), my_code_level)
        // RUST_LOG still wins
        .parse_default_env()
        .init();
}

/// Splits per-symbol outcomes into successes and a failure count, reporting each failure on stderr.
fn collect<T>(symbols: &[String], results: Vec<stock_forecast::Result<T>>) -> (Vec<T>, usize) {
    let mut failures = 0;
    let mut ok = Vec::with_capacity(results.len());
    for (symbol, result) in symbols.iter().zip(results) {
        match result {
            Ok(r) => ok.push(r),
            Err(e) => {
                failures += 1;
                eprintln!("{}: [{}] {}", symbol, e.kind(), e);
            }
        }
    }
    (ok, failures)
}

#[tokio::main]
async fn main() -> Result<()> {
    panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        log::error!("CRITICAL PANIC:\n{}\nStack Trace:\n{}", info, backtrace);
    }));
    init_log();

    let args = Cli::parse();

    let pool = Arc::new(WorkerPool::start(PoolConfig {
        workers: args.workers,
        ..POOL
    })?);
    let source = Arc::new(YahooSource::new().context("failed to set up market data client")?);
    let engine = ForecastEngine::new(source, pool);

    log::info!(
        "{} via {} on {} workers",
        args.command.name(),
        engine.source_name(),
        engine.pool().config().workers
    );

    let failures = match &args.command {
        Command::Forecast(forecast) => {
            let model = forecast.model_config();
            let jobs = forecast.symbols.iter().map(|symbol| {
                let engine = engine.clone();
                let req = ForecastRequest::new(symbol, forecast.period, forecast.days, model);
                async move {
                    match req {
                        Ok(req) => engine.forecast(req).await,
                        Err(e) => Err(e),
                    }
                }
            });
            let (ok, failures) = collect(&forecast.symbols, join_all(jobs).await);
            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ok)?),
                OutputFormat::Table => {
                    for r in &ok {
                        println!("{}\n", render_forecast(r));
                    }
                }
            }
            failures
        }
        Command::Analyze { symbols } => {
            let jobs = symbols.iter().map(|symbol| {
                let engine = engine.clone();
                let req = AnalysisRequest::new(symbol);
                async move {
                    match req {
                        Ok(req) => engine.analyze(req).await,
                        Err(e) => Err(e),
                    }
                }
            });
            let (ok, failures) = collect(symbols, join_all(jobs).await);
            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ok)?),
                OutputFormat::Table => println!("{}", render_analyses(&ok)),
            }
            failures
        }
    };

    engine.shutdown().await;

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
