//! The CPU-bound part of a request: everything after the data has been fetched.
//! Runs on a pool worker and never yields.

use uuid::Uuid;

use crate::analysis::{IndicatorEngine, RecommendationEngine, SequenceScaler};
use crate::config::{DF, FORECAST, INDICATORS};
use crate::data::MarketSeries;
use crate::domain::closes;
use crate::engine::messages::ForecastRequest;
use crate::error::{ForecastError, Result};
use crate::ml::ForecastModel;
use crate::models::{
    AnalysisResult, ForecastResult, IndicatorSummary, IssuerSummary, MovingAverages,
    TrainingSummary,
};
use crate::utils::{next_trading_days, now_utc, percent_change};

pub fn run_forecast(req: &ForecastRequest, series: MarketSeries) -> Result<ForecastResult> {
    let label = req.label();

    crate::trace_time!(&format!("Total FORECAST [{}]", label), 180_000, {
        let prices = closes(&series.bars);
        let needed = FORECAST.min_history();
        if prices.len() < needed {
            return Err(ForecastError::InsufficientHistory {
                needed,
                got: prices.len(),
            });
        }
        let last_bar = *series.last_bar();

        // 1. Indicators at the latest bar
        let snapshot = crate::trace_time!(&format!("1. Indicators [{}]", label), 50, {
            IndicatorEngine::new(INDICATORS).latest(&series.bars)
        });
        if DF.log_indicators {
            log::info!("{}: latest indicators {:?}", label, snapshot);
        }

        // 2. Scale and window
        let scaler = SequenceScaler::new(FORECAST.window_len);
        let (scaled, state) = scaler.fit_transform(&prices)?;
        let (train, test) = scaler
            .build_sequences(&scaled)
            .split(FORECAST.split_ratio)?;

        // 3. Train, score the held-out tail, roll forward
        let mut model = ForecastModel::new(req.model, FORECAST.window_len)?;
        let report = crate::trace_time!(&format!("2. Train [{}]", label), 120_000, {
            model.train(&train)?.clone()
        });
        let evaluation = model.evaluate(&test, &state)?;
        let predictions = crate::trace_time!(&format!("3. Rollout [{}]", label), 100, {
            model.forecast(&scaled, req.prediction_days, &state)?
        });

        let prediction_dates = next_trading_days(last_bar.date, req.prediction_days);
        if prediction_dates.len() != predictions.len() {
            return Err(ForecastError::failure("could not generate forecast dates"));
        }

        let recent = &series.bars[series.bars.len().saturating_sub(FORECAST.recent_len)..];

        log::info!(
            "{}: trained {} epochs on {} windows, held-out accuracy {:.2}%",
            label,
            report.epochs_run,
            report.train_samples,
            evaluation.metrics.accuracy
        );

        Ok(ForecastResult {
            id: Uuid::new_v4(),
            generated_at: now_utc(),
            symbol: series.symbol.clone(),
            period: req.period,
            predictions,
            prediction_dates,
            actual_prices: closes(recent),
            dates: recent.iter().map(|b| b.date).collect(),
            metrics: evaluation.metrics,
            indicators: IndicatorSummary::from_snapshot(&snapshot, &last_bar),
            info: IssuerSummary::new(&series.info, &series.symbol),
            training: TrainingSummary::new(&report, test.len()),
        })
    })
}

pub fn run_analysis(series: MarketSeries) -> Result<AnalysisResult> {
    let bars = &series.bars;
    if bars.len() < 2 {
        return Err(ForecastError::InsufficientHistory {
            needed: 2,
            got: bars.len(),
        });
    }

    let last = bars[bars.len() - 1];
    let previous = bars[bars.len() - 2];
    let snapshot = IndicatorEngine::new(INDICATORS).latest(bars);
    let current_price = last.close;

    Ok(AnalysisResult {
        symbol: series.symbol.clone(),
        company_name: series.info.display_name(series.symbol.as_str()),
        current_price,
        change: current_price - previous.close,
        change_percent: percent_change(current_price, previous.close),
        volume: last.volume,
        moving_averages: MovingAverages::with_price_fallback(&snapshot, current_price),
        rsi: snapshot.rsi.unwrap_or(INDICATORS.rsi_neutral),
        recommendation: RecommendationEngine::new(&INDICATORS).recommend(&snapshot, current_price),
        market_cap: series.info.market_cap,
        pe_ratio: series.info.pe_ratio,
    })
}
