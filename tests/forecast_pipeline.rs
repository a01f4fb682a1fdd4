mod common;

use chrono::{Datelike, Weekday};
use common::{StaticSource, bars_from_closes, engine_with, quick_model, wavy_closes};
use stock_forecast::{
    AnalysisRequest, ForecastError, ForecastRequest, IssuerInfo, Period, analysis::Recommendation,
};

fn source() -> StaticSource {
    StaticSource::default()
        .with(
            "WAVE",
            bars_from_closes(&wavy_closes(150)),
            IssuerInfo {
                name: Some("Wave Industries".into()),
                market_cap: Some(1.2e9),
                pe_ratio: None,
            },
        )
        .with("EMPTY", vec![], IssuerInfo::default())
        .with("SHORT", bars_from_closes(&wavy_closes(40)), IssuerInfo::default())
}

#[tokio::test]
async fn forecast_end_to_end() {
    let engine = engine_with(source(), 2);
    assert_eq!(engine.source_name(), "static");
    let req = ForecastRequest::new("wave", Period::Y1, 7, quick_model()).unwrap();
    let result = engine.forecast(req).await.unwrap();

    assert_eq!(result.symbol.as_str(), "WAVE");
    assert_eq!(result.predictions.len(), 7);
    assert_eq!(result.prediction_dates.len(), 7);
    assert!(result.predictions.iter().all(|p| p.is_finite()));

    let m = result.metrics;
    for v in [m.mse, m.mae, m.rmse, m.accuracy] {
        assert!(v.is_finite());
    }
    assert!((0.0..=100.0).contains(&m.accuracy));
    assert!((m.rmse - m.mse.sqrt()).abs() < 1e-9);

    // Forecast dates follow the last bar, skip weekends and strictly increase
    let last_actual = *result.dates.last().unwrap();
    assert!(result.prediction_dates[0] > last_actual);
    assert!(result
        .prediction_dates
        .iter()
        .all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));
    assert!(result.prediction_dates.windows(2).all(|w| w[0] < w[1]));

    // 60 recent closes echoed back, 150 - 60 = 90 windows split 72 / 18
    assert_eq!(result.actual_prices.len(), 60);
    assert_eq!(result.dates.len(), 60);
    assert_eq!(result.training.train_samples, 72);
    assert_eq!(result.training.test_samples, 18);

    assert_eq!(result.info.company_name, "Wave Industries");
    assert_eq!(result.info.market_cap, Some(1.2e9));
    assert_eq!(result.info.pe_ratio, None);
    assert_eq!(result.indicators.current_price, *result.actual_prices.last().unwrap());
    // 150 bars is not enough for the 200-bar average
    assert_eq!(result.indicators.ma_200, 0.0);

    let json = serde_json::to_value(&result).unwrap();
    for key in ["id", "generated_at", "predictions", "prediction_dates", "metrics", "indicators", "info"] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(json["info"]["pe_ratio"], serde_json::Value::Null);

    engine.shutdown().await;
}

#[tokio::test]
async fn seeded_forecasts_are_reproducible() {
    let engine = engine_with(source(), 2);
    let mut runs = Vec::new();
    for _ in 0..2 {
        let req = ForecastRequest::new("WAVE", Period::Y1, 3, quick_model()).unwrap();
        runs.push(engine.forecast(req).await.unwrap().predictions);
    }
    assert_eq!(runs[0], runs[1]);
    engine.shutdown().await;
}

#[tokio::test]
async fn empty_series_is_data_unavailable() {
    let engine = engine_with(source(), 1);
    let req = ForecastRequest::new("EMPTY", Period::Y1, 7, quick_model()).unwrap();
    let err = engine.forecast(req).await.unwrap_err();
    assert!(matches!(err, ForecastError::DataUnavailable { .. }), "{}", err);
    assert!(err.is_client_error());
}

#[tokio::test]
async fn unknown_symbol_is_data_unavailable() {
    let engine = engine_with(source(), 1);
    let err = engine
        .analyze(AnalysisRequest::new("NOPE").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, ForecastError::DataUnavailable { .. }));
}

#[tokio::test]
async fn short_history_is_insufficient() {
    let engine = engine_with(source(), 1);
    let req = ForecastRequest::new("SHORT", Period::Y1, 7, quick_model()).unwrap();
    let err = engine.forecast(req).await.unwrap_err();
    assert!(matches!(
        err,
        ForecastError::InsufficientHistory { needed: 62, got: 40 }
    ));
}

#[tokio::test]
async fn analysis_reports_latest_session() {
    let engine = engine_with(source(), 1);
    let result = engine
        .analyze(AnalysisRequest::new("wave").unwrap())
        .await
        .unwrap();
    let closes = wavy_closes(150);
    let (last, prev) = (closes[149], closes[148]);
    assert_eq!(result.current_price, last);
    assert!((result.change - (last - prev)).abs() < 1e-9);
    assert!((result.change_percent - (last - prev) / prev * 100.0).abs() < 1e-9);
    assert!((0.0..=100.0).contains(&result.rsi));
    // No 200-bar average yet, so it reads as the current price
    assert_eq!(result.moving_averages.ma_200, last);
    assert!(matches!(
        result.recommendation,
        Recommendation::Buy | Recommendation::Sell | Recommendation::Hold
    ));
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let engine = engine_with(source(), 2);
    let requests = ["WAVE", "EMPTY", "WAVE"].map(|s| {
        let engine = engine.clone();
        let req = ForecastRequest::new(s, Period::Y1, 2, quick_model()).unwrap();
        async move { engine.forecast(req).await }
    });
    let results = futures::future::join_all(requests).await;
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert_eq!(
        results[0].as_ref().unwrap().predictions,
        results[2].as_ref().unwrap().predictions
    );
    engine.shutdown().await;
}
