mod common;

use common::bars_from_closes;
use stock_forecast::analysis::{IndicatorEngine, MetricsEvaluator, RecommendationEngine};
use stock_forecast::models::{IndicatorSummary, MovingAverages};

#[test]
fn constant_series_indicators() {
    let bars = bars_from_closes(&[42.0; 250]);
    let snaps = IndicatorEngine::default().derive(&bars);
    assert_eq!(snaps.len(), 250);

    // RSI is undefined until 14 changes exist, then neutral
    assert!(snaps[13].rsi.is_none());
    assert!(snaps[14..].iter().all(|s| s.rsi == Some(50.0)));

    for (i, s) in snaps.iter().enumerate() {
        assert_eq!(s.ma10.is_some(), i >= 9);
        assert_eq!(s.ma50.is_some(), i >= 49);
        assert_eq!(s.ma200.is_some(), i >= 199);
        assert_eq!(s.bb_middle.is_some(), i >= 19);
    }

    let last = snaps.last().unwrap();
    assert!(last.is_complete());
    for ma in [last.ma10, last.ma50, last.ma200] {
        assert!((ma.unwrap() - 42.0).abs() < 1e-9);
    }
    // Zero variance collapses the bands onto the price
    for band in [last.bb_upper, last.bb_middle, last.bb_lower] {
        assert!((band.unwrap() - 42.0).abs() < 1e-9);
    }
    assert!(last.macd.unwrap().abs() < 1e-9);
    assert!(last.macd_histogram.unwrap().abs() < 1e-9);
}

#[test]
fn short_series_keeps_undefined_values_until_presentation() {
    let bars = bars_from_closes(&[10.0, 11.0, 12.0]);
    let snap = IndicatorEngine::default().latest(&bars);
    assert!(snap.ma10.is_none() && snap.rsi.is_none() && snap.macd.is_none());

    let summary = IndicatorSummary::from_snapshot(&snap, bars.last().unwrap());
    assert_eq!(summary.rsi, 50.0);
    assert_eq!(summary.ma_10, 0.0);
    assert_eq!(summary.bb_upper, 0.0);

    let ma = MovingAverages::with_price_fallback(&snap, 12.0);
    assert_eq!((ma.ma_10, ma.ma_50, ma.ma_200), (12.0, 12.0, 12.0));
}

#[test]
fn recommendation_on_constant_series_is_hold() {
    let bars = bars_from_closes(&[42.0; 250]);
    let snap = IndicatorEngine::default().latest(&bars);
    let label = RecommendationEngine::default().recommend(&snap, 42.0);
    assert_eq!(label.to_string(), "HOLD");
}

#[test]
fn metrics_worked_example() {
    let m = MetricsEvaluator::evaluate(&[100.0, 102.0, 98.0], &[101.0, 101.0, 99.0]).unwrap();
    assert!((m.mae - 1.0).abs() < 1e-12);
    assert!((m.mse - 1.0).abs() < 1e-12);
    assert!((m.rmse - 1.0).abs() < 1e-12);
    assert!((m.accuracy - 99.0).abs() < 1e-12);
}
