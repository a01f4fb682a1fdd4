// Plain-text tables for the CLI.

use tabled::{Table, Tabled, settings::Style};

use crate::models::{AnalysisResult, ForecastResult};
use crate::utils::{format_date, format_duration};

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

fn market_cap(value: Option<f64>) -> String {
    match value {
        Some(v) if v >= 1e12 => format!("{:.2}T", v / 1e12),
        Some(v) if v >= 1e9 => format!("{:.2}B", v / 1e9),
        Some(v) if v >= 1e6 => format!("{:.2}M", v / 1e6),
        other => opt(other),
    }
}

#[derive(Tabled)]
struct ForecastRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Forecast")]
    price: String,
}

#[derive(Tabled)]
struct AnalysisRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Change")]
    change: String,
    #[tabled(rename = "Volume")]
    volume: u64,
    #[tabled(rename = "MA10")]
    ma_10: String,
    #[tabled(rename = "MA50")]
    ma_50: String,
    #[tabled(rename = "MA200")]
    ma_200: String,
    #[tabled(rename = "RSI")]
    rsi: String,
    #[tabled(rename = "Signal")]
    recommendation: String,
    #[tabled(rename = "Mkt Cap")]
    market_cap: String,
    #[tabled(rename = "P/E")]
    pe_ratio: String,
}

pub fn render_forecast(result: &ForecastResult) -> String {
    let m = &result.metrics;
    let mut out = format!(
        "{} ({}) {} | last close {} | MAE {:.4} RMSE {:.4} accuracy {:.2}%\n",
        result.symbol,
        result.info.company_name,
        result.period,
        opt(result.last_actual()),
        m.mae,
        m.rmse,
        m.accuracy
    );
    out.push_str(&format!(
        "trained {} epochs on {} windows in {} (best loss {:.6} at epoch {}), held out {}\n",
        result.training.epochs_run,
        result.training.train_samples,
        format_duration(result.training.elapsed_ms as i64),
        result.training.best_loss,
        result.training.best_epoch,
        result.training.test_samples
    ));
    if let Some(pct) = result.horizon_change_pct() {
        out.push_str(&format!(
            "{}-day outlook {:+.2}% from last close\n",
            result.predictions.len(),
            pct
        ));
    }

    let rows = result
        .prediction_dates
        .iter()
        .zip(&result.predictions)
        .map(|(d, p)| ForecastRow {
            date: format_date(*d),
            price: format!("{:.2}", p),
        });
    out.push_str(&Table::new(rows).with(Style::rounded()).to_string());
    out
}

pub fn render_analyses(results: &[AnalysisResult]) -> String {
    let rows = results.iter().map(|r| AnalysisRow {
        symbol: r.symbol.to_string(),
        price: format!("{:.2}", r.current_price),
        change: format!("{:+.2} ({:+.2}%)", r.change, r.change_percent),
        volume: r.volume,
        ma_10: format!("{:.2}", r.moving_averages.ma_10),
        ma_50: format!("{:.2}", r.moving_averages.ma_50),
        ma_200: format!("{:.2}", r.moving_averages.ma_200),
        rsi: format!("{:.1}", r.rsi),
        recommendation: r.recommendation.to_string(),
        market_cap: market_cap(r.market_cap),
        pe_ratio: opt(r.pe_ratio),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Metrics;
    use crate::config::Period;
    use crate::domain::{Bar, IssuerInfo, Symbol};
    use crate::models::{IndicatorSnapshot, IndicatorSummary, IssuerSummary, TrainingSummary};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn sample_forecast() -> ForecastResult {
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let symbol = Symbol::parse("MSFT").unwrap();
        ForecastResult {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            symbol: symbol.clone(),
            period: Period::Y1,
            predictions: vec![101.0, 103.0, 110.0],
            prediction_dates: vec![
                NaiveDate::from_ymd_opt(2024, 3, 18).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 19).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            ],
            actual_prices: vec![98.0, 100.0],
            dates: vec![day.pred_opt().unwrap(), day],
            metrics: Metrics {
                mse: 1.0,
                mae: 1.0,
                rmse: 1.0,
                accuracy: 99.0,
            },
            indicators: IndicatorSummary::from_snapshot(
                &IndicatorSnapshot::default(),
                &Bar::new(day, 100.0, 100.0, 100.0, 100.0, 10),
            ),
            info: IssuerSummary::new(&IssuerInfo::default(), &symbol),
            training: TrainingSummary {
                train_samples: 72,
                test_samples: 18,
                epochs_run: 3,
                best_epoch: 2,
                best_loss: 0.01,
                stopped_early: false,
                elapsed_ms: 1_500,
            },
        }
    }

    #[test]
    fn forecast_report_shows_outlook() {
        let result = sample_forecast();
        assert_eq!(result.horizon_change_pct(), Some(10.0));

        let text = render_forecast(&result);
        assert!(text.contains("3-day outlook +10.00% from last close"), "{}", text);
        assert!(text.contains("2024-03-20"));
        assert!(text.contains("110.00"));
    }

    #[test]
    fn no_outlook_without_predictions() {
        let mut result = sample_forecast();
        result.predictions.clear();
        result.prediction_dates.clear();
        assert_eq!(result.horizon_change_pct(), None);
        assert!(!render_forecast(&result).contains("outlook"));
    }

    #[test]
    fn market_cap_units() {
        assert_eq!(market_cap(Some(2.9e12)), "2.90T");
        assert_eq!(market_cap(Some(4.5e9)), "4.50B");
        assert_eq!(market_cap(None), "-");
    }
}
