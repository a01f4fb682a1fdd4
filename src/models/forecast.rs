use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::Metrics;
use crate::config::Period;
use crate::domain::{IssuerInfo, Symbol};
use crate::ml::TrainingReport;
use crate::models::IndicatorSummary;

/// Issuer fields echoed in a forecast. The name falls back to the ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuerSummary {
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub company_name: String,
}

impl IssuerSummary {
    pub fn new(info: &IssuerInfo, symbol: &Symbol) -> Self {
        Self {
            market_cap: info.market_cap,
            pe_ratio: info.pe_ratio,
            company_name: info.display_name(symbol.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub train_samples: usize,
    pub test_samples: usize,
    pub epochs_run: usize,
    pub best_epoch: usize,
    pub best_loss: f64,
    pub stopped_early: bool,
    pub elapsed_ms: u64,
}

impl TrainingSummary {
    pub fn new(report: &TrainingReport, test_samples: usize) -> Self {
        Self {
            train_samples: report.train_samples,
            test_samples,
            epochs_run: report.epochs_run,
            best_epoch: report.best_epoch,
            best_loss: report.best_loss,
            stopped_early: report.stopped_early,
            elapsed_ms: report.elapsed_ms,
        }
    }
}

/// Everything a forecast request produces. `id` and `generated_at` let a caller store it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub symbol: Symbol,
    pub period: Period,

    /// Forecast closes, one per future trading day
    pub predictions: Vec<f64>,
    pub prediction_dates: Vec<NaiveDate>,

    /// Most recent actual closes
    pub actual_prices: Vec<f64>,
    pub dates: Vec<NaiveDate>,

    pub metrics: Metrics,
    pub indicators: IndicatorSummary,
    pub info: IssuerSummary,
    pub training: TrainingSummary,
}

impl ForecastResult {
    pub fn last_actual(&self) -> Option<f64> {
        self.actual_prices.last().copied()
    }

    /// Change from the last actual close to the final forecast, in percent.
    pub fn horizon_change_pct(&self) -> Option<f64> {
        let first = self.last_actual()?;
        let last = *self.predictions.last()?;
        Some(crate::utils::percent_change(last, first))
    }
}
