use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::{ForecastError, Result};

/// Held-out error statistics in price units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub mse: f64,
    pub mae: f64,
    pub rmse: f64,
    /// `max(0, 100 - mae / mean(actual) * 100)`, 0 when the actual mean is 0
    pub accuracy: f64,
}

impl Metrics {
    pub fn is_finite(&self) -> bool {
        [self.mse, self.mae, self.rmse, self.accuracy]
            .iter()
            .all(|v| v.is_finite())
    }
}

pub struct MetricsEvaluator;

impl MetricsEvaluator {
    pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Result<Metrics> {
        if actual.is_empty() || actual.len() != predicted.len() {
            return Err(ForecastError::failure(format!(
                "cannot score {} predictions against {} actual values",
                predicted.len(),
                actual.len()
            )));
        }

        let errors: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| p - a).collect();
        let mse = errors.iter().map(|e| e * e).mean();
        let mae = errors.iter().map(|e| e.abs()).mean();
        let rmse = mse.sqrt();

        let mean_actual = actual.mean();
        let accuracy = if mean_actual == 0.0 {
            0.0
        } else {
            (100.0 - (mae / mean_actual * 100.0)).max(0.0)
        };

        Ok(Metrics {
            mse,
            mae,
            rmse,
            accuracy,
        })
    }
}
