use crate::config::{FORECAST, ModelConfig, Period};
use crate::domain::Symbol;
use crate::error::{ForecastError, Result};

/// A validated forecast job.
#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub symbol: Symbol,
    pub period: Period,
    pub prediction_days: usize,
    pub model: ModelConfig,
}

impl ForecastRequest {
    /// `prediction_days` is signed so that callers can hand over untrusted input as-is.
    pub fn new(symbol: &str, period: Period, prediction_days: i64, model: ModelConfig) -> Result<Self> {
        let symbol = Symbol::parse(symbol)?;
        if prediction_days <= 0 {
            return Err(ForecastError::InvalidRequest(format!(
                "prediction_days must be positive, got {}",
                prediction_days
            )));
        }
        model.validate()?;
        Ok(Self {
            symbol,
            period,
            prediction_days: prediction_days as usize,
            model,
        })
    }

    pub fn label(&self) -> String {
        format!("{} ({}, {}d)", self.symbol, self.period, self.prediction_days)
    }
}

/// A validated indicator analysis job. Always looks at the analysis period.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub symbol: Symbol,
    pub period: Period,
}

impl AnalysisRequest {
    pub fn new(symbol: &str) -> Result<Self> {
        Ok(Self {
            symbol: Symbol::parse(symbol)?,
            period: FORECAST.analysis_period,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MODEL;

    #[test]
    fn rejects_non_positive_days() {
        for days in [0, -3] {
            let err = ForecastRequest::new("AAPL", Period::Y1, days, MODEL).unwrap_err();
            assert!(matches!(err, ForecastError::InvalidRequest(_)));
        }
    }

    #[test]
    fn accepts_long_horizons() {
        for days in [366, 1000] {
            let req = ForecastRequest::new("AAPL", Period::Y5, days, MODEL).unwrap();
            assert_eq!(req.prediction_days, days as usize);
        }
    }

    #[test]
    fn normalises_symbol() {
        let req = ForecastRequest::new(" msft ", Period::Y5, 7, MODEL).unwrap();
        assert_eq!(req.symbol.as_str(), "MSFT");
        assert_eq!(req.prediction_days, 7);
        assert_eq!(req.label(), "MSFT (5y, 7d)");
    }

    #[test]
    fn analysis_uses_one_year() {
        let req = AnalysisRequest::new("spy").unwrap();
        assert_eq!(req.period, Period::Y1);
    }
}
