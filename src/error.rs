//! Error taxonomy shared by every stage of the pipeline.
//!
//! Each request either produces a complete result or exactly one of these.
//! Nothing is retried.

/// Failure of a forecast or analysis request.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    /// Unknown symbol, empty series, or the provider call itself failed.
    #[error("Data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// The series is shorter than the window the stage needs.
    #[error("Insufficient history: need at least {needed} bars, got {got}")]
    InsufficientHistory { needed: usize, got: usize },

    /// Training or inference went wrong (non-finite loss, shape mismatch, ...).
    #[error("Forecast failure: {0}")]
    ForecastFailure(String),

    /// Malformed request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The worker pool queue is full or the pool has been shut down.
    #[error("Service busy: {0}")]
    Busy(String),
}

impl ForecastError {
    pub(crate) fn data_unavailable(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn failure(msg: impl Into<String>) -> Self {
        Self::ForecastFailure(msg.into())
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DataUnavailable { .. } => "data_unavailable",
            Self::InsufficientHistory { .. } => "insufficient_history",
            Self::ForecastFailure(_) => "forecast_failure",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Busy(_) => "busy",
        }
    }

    /// True when the caller can fix the request (bad symbol, too little data, bad parameters).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::DataUnavailable { .. } | Self::InsufficientHistory { .. } | Self::InvalidRequest(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
