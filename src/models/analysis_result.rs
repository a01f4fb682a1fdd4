use serde::{Deserialize, Serialize};

use crate::analysis::Recommendation;
use crate::domain::Symbol;
use crate::models::MovingAverages;

/// Snapshot of the latest session plus a rule-based signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: Symbol,
    pub company_name: String,
    pub current_price: f64,
    /// Versus the previous close
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub moving_averages: MovingAverages,
    pub rsi: f64,
    pub recommendation: Recommendation,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
}
