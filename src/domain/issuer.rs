use serde::{Deserialize, Serialize};

/// Issuer metadata returned next to the bars. Every field is optional:
/// providers routinely omit fundamentals for ETFs, indices and delisted names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssuerInfo {
    pub name: Option<String>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
}

impl IssuerInfo {
    /// Company name, falling back to the ticker itself.
    pub fn display_name(&self, symbol: &str) -> String {
        self.name.clone().unwrap_or_else(|| symbol.to_string())
    }
}
