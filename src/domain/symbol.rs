use serde::{Deserialize, Serialize};

use crate::config::Period;
use crate::error::{ForecastError, Result};

/// A ticker symbol, upper-cased on construction.
#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    const MAX_LEN: usize = 16;

    /// Accepts letters, digits and the `.-^=` punctuation used by index and FX tickers.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ForecastError::InvalidRequest("symbol is empty".into()));
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(ForecastError::InvalidRequest(format!(
                "symbol '{}' is longer than {} characters",
                trimmed,
                Self::MAX_LEN
            )));
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
        {
            return Err(ForecastError::InvalidRequest(format!(
                "symbol '{}' contains invalid character '{}'",
                trimmed, bad
            )));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Symbol plus history window, used to label provider calls and log lines.
#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct SymbolPeriod {
    pub symbol: Symbol,
    pub period: Period,
}

impl SymbolPeriod {
    pub fn new(symbol: Symbol, period: Period) -> Self {
        Self { symbol, period }
    }
}

impl std::fmt::Display for SymbolPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ({})", self.symbol, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_upper_cases() {
        assert_eq!(Symbol::parse(" aapl ").unwrap().as_str(), "AAPL");
        assert_eq!(Symbol::parse("brk-b").unwrap().as_str(), "BRK-B");
        assert_eq!(Symbol::parse("^gspc").unwrap().as_str(), "^GSPC");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            Symbol::parse(""),
            Err(ForecastError::InvalidRequest(_))
        ));
        assert!(Symbol::parse("AA PL").is_err());
        assert!(Symbol::parse("../etc").is_err());
        assert!(Symbol::parse("ABCDEFGHIJKLMNOPQ").is_err());
    }

    #[test]
    fn display_includes_period() {
        let sp = SymbolPeriod::new(Symbol::parse("msft").unwrap(), Period::Y1);
        assert_eq!(sp.to_string(), "MSFT (1y)");
    }
}
