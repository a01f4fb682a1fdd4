use async_trait::async_trait;

use crate::config::Period;
use crate::domain::{Bar, IssuerInfo, Symbol, is_chronological, normalize_series};
use crate::error::{ForecastError, Result};

/// Bars plus issuer metadata for one symbol.
#[derive(Debug, Clone)]
pub struct MarketSeries {
    pub symbol: Symbol,
    pub bars: Vec<Bar>,
    pub info: IssuerInfo,
}

impl MarketSeries {
    /// Normalizes ordering and rejects empty series with `DataUnavailable`.
    pub fn new(symbol: Symbol, mut bars: Vec<Bar>, info: IssuerInfo) -> Result<Self> {
        bars.retain(Bar::is_valid);
        normalize_series(&mut bars);
        if bars.is_empty() {
            return Err(ForecastError::data_unavailable(
                symbol.as_str(),
                "no price data found, symbol may be delisted",
            ));
        }
        debug_assert!(is_chronological(&bars));
        Ok(Self { symbol, bars, info })
    }

    pub fn last_bar(&self) -> &Bar {
        // Non-empty by construction
        &self.bars[self.bars.len() - 1]
    }
}

/// Abstract interface for fetching daily market data.
///
/// Implementations never retry; any failure (unknown symbol, network,
/// rate limit, malformed payload) surfaces as `DataUnavailable`
/// carrying the provider's message.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Daily bars for `symbol` over `period`, oldest first, with issuer metadata.
    async fn fetch(&self, symbol: &Symbol, period: Period) -> Result<MarketSeries>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_series_is_data_unavailable() {
        let sym = Symbol::parse("GONE").unwrap();
        let err = MarketSeries::new(sym, vec![], IssuerInfo::default()).unwrap_err();
        assert!(matches!(err, ForecastError::DataUnavailable { .. }));
    }

    #[test]
    fn invalid_bars_are_dropped() {
        let sym = Symbol::parse("X").unwrap();
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let bars = vec![
            Bar::new(d, 1.0, 1.0, 1.0, f64::NAN, 0),
            Bar::new(d.succ_opt().unwrap(), 1.0, 1.0, 1.0, 1.0, 0),
        ];
        let series = MarketSeries::new(sym, bars, IssuerInfo::default()).unwrap();
        assert_eq!(series.bars.len(), 1);
        assert_eq!(series.last_bar().close, 1.0);
    }
}
