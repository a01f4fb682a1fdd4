mod csv_source;
mod provider;
mod rate_limiter;
mod yahoo;

pub use {
    csv_source::CsvSource,
    provider::{MarketDataSource, MarketSeries},
    rate_limiter::RequestLimiter,
    yahoo::{YahooError, YahooSource},
};
