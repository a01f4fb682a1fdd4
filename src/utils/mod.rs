mod maths_utils;
mod perf;
mod time_utils;

pub use time_utils::{
    TimeUtils, exchange_date, format_date, format_duration, is_weekend, next_trading_days, now_utc,
};

pub use maths_utils::{all_finite, mean_and_stddev, percent_change, remap};
