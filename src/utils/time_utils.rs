use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const MS_IN_MIN: i64 = Self::MS_IN_S * 60;
    pub const MS_IN_H: i64 = Self::MS_IN_MIN * 60;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d";
}

// Time Helper functions

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(TimeUtils::STANDARD_TIME_FORMAT).to_string()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The `count` weekdays following `last`, in order.
/// Exchange holidays are not known here, so only weekends are skipped.
pub fn next_trading_days(last: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut cursor = last;
    while dates.len() < count {
        cursor = match cursor.checked_add_days(Days::new(1)) {
            Some(d) => d,
            None => break,
        };
        if !is_weekend(cursor) {
            dates.push(cursor);
        }
    }
    dates
}

/// Converts a unix timestamp (seconds) plus the exchange's UTC offset into its local calendar date.
pub fn exchange_date(epoch_sec: i64, gmt_offset_sec: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(epoch_sec + gmt_offset_sec, 0).map(|dt| dt.date_naive())
}

pub fn format_duration(ms: i64) -> String {
    let secs = ms / TimeUtils::MS_IN_S;
    if secs < 1 {
        return format!("{}ms", ms);
    }
    if secs < 60 {
        return format!("{}s", secs);
    }
    let mins = ms / TimeUtils::MS_IN_MIN;
    if mins < 60 {
        return format!("{}m {}s", mins, secs % 60);
    }
    let hours = ms / TimeUtils::MS_IN_H;
    format!("{}h {}m", hours, mins % 60)
}
