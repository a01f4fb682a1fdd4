//! Request parameter types

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// History length keyword understood by the market-data provider.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Default,
)]
pub enum Period {
    #[strum(serialize = "1d")]
    #[serde(rename = "1d")]
    D1,
    #[strum(serialize = "5d")]
    #[serde(rename = "5d")]
    D5,
    #[strum(serialize = "1mo")]
    #[serde(rename = "1mo")]
    Mo1,
    #[strum(serialize = "3mo")]
    #[serde(rename = "3mo")]
    Mo3,
    #[strum(serialize = "6mo")]
    #[serde(rename = "6mo")]
    Mo6,
    #[strum(serialize = "1y")]
    #[serde(rename = "1y")]
    Y1,
    #[strum(serialize = "2y")]
    #[serde(rename = "2y")]
    Y2,
    #[default]
    #[strum(serialize = "5y")]
    #[serde(rename = "5y")]
    Y5,
    #[strum(serialize = "10y")]
    #[serde(rename = "10y")]
    Y10,
    #[strum(serialize = "ytd")]
    #[serde(rename = "ytd")]
    Ytd,
    #[strum(serialize = "max")]
    #[serde(rename = "max")]
    Max,
}

impl Period {
    /// The keyword as sent to the provider ("1y", "5y", ...)
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Parses a provider keyword, rejecting anything unknown as an invalid request.
    pub fn parse_keyword(text: &str) -> crate::error::Result<Self> {
        text.trim().parse().map_err(|_| {
            crate::error::ForecastError::InvalidRequest(format!("unknown period '{}'", text.trim()))
        })
    }

    /// Exclusive lower bound of the window ending at `last`. None means unbounded.
    pub fn start_date(self, last: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::D1 => last.checked_sub_days(Days::new(1)),
            Self::D5 => last.checked_sub_days(Days::new(5)),
            Self::Mo1 => last.checked_sub_months(Months::new(1)),
            Self::Mo3 => last.checked_sub_months(Months::new(3)),
            Self::Mo6 => last.checked_sub_months(Months::new(6)),
            Self::Y1 => last.checked_sub_months(Months::new(12)),
            Self::Y2 => last.checked_sub_months(Months::new(24)),
            Self::Y5 => last.checked_sub_months(Months::new(60)),
            Self::Y10 => last.checked_sub_months(Months::new(120)),
            Self::Ytd => NaiveDate::from_ymd_opt(last.year() - 1, 12, 31),
            Self::Max => None,
        }
    }
}
