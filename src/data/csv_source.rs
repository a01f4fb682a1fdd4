// Offline market data: one `<SYMBOL>.csv` per ticker in a directory, in the
// column layout of Yahoo's "download history" export.

use {
    anyhow::Context,
    async_trait::async_trait,
    chrono::NaiveDate,
    serde::Deserialize,
    std::path::{Path, PathBuf},
};

use crate::{
    config::Period,
    data::{MarketDataSource, MarketSeries},
    domain::{Bar, IssuerInfo, Symbol},
    error::{ForecastError, Result},
};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume", default)]
    volume: f64,
}

impl From<CsvRow> for Bar {
    fn from(row: CsvRow) -> Self {
        Bar::new(
            row.date,
            row.open,
            row.high,
            row.low,
            row.close,
            row.volume.max(0.0) as u64,
        )
    }
}

pub(crate) fn read_bars(path: &Path) -> anyhow::Result<Vec<Bar>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let mut bars = Vec::new();
    for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
        // Exports mark missing days with "null" cells; those rows fail to parse and are skipped
        match row {
            Ok(r) => bars.push(r.into()),
            Err(e) => log::debug!("{}: skipping row {}: {}", path.display(), line + 2, e),
        }
    }
    Ok(bars)
}

/// Keeps the bars inside `period`, measured back from the newest bar.
pub(crate) fn clip_to_period(bars: &mut Vec<Bar>, period: Period) {
    let Some(last) = bars.iter().map(|b| b.date).max() else {
        return;
    };
    if let Some(start) = period.start_date(last) {
        bars.retain(|b| b.date > start);
    }
}

/// Reads `<dir>/<SYMBOL>.csv`. A missing file means an unknown symbol.
#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &Symbol) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol))
    }
}

#[async_trait]
impl MarketDataSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    async fn fetch(&self, symbol: &Symbol, period: Period) -> Result<MarketSeries> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(ForecastError::data_unavailable(
                symbol.as_str(),
                format!("no file {}", path.display()),
            ));
        }

        let read = tokio::task::spawn_blocking(move || read_bars(&path))
            .await
            .map_err(|e| ForecastError::failure(format!("csv reader task failed: {}", e)))?;

        let mut bars = read.map_err(|e| {
            ForecastError::data_unavailable(symbol.as_str(), format!("{:#}", e))
        })?;
        clip_to_period(&mut bars, period);

        MarketSeries::new(symbol.clone(), bars, IssuerInfo::default())
    }
}
