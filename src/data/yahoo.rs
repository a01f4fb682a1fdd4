// Yahoo Finance adapter: daily bars from the chart API, fundamentals from the quote API.

use {
    anyhow::{Context, anyhow, bail},
    async_trait::async_trait,
    reqwest::Client,
    serde::Deserialize,
    std::{sync::Arc, time::Duration},
    tokio::sync::Mutex,
};

use crate::{
    config::{DF, Period, YAHOO, YahooApiConfig},
    data::{MarketDataSource, MarketSeries, RequestLimiter},
    domain::{Bar, IssuerInfo, Symbol, SymbolPeriod},
    error::{ForecastError, Result},
    utils::exchange_date,
};

#[derive(Debug, thiserror::Error)]
pub enum YahooError {
    #[error("Yahoo API error {code}: {description}")]
    Api { code: String, description: String },
    #[error("HTTP status {0}")]
    Http(u16),
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl YahooError {
    /// The quote API rejects calls whose crumb is missing or bound to an expired session.
    pub fn is_invalid_crumb(&self) -> bool {
        match self {
            YahooError::Api { description, .. } => description.eq_ignore_ascii_case("invalid crumb"),
            YahooError::Http(status) => *status == 401,
            YahooError::MalformedPayload(_) => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

impl From<ApiError> for YahooError {
    fn from(err: ApiError) -> Self {
        YahooError::Api {
            code: err.code,
            description: err.description,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChartMeta {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    /// Exchange offset from UTC in seconds
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

// Column-oriented OHLCV; any cell may be null (halted days, the still-forming bar)
#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

// Auth failures come back under "finance" instead of "quoteResponse"
#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: Option<QuoteResponse>,
    finance: Option<FinanceBody>,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<QuoteRow>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct FinanceBody {
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuoteRow {
    pub market_cap: Option<f64>,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    pub long_name: Option<String>,
}

fn cell(column: &[Option<f64>], idx: usize) -> Option<f64> {
    column.get(idx).copied().flatten().filter(|v| v.is_finite())
}

fn columns_to_bars(timestamps: &[i64], cols: &QuoteColumns, gmtoffset: i64) -> Vec<Bar> {
    timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            // A row without a close is useless to every consumer, so it is skipped rather than filled
            let close = cell(&cols.close, i)?;
            let date = exchange_date(ts, gmtoffset)?;
            Some(Bar::new(
                date,
                cell(&cols.open, i).unwrap_or(close),
                cell(&cols.high, i).unwrap_or(close),
                cell(&cols.low, i).unwrap_or(close),
                close,
                cell(&cols.volume, i).unwrap_or(0.0).max(0.0) as u64,
            ))
        })
        .collect()
}

/// Decodes a chart response body into bars (unsorted, possibly empty) and metadata.
pub(crate) fn parse_chart(body: &str) -> anyhow::Result<(Vec<Bar>, ChartMeta)> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| anyhow::Error::new(YahooError::MalformedPayload(e.to_string())))?;

    if let Some(err) = envelope.chart.error {
        return Err(anyhow::Error::new(YahooError::from(err)));
    }

    let result = envelope
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
        .ok_or_else(|| anyhow!(YahooError::MalformedPayload("chart.result is empty".into())))?;

    let columns = result.indicators.quote.into_iter().next().unwrap_or_default();
    let bars = columns_to_bars(&result.timestamp, &columns, result.meta.gmtoffset);
    Ok((bars, result.meta))
}

pub(crate) fn parse_quote(body: &str) -> anyhow::Result<QuoteRow> {
    let QuoteEnvelope {
        quote_response,
        finance,
    } = serde_json::from_str(body)
        .map_err(|e| anyhow::Error::new(YahooError::MalformedPayload(e.to_string())))?;

    if let Some(err) = finance.and_then(|f| f.error) {
        return Err(anyhow::Error::new(YahooError::from(err)));
    }
    let response = quote_response
        .ok_or_else(|| anyhow!(YahooError::MalformedPayload("quoteResponse is missing".into())))?;
    if let Some(err) = response.error {
        return Err(anyhow::Error::new(YahooError::from(err)));
    }
    response
        .result
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("quote response has no rows"))
}

/// The crumb endpoint answers with the bare token as plain text.
pub(crate) fn parse_crumb(status: u16, body: &str) -> anyhow::Result<String> {
    if !(200..300).contains(&status) {
        bail!(YahooError::Http(status));
    }
    let crumb = body.trim();
    if crumb.is_empty() || crumb.starts_with(['<', '{']) || crumb.contains(char::is_whitespace) {
        let head: String = crumb.chars().take(40).collect();
        bail!(YahooError::MalformedPayload(format!("unexpected crumb body '{}'", head)));
    }
    Ok(crumb.to_string())
}

fn is_api_error(e: &anyhow::Error) -> bool {
    matches!(e.downcast_ref::<YahooError>(), Some(YahooError::Api { .. }))
}

fn configure_yahoo_client() -> anyhow::Result<Client> {
    let config = YahooApiConfig::default();
    let client = Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .user_agent(config.user_agent)
        .cookie_store(true)
        .build()
        .context("failed to build HTTP client")?;
    Ok(client)
}

/// Market data from Yahoo Finance.
///
/// The quote API needs a session cookie plus a matching crumb. Both are
/// fetched lazily on the first quote call and shared by clones; a crumb the
/// API rejects is dropped so the next request starts a fresh session.
#[derive(Clone)]
pub struct YahooSource {
    client: Client,
    limiter: RequestLimiter,
    crumb: Arc<Mutex<Option<String>>>,
}

impl YahooSource {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_limiter(RequestLimiter::new(YAHOO.limits.requests_per_minute))
    }

    pub fn with_limiter(limiter: RequestLimiter) -> anyhow::Result<Self> {
        Ok(Self {
            client: configure_yahoo_client()?,
            limiter,
            crumb: Arc::new(Mutex::new(None)),
        })
    }

    async fn fetch_chart(&self, target: &SymbolPeriod) -> anyhow::Result<(Vec<Bar>, ChartMeta)> {
        self.limiter
            .acquire(YAHOO.limits.chart_call_weight, target.symbol.as_str())
            .await;

        let url = format!("{}/{}", YAHOO.endpoints.chart_base_url, target.symbol);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("range", target.period.as_str()),
                ("interval", YAHOO.endpoints.interval),
                ("includePrePost", "false"),
            ])
            .send()
            .await
            .with_context(|| format!("chart request failed for {}", target))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("reading chart body failed for {}", target))?;

        // Yahoo reports unknown symbols as a 404 with a JSON error body, so parse before checking status
        match parse_chart(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) if is_api_error(&e) => Err(e.context(format!("chart lookup rejected for {}", target))),
            Err(e) if !status.is_success() => Err(anyhow::Error::new(YahooError::Http(status.as_u16()))
                .context(format!("chart request for {} returned {}", target, status))
                .context(e.to_string())),
            Err(e) => Err(e.context(format!("chart decode failed for {}", target))),
        }
    }

    async fn session_crumb(&self) -> anyhow::Result<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        self.limiter
            .acquire(YAHOO.limits.session_call_weight, "yahoo session")
            .await;

        // Usually a 404; only the Set-Cookie header matters
        self.client
            .get(YAHOO.endpoints.cookie_url)
            .send()
            .await
            .context("session cookie request failed")?;

        let response = self
            .client
            .get(YAHOO.endpoints.crumb_url)
            .send()
            .await
            .context("crumb request failed")?;
        let status = response.status();
        let body = response.text().await.context("reading crumb failed")?;
        let crumb = parse_crumb(status.as_u16(), &body)?;

        if DF.log_provider_requests {
            log::info!("yahoo: new session crumb acquired");
        }
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn fetch_quote(&self, symbol: &Symbol) -> anyhow::Result<QuoteRow> {
        let crumb = self.session_crumb().await?;

        self.limiter
            .acquire(YAHOO.limits.quote_call_weight, symbol.as_str())
            .await;

        let response = self
            .client
            .get(YAHOO.endpoints.quote_base_url)
            .query(&[("symbols", symbol.as_str()), ("crumb", crumb.as_str())])
            .send()
            .await
            .with_context(|| format!("quote request failed for {}", symbol))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("reading quote body failed for {}", symbol))?;

        match parse_quote(&body) {
            Ok(row) => Ok(row),
            Err(e) => {
                let rejected = status.as_u16() == 401
                    || e.downcast_ref::<YahooError>().is_some_and(YahooError::is_invalid_crumb);
                if rejected {
                    self.crumb.lock().await.take();
                }
                if is_api_error(&e) {
                    Err(e.context(format!("quote lookup rejected for {}", symbol)))
                } else if !status.is_success() {
                    Err(anyhow::Error::new(YahooError::Http(status.as_u16()))
                        .context(format!("quote request for {} returned {}", symbol, status))
                        .context(e.to_string()))
                } else {
                    Err(e.context(format!("quote decode failed for {}", symbol)))
                }
            }
        }
    }
}

#[async_trait]
impl MarketDataSource for YahooSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch(&self, symbol: &Symbol, period: Period) -> Result<MarketSeries> {
        let target = SymbolPeriod::new(symbol.clone(), period);

        let (bars, meta) = self.fetch_chart(&target).await.map_err(|e| {
            log::error!("{}: {:#}", target, e);
            ForecastError::data_unavailable(symbol.as_str(), format!("{:#}", e))
        })?;

        if DF.log_provider_requests {
            log::info!("{}: received {} daily bars", target, bars.len());
        }

        // Fundamentals are optional; a failed quote call never fails the request
        let quote = match self.fetch_quote(symbol).await {
            Ok(q) => q,
            Err(e) => {
                log::warn!("{}: fundamentals unavailable ({:#})", symbol, e);
                QuoteRow::default()
            }
        };

        let info = IssuerInfo {
            name: quote.long_name.or(meta.long_name).or(meta.short_name),
            market_cap: quote.market_cap,
            pe_ratio: quote.trailing_pe,
        };

        MarketSeries::new(symbol.clone(), bars, info)
    }
}
