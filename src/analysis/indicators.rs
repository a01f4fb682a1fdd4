// Technical indicators over a daily close series.
// Every series is index-aligned with its input; `None` marks bars before the lookback is satisfied.

use itertools::izip;

use crate::config::IndicatorConfig;
use crate::domain::{Bar, closes};
use crate::models::IndicatorSnapshot;
use crate::utils::mean_and_stddev;

/// Simple moving average over the trailing `period` values.
pub fn sma_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let mut sum: f64 = values[..period].iter().sum();
    out[period - 1] = Some(sum / period as f64);
    for i in period..values.len() {
        sum += values[i] - values[i - period];
        out[i] = Some(sum / period as f64);
    }
    out
}

/// Exponential moving average, seeded with the SMA of the first `period` values.
pub fn ema_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut ema = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(ema);
    for (i, price) in values.iter().enumerate().skip(period) {
        ema = (price - ema) * multiplier + ema;
        out[i] = Some(ema);
    }
    out
}

/// EMA of a partially defined series: applied to the values from the first defined index on.
fn ema_of_defined(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let Some(start) = series.iter().position(Option::is_some) else {
        return vec![None; series.len()];
    };
    let tail: Vec<f64> = series[start..].iter().map_while(|v| *v).collect();

    let mut out = vec![None; start];
    out.extend(ema_series(&tail, period));
    out.resize(series.len(), None);
    out
}

/// Wilder's RSI. Needs `period + 1` values; the first defined value sits at index `period`.
/// A series with no moves at all reads 50, one without losses reads 100.
pub fn rsi_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period + 1 {
        return out;
    }

    let p = period as f64;
    let changes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let split = |change: f64| if change > 0.0 { (change, 0.0) } else { (0.0, -change) };

    let (mut avg_gain, mut avg_loss) = changes[..period]
        .iter()
        .map(|&c| split(c))
        .fold((0.0, 0.0), |(g, l), (gain, loss)| (g + gain, l + loss));
    avg_gain /= p;
    avg_loss /= p;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    for (i, &change) in changes.iter().enumerate().skip(period) {
        let (gain, loss) = split(change);
        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
        // changes[i] moves values[i] -> values[i + 1]
        out[i + 1] = Some(rsi_value(avg_gain, avg_loss));
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }
}

/// MACD line, signal line and histogram.
pub struct MacdSeries {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

pub fn macd_series(values: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let fast_ema = ema_series(values, fast);
    let slow_ema = ema_series(values, slow);

    let macd: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = ema_of_defined(&macd, signal);
    let histogram = macd
        .iter()
        .zip(&signal)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    MacdSeries {
        macd,
        signal,
        histogram,
    }
}

/// Bollinger bands as (upper, middle, lower), using the population standard deviation.
pub fn bollinger_series(values: &[f64], period: usize, k: f64) -> Vec<Option<(f64, f64, f64)>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    for (end, window) in (period - 1..).zip(values.windows(period)) {
        let (mean, std_dev) = mean_and_stddev(window);
        out[end] = Some((mean + k * std_dev, mean, mean - k * std_dev));
    }
    out
}

/// Derives per-bar indicator snapshots from a bar series.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// One snapshot per bar, aligned by index.
    pub fn derive(&self, bars: &[Bar]) -> Vec<IndicatorSnapshot> {
        let c = &self.config;
        let prices = closes(bars);

        let ma10 = sma_series(&prices, c.ma_short);
        let ma50 = sma_series(&prices, c.ma_mid);
        let ma200 = sma_series(&prices, c.ma_long);
        let rsi = rsi_series(&prices, c.rsi_period);
        let macd = macd_series(&prices, c.macd_fast, c.macd_slow, c.macd_signal);
        let bands = bollinger_series(&prices, c.bollinger_period, c.bollinger_k);

        izip!(
            ma10,
            ma50,
            ma200,
            rsi,
            macd.macd,
            macd.signal,
            macd.histogram,
            bands
        )
        .map(
            |(ma10, ma50, ma200, rsi, macd, macd_signal, macd_histogram, band)| IndicatorSnapshot {
                ma10,
                ma50,
                ma200,
                rsi,
                macd,
                macd_signal,
                macd_histogram,
                bb_upper: band.map(|b| b.0),
                bb_middle: band.map(|b| b.1),
                bb_lower: band.map(|b| b.2),
            },
        )
        .collect()
    }

    /// Snapshot at the newest bar. Empty input gives an all-undefined snapshot.
    pub fn latest(&self, bars: &[Bar]) -> IndicatorSnapshot {
        self.derive(bars).pop().unwrap_or_default()
    }
}
