//! Technical indicator lookbacks and recommendation thresholds

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorConfig {
    pub ma_short: usize,
    pub ma_mid: usize,
    pub ma_long: usize,

    pub rsi_period: usize,
    /// RSI below this is oversold
    pub rsi_oversold: f64,
    /// RSI above this is overbought
    pub rsi_overbought: f64,
    /// Stand-in RSI when the lookback is not satisfied
    pub rsi_neutral: f64,

    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,

    pub bollinger_period: usize,
    pub bollinger_k: f64,
}

pub const INDICATORS: IndicatorConfig = IndicatorConfig {
    ma_short: 10,
    ma_mid: 50,
    ma_long: 200,
    rsi_period: 14,
    rsi_oversold: 30.0,
    rsi_overbought: 70.0,
    rsi_neutral: 50.0,
    macd_fast: 12,
    macd_slow: 26,
    macd_signal: 9,
    bollinger_period: 20,
    bollinger_k: 2.0,
};

impl Default for IndicatorConfig {
    fn default() -> Self {
        INDICATORS
    }
}
