//! Min-max scaling of a close series and supervised window construction.
//!
//! The range is fitted over the whole series, held-out tail included, so the
//! evaluation split sees a scaler that already knows its extremes.

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::utils::remap;

/// Fitted min-max range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerState {
    pub min: f64,
    pub max: f64,
}

impl ScalerState {
    pub fn fit(values: &[f64]) -> Option<Self> {
        let (min, max) = values.iter().fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
        Some(Self { min, max })
    }

    /// Maps into [0, 1]. A flat series maps to 0.
    #[inline]
    pub fn scale(&self, x: f64) -> f64 {
        remap(x, self.min, self.max, 0.0, 1.0)
    }

    #[inline]
    pub fn unscale(&self, y: f64) -> f64 {
        y * (self.max - self.min) + self.min
    }
}

/// Model inputs and their next-step targets, in chronological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceSet {
    pub windows: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

impl SequenceSet {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Splits at `ratio` by index without shuffling, so every test window follows every train window.
    pub fn split(self, ratio: f64) -> Result<(SequenceSet, SequenceSet)> {
        let total = self.len();
        let cut = ((total as f64) * ratio) as usize;
        if cut == 0 || cut >= total {
            return Err(ForecastError::InsufficientHistory {
                needed: 2,
                got: total,
            });
        }

        let mut windows = self.windows;
        let mut targets = self.targets;
        let test = SequenceSet {
            windows: windows.split_off(cut),
            targets: targets.split_off(cut),
        };
        Ok((SequenceSet { windows, targets }, test))
    }
}

/// Scales closes and cuts them into fixed-length windows.
#[derive(Debug, Clone, Copy)]
pub struct SequenceScaler {
    window_len: usize,
}

impl SequenceScaler {
    pub fn new(window_len: usize) -> Self {
        Self {
            window_len: window_len.max(1),
        }
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// Fits the range over `closes` and returns the scaled series.
    pub fn fit_transform(&self, closes: &[f64]) -> Result<(Vec<f64>, ScalerState)> {
        let needed = self.window_len + 1;
        if closes.len() < needed {
            return Err(ForecastError::InsufficientHistory {
                needed,
                got: closes.len(),
            });
        }
        let state = ScalerState::fit(closes).ok_or_else(|| ForecastError::failure("empty close series"))?;
        let scaled = closes.iter().map(|&x| state.scale(x)).collect();
        Ok((scaled, state))
    }

    pub fn inverse(state: &ScalerState, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&y| state.unscale(y)).collect()
    }

    /// One (window, next value) pair per offset: `len - window_len` pairs.
    pub fn build_sequences(&self, scaled: &[f64]) -> SequenceSet {
        let l = self.window_len;
        if scaled.len() <= l {
            return SequenceSet::default();
        }
        let (windows, targets) = scaled
            .windows(l + 1)
            .map(|w| (w[..l].to_vec(), w[l]))
            .unzip();
        SequenceSet { windows, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn series(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect()
    }

    #[test]
    fn short_series_is_insufficient() {
        let scaler = SequenceScaler::new(60);
        let err = scaler.fit_transform(&series(60)).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientHistory { needed: 61, got: 60 }
        ));
    }

    #[test]
    fn scaled_range_is_unit() {
        let (scaled, state) = SequenceScaler::new(5).fit_transform(&series(50)).unwrap();
        assert!(scaled.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(state.min < state.max);
    }

    #[test]
    fn flat_series_scales_to_zero_and_back() {
        let state = ScalerState::fit(&[7.0; 10]).unwrap();
        assert_eq!(state.scale(7.0), 0.0);
        assert_eq!(state.unscale(0.0), 7.0);
    }

    #[test]
    fn sequences_follow_windows() {
        let scaler = SequenceScaler::new(3);
        let set = scaler.build_sequences(&[0.0, 0.1, 0.2, 0.3, 0.4]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.windows[1], vec![0.1, 0.2, 0.3]);
        assert_eq!(set.targets, vec![0.3, 0.4]);
    }

    #[test]
    fn split_keeps_time_order() {
        let scaler = SequenceScaler::new(2);
        let scaled: Vec<f64> = (0..12).map(|i| i as f64 / 11.0).collect();
        let (train, test) = scaler.build_sequences(&scaled).split(0.8).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
        let last_train = *train.targets.last().unwrap();
        assert!(test.targets.iter().all(|&t| t > last_train));
    }

    #[test]
    fn split_needs_both_sides() {
        let set = SequenceScaler::new(2).build_sequences(&[0.0, 0.5, 1.0]);
        assert!(matches!(
            set.split(0.8),
            Err(ForecastError::InsufficientHistory { .. })
        ));
    }

    #[quickcheck]
    fn prop_unscale_inverts_scale(raw: Vec<u32>) -> bool {
        let values: Vec<f64> = raw.iter().map(|&v| 1.0 + v as f64 / 100.0).collect();
        let Some(state) = ScalerState::fit(&values) else {
            return true;
        };
        values.iter().all(|&x| {
            let back = state.unscale(state.scale(x));
            (back - x).abs() <= 1e-9 * x.abs().max(1.0)
        })
    }

    #[quickcheck]
    fn prop_sequence_count(len: u8, window: u8) -> bool {
        let n = len as usize;
        let l = (window % 20) as usize + 1;
        let scaled: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let set = SequenceScaler::new(l).build_sequences(&scaled);
        let expected = n.saturating_sub(l);
        set.len() == expected
            && set.windows.iter().all(|w| w.len() == l)
            && set
                .targets
                .iter()
                .enumerate()
                .all(|(i, &t)| t == scaled[i + l])
    }
}
