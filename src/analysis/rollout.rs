// Autoregressive forecasting: each step's input contains the previous steps' outputs.

use std::collections::VecDeque;

use crate::error::{ForecastError, Result};

/// Fixed-capacity window of the most recent scaled values.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    buf: VecDeque<f64>,
    capacity: usize,
}

impl RollingWindow {
    /// Seeds with the last `capacity` values of `history`.
    pub fn seed(history: &[f64], capacity: usize) -> Result<Self> {
        if capacity == 0 || history.len() < capacity {
            return Err(ForecastError::InsufficientHistory {
                needed: capacity.max(1),
                got: history.len(),
            });
        }
        let buf = history[history.len() - capacity..].iter().copied().collect();
        Ok(Self { buf, capacity })
    }

    /// Appends `value` and evicts the oldest, returning it.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        self.buf.push_back(value);
        if self.buf.len() > self.capacity {
            self.buf.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.buf.iter().copied().collect()
    }
}

/// Runs `steps` one-step predictions, feeding each back into the window.
pub fn rollout<F>(window: &mut RollingWindow, steps: usize, mut predict: F) -> Result<Vec<f64>>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    let mut out = Vec::with_capacity(steps);
    for step in 0..steps {
        let next = predict(&window.to_vec())?;
        if !next.is_finite() {
            return Err(ForecastError::failure(format!(
                "non-finite prediction at rollout step {}",
                step + 1
            )));
        }
        window.push(next);
        out.push(next);
    }
    Ok(out)
}
