//! Recurrent model hyperparameters

use serde::{Deserialize, Serialize};

/// Shape and training schedule of the forecast network.
///
/// `MODEL` holds the production values. Tests build narrower networks with
/// fewer epochs through struct update syntax:
///
/// ```
/// use stock_forecast::config::{MODEL, ModelConfig};
///
/// let quick = ModelConfig { lstm_units: 8, epochs: 2, seed: Some(7), ..MODEL };
/// assert_eq!(quick.batch_size, 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Width of each recurrent layer
    pub lstm_units: usize,
    /// Number of stacked recurrent layers (all but the last return full sequences)
    pub lstm_layers: usize,
    /// Dropout probability after every recurrent layer
    pub dropout: f64,
    /// Width of the dense layer between the recurrent stack and the scalar output
    pub dense_units: usize,

    pub epochs: usize,
    pub batch_size: usize,
    /// Epochs without training-loss improvement before stopping
    pub patience: usize,
    pub min_delta: f64,

    // Adam
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,

    /// Fixed seed for weight init, dropout masks and shuffling. None = fresh entropy per request.
    pub seed: Option<u64>,
}

pub const MODEL: ModelConfig = ModelConfig {
    lstm_units: 50,
    lstm_layers: 3,
    dropout: 0.2,
    dense_units: 25,
    epochs: 50,
    batch_size: 32,
    patience: 10,
    min_delta: 0.0,
    learning_rate: 0.001,
    beta1: 0.9,
    beta2: 0.999,
    epsilon: 1e-7,
    seed: None,
};

impl Default for ModelConfig {
    fn default() -> Self {
        MODEL
    }
}

impl ModelConfig {
    /// Rejects shapes and schedules the network cannot be built or trained with.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ForecastError::InvalidRequest;

        if self.lstm_units == 0 || self.lstm_layers == 0 || self.dense_units == 0 {
            return Err(InvalidRequest("model layers must have at least one unit".into()));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(InvalidRequest(format!("dropout {} not in [0, 1)", self.dropout)));
        }
        if self.epochs == 0 || self.batch_size == 0 {
            return Err(InvalidRequest("epochs and batch_size must be positive".into()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(InvalidRequest(format!(
                "learning rate {} must be positive",
                self.learning_rate
            )));
        }
        Ok(())
    }
}
