//! Request-scoped forecast model: built untrained, trained once, then used
//! for held-out evaluation and autoregressive forecasting.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use strum_macros::Display;

use crate::analysis::{
    Metrics, MetricsEvaluator, RollingWindow, ScalerState, SequenceScaler, SequenceSet, rollout,
};
use crate::config::{DF, ModelConfig};
use crate::error::{ForecastError, Result};
use crate::ml::adam::Adam;
use crate::ml::early_stopping::{EarlyStopping, EpochVerdict};
use crate::ml::network::{Gradients, StackedLstm};
use crate::utils::all_finite;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ModelState {
    Untrained,
    Training,
    Trained,
    Evaluating,
    Forecasting,
}

/// How a training run went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_samples: usize,
    pub epochs_run: usize,
    /// 1-based epoch whose weights were kept
    pub best_epoch: usize,
    pub best_loss: f64,
    pub final_loss: f64,
    pub stopped_early: bool,
    pub elapsed_ms: u64,
    pub loss_history: Vec<f64>,
}

/// Held-out predictions and their scores, in price units.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub metrics: Metrics,
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
}

pub struct ForecastModel {
    config: ModelConfig,
    window_len: usize,
    network: StackedLstm,
    state: ModelState,
    rng: StdRng,
    report: Option<TrainingReport>,
}

impl ForecastModel {
    /// Builds a freshly initialised network. Unseeded configs draw from OS entropy.
    pub fn new(config: ModelConfig, window_len: usize) -> Result<Self> {
        config.validate()?;
        if window_len == 0 {
            return Err(ForecastError::InvalidRequest("window length must be positive".into()));
        }
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let network = StackedLstm::new(&config, &mut rng);
        Ok(Self {
            config,
            window_len,
            network,
            state: ModelState::Untrained,
            rng,
            report: None,
        })
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn report(&self) -> Option<&TrainingReport> {
        self.report.as_ref()
    }

    fn is_trained(&self) -> bool {
        matches!(
            self.state,
            ModelState::Trained | ModelState::Evaluating | ModelState::Forecasting
        )
    }

    fn check_windows(&self, windows: &[Vec<f64>]) -> Result<()> {
        match windows.iter().find(|w| w.len() != self.window_len) {
            Some(bad) => Err(ForecastError::failure(format!(
                "input window has {} steps, model expects {}",
                bad.len(),
                self.window_len
            ))),
            None => Ok(()),
        }
    }

    /// Mini-batch Adam on shuffled samples with early stopping on the epoch loss.
    /// The best epoch's weights are restored at the end.
    pub fn train(&mut self, train: &SequenceSet) -> Result<&TrainingReport> {
        if self.state != ModelState::Untrained {
            return Err(ForecastError::failure(format!(
                "cannot train a model in state {}",
                self.state
            )));
        }
        if train.is_empty() {
            return Err(ForecastError::InsufficientHistory { needed: 1, got: 0 });
        }
        self.check_windows(&train.windows)?;
        self.state = ModelState::Training;

        let start = Instant::now();
        let n = train.len();
        let mut adam = Adam::from_config(&self.config);
        let mut stopper = EarlyStopping::new(self.config.patience, self.config.min_delta);
        let mut best_network = self.network.clone();
        let mut order: Vec<usize> = (0..n).collect();
        let mut loss_history = Vec::with_capacity(self.config.epochs);
        let mut stopped_early = false;

        for epoch in 1..=self.config.epochs {
            order.shuffle(&mut self.rng);
            let mut epoch_loss = 0.0;

            for batch in order.chunks(self.config.batch_size) {
                let seeds: Vec<u64> = batch.iter().map(|_| self.rng.random()).collect();
                let network = &self.network;

                // Samples run in parallel, but gradients are summed in batch order so a seeded run is reproducible
                let per_sample: Vec<(f64, Gradients)> = batch
                    .par_iter()
                    .zip(seeds.par_iter())
                    .map(|(&idx, &seed)| {
                        let mut rng = StdRng::seed_from_u64(seed);
                        network.sample_gradients(&train.windows[idx], train.targets[idx], &mut rng)
                    })
                    .collect();

                let mut total = Gradients::zeros_for(network);
                let mut batch_loss = 0.0;
                for (loss, grads) in &per_sample {
                    batch_loss += loss;
                    total.add_assign(grads);
                }
                total.scale(1.0 / batch.len() as f64);

                if !batch_loss.is_finite() || !total.is_finite() {
                    return Err(ForecastError::failure(format!(
                        "non-finite loss in epoch {}",
                        epoch
                    )));
                }
                adam.step(self.network.params_mut(), &total.tensors());
                epoch_loss += batch_loss;
            }

            epoch_loss /= n as f64;
            loss_history.push(epoch_loss);
            if DF.log_training_epochs {
                log::info!(
                    "epoch {}/{} loss {:.6}",
                    epoch,
                    self.config.epochs,
                    epoch_loss
                );
            }

            match stopper.observe(epoch, epoch_loss) {
                EpochVerdict::Improved => best_network = self.network.clone(),
                EpochVerdict::NoImprovement => {}
                EpochVerdict::Stop => {
                    stopped_early = true;
                    break;
                }
            }
        }

        self.network = best_network;
        self.state = ModelState::Trained;

        let report = TrainingReport {
            train_samples: n,
            epochs_run: loss_history.len(),
            best_epoch: stopper.best_epoch(),
            best_loss: stopper.best_loss().unwrap_or(f64::NAN),
            final_loss: loss_history.last().copied().unwrap_or(f64::NAN),
            stopped_early,
            elapsed_ms: start.elapsed().as_millis() as u64,
            loss_history,
        };
        log::debug!(
            "trained on {} samples: {} epochs, best loss {:.6} at epoch {}",
            report.train_samples,
            report.epochs_run,
            report.best_loss,
            report.best_epoch
        );
        Ok(&*self.report.insert(report))
    }

    /// Scaled one-step predictions for each window.
    pub fn predict(&self, windows: &[Vec<f64>]) -> Result<Vec<f64>> {
        if !self.is_trained() {
            return Err(ForecastError::failure(format!(
                "cannot predict with a model in state {}",
                self.state
            )));
        }
        self.check_windows(windows)?;

        let predictions: Vec<f64> = windows.par_iter().map(|w| self.network.predict(w)).collect();
        if !all_finite(&predictions) {
            return Err(ForecastError::failure("non-finite prediction"));
        }
        Ok(predictions)
    }

    /// Scores the held-out split in price units.
    pub fn evaluate(&mut self, test: &SequenceSet, scaler: &ScalerState) -> Result<Evaluation> {
        let scaled = self.predict(&test.windows)?;
        self.state = ModelState::Evaluating;

        let actual = SequenceScaler::inverse(scaler, &test.targets);
        let predicted = SequenceScaler::inverse(scaler, &scaled);
        let metrics = MetricsEvaluator::evaluate(&actual, &predicted)?;
        Ok(Evaluation {
            metrics,
            actual,
            predicted,
        })
    }

    /// Rolls `steps` predictions forward from the last window of `scaled_series`,
    /// feeding each prediction back as input, and unscales them at the end.
    pub fn forecast(
        &mut self,
        scaled_series: &[f64],
        steps: usize,
        scaler: &ScalerState,
    ) -> Result<Vec<f64>> {
        if !self.is_trained() {
            return Err(ForecastError::failure(format!(
                "cannot forecast with a model in state {}",
                self.state
            )));
        }
        self.state = ModelState::Forecasting;

        let mut window = RollingWindow::seed(scaled_series, self.window_len)?;
        let network = &self.network;
        let scaled = rollout(&mut window, steps, |w| {
            let next = network.predict(w);
            if DF.log_rollout_steps {
                log::debug!("rollout step -> {:.6}", next);
            }
            Ok(next)
        })?;
        Ok(SequenceScaler::inverse(scaler, &scaled))
    }
}
