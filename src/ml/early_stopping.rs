/// Outcome of observing one epoch's training loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochVerdict {
    Improved,
    NoImprovement,
    Stop,
}

/// Stops training once the loss has not improved by more than `min_delta`
/// for `patience` consecutive epochs.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    min_delta: f64,
    best_loss: Option<f64>,
    best_epoch: usize,
    epochs_without_improvement: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize, min_delta: f64) -> Self {
        Self {
            patience,
            min_delta: min_delta.abs(),
            best_loss: None,
            best_epoch: 0,
            epochs_without_improvement: 0,
        }
    }

    fn is_improvement(&self, loss: f64) -> bool {
        match self.best_loss {
            None => true,
            Some(best) => loss < best - self.min_delta,
        }
    }

    pub fn observe(&mut self, epoch: usize, loss: f64) -> EpochVerdict {
        if self.is_improvement(loss) {
            self.best_loss = Some(loss);
            self.best_epoch = epoch;
            self.epochs_without_improvement = 0;
            return EpochVerdict::Improved;
        }

        self.epochs_without_improvement += 1;
        if self.epochs_without_improvement >= self.patience {
            log::debug!(
                "early stopping at epoch {} (best loss {:?} at epoch {})",
                epoch,
                self.best_loss,
                self.best_epoch
            );
            EpochVerdict::Stop
        } else {
            EpochVerdict::NoImprovement
        }
    }

    pub fn best_loss(&self) -> Option<f64> {
        self.best_loss
    }

    pub fn best_epoch(&self) -> usize {
        self.best_epoch
    }
}
