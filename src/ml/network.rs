//! Stacked recurrent regressor: LSTM layers (all but the last returning full
//! sequences) each followed by dropout, then a dense hidden layer and a scalar output.

use rand::Rng;

use crate::config::ModelConfig;
use crate::ml::dense::Dense;
use crate::ml::dropout::{apply_mask, dropout_mask};
use crate::ml::lstm::{LstmLayer, LstmTrace};
use crate::ml::tensor::Param;

#[derive(Debug, Clone, PartialEq)]
pub struct StackedLstm {
    lstms: Vec<LstmLayer>,
    hidden: Dense,
    output: Dense,
    dropout: f64,
}

/// Gradients shaped like the network's parameters.
#[derive(Debug, Clone)]
pub struct Gradients {
    lstms: Vec<[Param; 3]>,
    hidden: [Param; 2],
    output: [Param; 2],
}

impl Gradients {
    pub fn zeros_for(net: &StackedLstm) -> Self {
        Self {
            lstms: net
                .lstms
                .iter()
                .map(|l| l.params().map(Param::zeros_like))
                .collect(),
            hidden: net.hidden.params().map(Param::zeros_like),
            output: net.output.params().map(Param::zeros_like),
        }
    }

    pub fn add_assign(&mut self, other: &Gradients) {
        for (a, b) in self.tensors_mut().into_iter().zip(other.tensors()) {
            a.add_assign(b);
        }
    }

    pub fn scale(&mut self, factor: f64) {
        self.tensors_mut().into_iter().for_each(|t| t.scale(factor));
    }

    /// Same order as `StackedLstm::params_mut`.
    pub fn tensors(&self) -> Vec<&Param> {
        self.lstms
            .iter()
            .flat_map(|g| g.iter())
            .chain(self.hidden.iter())
            .chain(self.output.iter())
            .collect()
    }

    fn tensors_mut(&mut self) -> Vec<&mut Param> {
        self.lstms
            .iter_mut()
            .flat_map(|g| g.iter_mut())
            .chain(self.hidden.iter_mut())
            .chain(self.output.iter_mut())
            .collect()
    }

    pub fn is_finite(&self) -> bool {
        self.tensors().iter().all(|t| t.is_finite())
    }
}

/// Everything one training sample leaves behind for its backward pass.
struct SampleTrace {
    lstm: Vec<LstmTrace>,
    /// Dropout masks per recurrent layer, one per output step
    masks: Vec<Vec<Vec<f64>>>,
    /// Input to the hidden dense layer (last recurrent output after dropout)
    features: Vec<f64>,
    hidden_out: Vec<f64>,
    prediction: f64,
}

impl StackedLstm {
    pub fn new<R: Rng + ?Sized>(config: &ModelConfig, rng: &mut R) -> Self {
        let mut lstms = Vec::with_capacity(config.lstm_layers);
        let mut input_dim = 1;
        for _ in 0..config.lstm_layers {
            lstms.push(LstmLayer::new(input_dim, config.lstm_units, rng));
            input_dim = config.lstm_units;
        }
        Self {
            lstms,
            hidden: Dense::new(config.lstm_units, config.dense_units, rng),
            output: Dense::new(config.dense_units, 1, rng),
            dropout: config.dropout,
        }
    }

    pub fn depth(&self) -> usize {
        self.lstms.len()
    }

    pub fn parameter_count(&self) -> usize {
        self.params().iter().map(|p| p.len()).sum()
    }

    pub fn params(&self) -> Vec<&Param> {
        self.lstms
            .iter()
            .flat_map(|l| l.params())
            .chain(self.hidden.params())
            .chain(self.output.params())
            .collect()
    }

    pub fn params_mut(&mut self) -> Vec<&mut Param> {
        self.lstms
            .iter_mut()
            .flat_map(|l| l.params_mut())
            .chain(self.hidden.params_mut())
            .chain(self.output.params_mut())
            .collect()
    }

    fn as_steps(window: &[f64]) -> Vec<Vec<f64>> {
        window.iter().map(|&v| vec![v]).collect()
    }

    /// Deterministic prediction for one window (no dropout).
    pub fn predict(&self, window: &[f64]) -> f64 {
        let mut seq = Self::as_steps(window);
        let last = self.lstms.len() - 1;
        for (k, layer) in self.lstms.iter().enumerate() {
            seq = layer.infer(&seq, k < last);
        }
        let features = seq.pop().unwrap_or_default();
        self.output.forward(&self.hidden.forward(&features))[0]
    }

    fn forward_train<R: Rng + ?Sized>(&self, window: &[f64], rng: &mut R) -> SampleTrace {
        let mut seq = Self::as_steps(window);
        let last = self.lstms.len() - 1;
        let mut traces = Vec::with_capacity(self.lstms.len());
        let mut masks = Vec::with_capacity(self.lstms.len());

        for (k, layer) in self.lstms.iter().enumerate() {
            let trace = layer.forward(&seq);
            let mut out = if k < last {
                trace.outputs().to_vec()
            } else {
                vec![trace.last_output().to_vec()]
            };
            let layer_masks: Vec<Vec<f64>> = out
                .iter_mut()
                .map(|h| {
                    let mask = dropout_mask(h.len(), self.dropout, rng);
                    apply_mask(h, &mask);
                    mask
                })
                .collect();
            traces.push(trace);
            masks.push(layer_masks);
            seq = out;
        }

        let features = seq.pop().unwrap_or_default();
        let hidden_out = self.hidden.forward(&features);
        let prediction = self.output.forward(&hidden_out)[0];
        SampleTrace {
            lstm: traces,
            masks,
            features,
            hidden_out,
            prediction,
        }
    }

    /// Squared error of one sample and its gradients (unscaled by batch size).
    pub fn sample_gradients<R: Rng + ?Sized>(
        &self,
        window: &[f64],
        target: f64,
        rng: &mut R,
    ) -> (f64, Gradients) {
        let trace = self.forward_train(window, rng);
        let err = trace.prediction - target;
        let mut grads = Gradients::zeros_for(self);

        let d_hidden_out = self
            .output
            .backward(&trace.hidden_out, &[2.0 * err], &mut grads.output);
        let d_features = self
            .hidden
            .backward(&trace.features, &d_hidden_out, &mut grads.hidden);

        let steps = window.len();
        let last = self.lstms.len() - 1;
        // Gradient w.r.t. the (post-dropout) outputs of the layer being unwound
        let mut d_out: Vec<Vec<f64>> = vec![d_features];

        for k in (0..=last).rev() {
            let layer = &self.lstms[k];
            for (d, mask) in d_out.iter_mut().zip(&trace.masks[k]) {
                apply_mask(d, mask);
            }
            let d_hidden = if k == last {
                let mut d = vec![vec![0.0; layer.units()]; steps];
                d[steps - 1] = d_out.pop().unwrap_or_default();
                d
            } else {
                d_out
            };
            d_out = layer.backward(&trace.lstm[k], &d_hidden, &mut grads.lstms[k]);
        }

        (err * err, grads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MODEL;
    use rand::{SeedableRng, rngs::StdRng};

    fn tiny() -> ModelConfig {
        ModelConfig {
            lstm_units: 4,
            lstm_layers: 2,
            dense_units: 3,
            dropout: 0.0,
            ..MODEL
        }
    }

    fn window() -> Vec<f64> {
        vec![0.1, 0.3, 0.2, 0.5, 0.4]
    }

    #[test]
    fn shapes() {
        let net = StackedLstm::new(&MODEL, &mut StdRng::seed_from_u64(0));
        assert_eq!(net.depth(), 3);
        // 4H(D + H + 1) per LSTM, then 50*25+25 and 25+1
        let expected = 200 * (1 + 50 + 1) + 2 * 200 * (50 + 50 + 1) + 50 * 25 + 25 + 25 + 1;
        assert_eq!(net.parameter_count(), expected);
        assert_eq!(net.params().len(), Gradients::zeros_for(&net).tensors().len());
    }

    #[test]
    fn training_forward_without_dropout_matches_predict() {
        let net = StackedLstm::new(&tiny(), &mut StdRng::seed_from_u64(5));
        let mut rng = StdRng::seed_from_u64(9);
        let trace = net.forward_train(&window(), &mut rng);
        assert!((trace.prediction - net.predict(&window())).abs() < 1e-12);
    }

    #[test]
    fn gradients_match_finite_differences() {
        let net = StackedLstm::new(&tiny(), &mut StdRng::seed_from_u64(5));
        let target = 0.7;
        let (_, grads) = net.sample_gradients(&window(), target, &mut StdRng::seed_from_u64(1));
        let analytic: Vec<Param> = grads.tensors().into_iter().cloned().collect();

        let loss = |n: &StackedLstm| (n.predict(&window()) - target).powi(2);
        let eps = 1e-6;
        for (p_idx, grad) in analytic.iter().enumerate() {
            let j = grad.len() / 3;
            let mut plus = net.clone();
            plus.params_mut()[p_idx].data[j] += eps;
            let mut minus = net.clone();
            minus.params_mut()[p_idx].data[j] -= eps;
            let numeric = (loss(&plus) - loss(&minus)) / (2.0 * eps);
            assert!(
                (numeric - grad.data[j]).abs() < 1e-5,
                "tensor {}: numeric {} analytic {}",
                p_idx,
                numeric,
                grad.data[j]
            );
        }
    }

    #[test]
    fn dropout_changes_training_output_only() {
        let cfg = ModelConfig {
            dropout: 0.5,
            ..tiny()
        };
        let net = StackedLstm::new(&cfg, &mut StdRng::seed_from_u64(5));
        let a = net.predict(&window());
        assert_eq!(a, net.predict(&window()));
        let (loss, grads) = net.sample_gradients(&window(), 0.0, &mut StdRng::seed_from_u64(2));
        assert!(loss.is_finite());
        assert!(grads.is_finite());
    }
}
