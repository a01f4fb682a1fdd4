//! Adam optimizer.
//!
//! ```text
//! m = beta1 * m + (1 - beta1) * g
//! v = beta2 * v + (1 - beta2) * g^2
//! m_hat = m / (1 - beta1^t)
//! v_hat = v / (1 - beta2^t)
//! w = w - lr * m_hat / (sqrt(v_hat) + epsilon)
//! ```

use crate::config::ModelConfig;
use crate::ml::tensor::Param;

#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    /// First moment per tensor
    m: Vec<Vec<f64>>,
    /// Second moment per tensor
    v: Vec<Vec<f64>>,
    t: u64,
}

impl Adam {
    pub fn new(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m: Vec::new(),
            v: Vec::new(),
            t: 0,
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(
            config.learning_rate,
            config.beta1,
            config.beta2,
            config.epsilon,
        )
    }

    pub fn timestep(&self) -> u64 {
        self.t
    }

    /// One update over every tensor. `params` and `grads` must line up, in the same order every call.
    pub fn step<'a>(&mut self, params: impl IntoIterator<Item = &'a mut Param>, grads: &[&Param]) {
        self.t += 1;
        let bias_correction1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias_correction2 = 1.0 - self.beta2.powi(self.t as i32);

        for (idx, (param, grad)) in params.into_iter().zip(grads).enumerate() {
            if self.m.len() <= idx {
                self.m.push(vec![0.0; param.len()]);
                self.v.push(vec![0.0; param.len()]);
            }
            let (m, v) = (&mut self.m[idx], &mut self.v[idx]);

            for (k, (w, g)) in param.data.iter_mut().zip(&grad.data).enumerate() {
                m[k] = self.beta1 * m[k] + (1.0 - self.beta1) * g;
                v[k] = self.beta2 * v[k] + (1.0 - self.beta2) * g * g;

                let m_hat = m[k] / bias_correction1;
                let v_hat = v[k] / bias_correction2;
                *w -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
            }
        }
    }
}
