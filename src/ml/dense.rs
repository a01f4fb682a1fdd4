use rand::Rng;

use crate::ml::tensor::{Param, mat_vec_acc, outer_acc, vec_mat_acc};

/// Fully connected layer with a linear activation: `y = x·W + b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense {
    weight: Param,
    bias: Param,
}

impl Dense {
    pub fn new<R: Rng + ?Sized>(input_dim: usize, output_dim: usize, rng: &mut R) -> Self {
        Self {
            weight: Param::glorot_uniform(input_dim, output_dim, rng),
            bias: Param::zeros(1, output_dim),
        }
    }

    pub fn input_dim(&self) -> usize {
        self.weight.rows
    }

    pub fn output_dim(&self) -> usize {
        self.weight.cols
    }

    pub fn params(&self) -> [&Param; 2] {
        [&self.weight, &self.bias]
    }

    pub fn params_mut(&mut self) -> [&mut Param; 2] {
        [&mut self.weight, &mut self.bias]
    }

    pub fn forward(&self, x: &[f64]) -> Vec<f64> {
        let mut y = self.bias.data.clone();
        vec_mat_acc(x, &self.weight, &mut y);
        y
    }

    /// Accumulates parameter gradients and returns the gradient w.r.t. `x`.
    pub fn backward(&self, x: &[f64], dy: &[f64], grads: &mut [Param; 2]) -> Vec<f64> {
        let [d_weight, d_bias] = grads;
        outer_acc(x, dy, d_weight);
        for (b, d) in d_bias.data.iter_mut().zip(dy) {
            *b += d;
        }
        let mut dx = vec![0.0; self.weight.rows];
        mat_vec_acc(&self.weight, dy, &mut dx);
        dx
    }
}
