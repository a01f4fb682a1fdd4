//! Long short-term memory layer with backpropagation through time.
//!
//! Gate pre-activations for one step are `z = x·W + h_prev·U + b`, laid out
//! as four blocks of `units` in the order input, forget, cell, output:
//!
//! ```text
//! i = σ(z_i)   f = σ(z_f)   g = tanh(z_g)   o = σ(z_o)
//! c = f ⊙ c_prev + i ⊙ g
//! h = o ⊙ tanh(c)
//! ```

use rand::Rng;

use crate::ml::tensor::{Param, mat_vec_acc, outer_acc, sigmoid, vec_mat_acc};

#[derive(Debug, Clone, PartialEq)]
pub struct LstmLayer {
    units: usize,
    /// input_dim × 4·units
    kernel: Param,
    /// units × 4·units
    recurrent: Param,
    /// 1 × 4·units
    bias: Param,
}

/// Per-step activations kept for the backward pass.
#[derive(Debug, Clone)]
struct StepCache {
    x: Vec<f64>,
    h_prev: Vec<f64>,
    c_prev: Vec<f64>,
    i: Vec<f64>,
    f: Vec<f64>,
    g: Vec<f64>,
    o: Vec<f64>,
    tanh_c: Vec<f64>,
}

/// Forward trace of one sequence through the layer.
#[derive(Debug, Clone)]
pub struct LstmTrace {
    steps: Vec<StepCache>,
    hidden: Vec<Vec<f64>>,
}

impl LstmTrace {
    /// Hidden state at every step.
    pub fn outputs(&self) -> &[Vec<f64>] {
        &self.hidden
    }

    pub fn last_output(&self) -> &[f64] {
        self.hidden.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl LstmLayer {
    /// Glorot-uniform weights, zero bias except the forget gate which starts at 1.
    pub fn new<R: Rng + ?Sized>(input_dim: usize, units: usize, rng: &mut R) -> Self {
        let kernel = Param::glorot_uniform(input_dim, 4 * units, rng);
        let recurrent = Param::glorot_uniform(units, 4 * units, rng);
        let mut bias = Param::zeros(1, 4 * units);
        bias.data[units..2 * units].fill(1.0);
        Self {
            units,
            kernel,
            recurrent,
            bias,
        }
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn input_dim(&self) -> usize {
        self.kernel.rows
    }

    pub fn params(&self) -> [&Param; 3] {
        [&self.kernel, &self.recurrent, &self.bias]
    }

    pub fn params_mut(&mut self) -> [&mut Param; 3] {
        [&mut self.kernel, &mut self.recurrent, &mut self.bias]
    }

    fn gates(&self, x: &[f64], h_prev: &[f64]) -> Vec<f64> {
        let mut z = self.bias.data.clone();
        vec_mat_acc(x, &self.kernel, &mut z);
        vec_mat_acc(h_prev, &self.recurrent, &mut z);
        z
    }

    /// One step of the recurrence. Returns (i, f, g, o, c, h).
    #[allow(clippy::type_complexity)]
    fn step(
        &self,
        x: &[f64],
        h_prev: &[f64],
        c_prev: &[f64],
    ) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        let n = self.units;
        let z = self.gates(x, h_prev);
        let i: Vec<f64> = z[..n].iter().map(|&v| sigmoid(v)).collect();
        let f: Vec<f64> = z[n..2 * n].iter().map(|&v| sigmoid(v)).collect();
        let g: Vec<f64> = z[2 * n..3 * n].iter().map(|&v| v.tanh()).collect();
        let o: Vec<f64> = z[3 * n..].iter().map(|&v| sigmoid(v)).collect();

        let c: Vec<f64> = (0..n).map(|k| f[k] * c_prev[k] + i[k] * g[k]).collect();
        let h: Vec<f64> = (0..n).map(|k| o[k] * c[k].tanh()).collect();
        (i, f, g, o, c, h)
    }

    /// Runs the sequence from a zero state, keeping everything backward needs.
    pub fn forward(&self, inputs: &[Vec<f64>]) -> LstmTrace {
        let n = self.units;
        let mut h = vec![0.0; n];
        let mut c = vec![0.0; n];
        let mut steps = Vec::with_capacity(inputs.len());
        let mut hidden = Vec::with_capacity(inputs.len());

        for x in inputs {
            let (i, f, g, o, c_new, h_new) = self.step(x, &h, &c);
            let tanh_c = c_new.iter().map(|v| v.tanh()).collect();
            steps.push(StepCache {
                x: x.clone(),
                h_prev: std::mem::replace(&mut h, h_new),
                c_prev: std::mem::replace(&mut c, c_new),
                i,
                f,
                g,
                o,
                tanh_c,
            });
            hidden.push(h.clone());
        }
        LstmTrace { steps, hidden }
    }

    /// Inference without a trace. Returns every hidden state, or only the last one.
    pub fn infer(&self, inputs: &[Vec<f64>], full_sequence: bool) -> Vec<Vec<f64>> {
        let mut h = vec![0.0; self.units];
        let mut c = vec![0.0; self.units];
        let mut out = Vec::with_capacity(if full_sequence { inputs.len() } else { 1 });
        for x in inputs {
            let (_, _, _, _, c_new, h_new) = self.step(x, &h, &c);
            h = h_new;
            c = c_new;
            if full_sequence {
                out.push(h.clone());
            }
        }
        if !full_sequence {
            out.push(h);
        }
        out
    }

    /// Backpropagation through time.
    ///
    /// `d_hidden[t]` is the loss gradient w.r.t. the output at step `t`
    /// (all zeros but the last for a sequence-to-one layer). Parameter
    /// gradients are accumulated into `grads` in `params()` order and the
    /// gradient w.r.t. each input step is returned.
    pub fn backward(
        &self,
        trace: &LstmTrace,
        d_hidden: &[Vec<f64>],
        grads: &mut [Param; 3],
    ) -> Vec<Vec<f64>> {
        let n = self.units;
        let [d_kernel, d_recurrent, d_bias] = grads;

        let mut dh_next = vec![0.0; n];
        let mut dc_next = vec![0.0; n];
        let mut dz = vec![0.0; 4 * n];
        let mut d_inputs = vec![Vec::new(); trace.steps.len()];

        for (t, s) in trace.steps.iter().enumerate().rev() {
            for k in 0..n {
                let dh = d_hidden[t][k] + dh_next[k];
                let d_o = dh * s.tanh_c[k];
                let dc = dh * s.o[k] * (1.0 - s.tanh_c[k] * s.tanh_c[k]) + dc_next[k];

                dz[k] = dc * s.g[k] * s.i[k] * (1.0 - s.i[k]);
                dz[n + k] = dc * s.c_prev[k] * s.f[k] * (1.0 - s.f[k]);
                dz[2 * n + k] = dc * s.i[k] * (1.0 - s.g[k] * s.g[k]);
                dz[3 * n + k] = d_o * s.o[k] * (1.0 - s.o[k]);

                dc_next[k] = dc * s.f[k];
            }

            outer_acc(&s.x, &dz, d_kernel);
            outer_acc(&s.h_prev, &dz, d_recurrent);
            for (b, d) in d_bias.data.iter_mut().zip(&dz) {
                *b += d;
            }

            let mut dx = vec![0.0; self.kernel.rows];
            mat_vec_acc(&self.kernel, &dz, &mut dx);
            d_inputs[t] = dx;

            dh_next.fill(0.0);
            mat_vec_acc(&self.recurrent, &dz, &mut dh_next);
        }
        d_inputs
    }
}
