//! Row-major parameter storage and the handful of dense kernels the layers need.

use rand::Rng;

/// A trainable matrix (or vector when `rows == 1`).
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f64>,
}

impl Param {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn zeros_like(other: &Param) -> Self {
        Self::zeros(other.rows, other.cols)
    }

    /// Glorot/Xavier uniform: U(-limit, limit) with limit = sqrt(6 / (fan_in + fan_out)).
    pub fn glorot_uniform<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let limit = (6.0 / (rows + cols) as f64).sqrt();
        let data = (0..rows * cols)
            .map(|_| rng.random_range(-limit..limit))
            .collect();
        Self { rows, cols, data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `self += other`, shapes must match.
    pub fn add_assign(&mut self, other: &Param) {
        debug_assert_eq!(self.data.len(), other.data.len());
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += b;
        }
    }

    pub fn scale(&mut self, factor: f64) {
        self.data.iter_mut().for_each(|v| *v *= factor);
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

/// `out += x · W` for `W` of shape (x.len() × out.len()).
#[inline]
pub fn vec_mat_acc(x: &[f64], w: &Param, out: &mut [f64]) {
    debug_assert_eq!(x.len(), w.rows);
    debug_assert_eq!(out.len(), w.cols);
    for (xi, row) in x.iter().zip(w.data.chunks_exact(w.cols)) {
        if *xi == 0.0 {
            continue;
        }
        for (o, wij) in out.iter_mut().zip(row) {
            *o += xi * wij;
        }
    }
}

/// `out += W · dy`, the backward of `vec_mat_acc` with respect to `x`.
#[inline]
pub fn mat_vec_acc(w: &Param, dy: &[f64], out: &mut [f64]) {
    debug_assert_eq!(dy.len(), w.cols);
    debug_assert_eq!(out.len(), w.rows);
    for (o, row) in out.iter_mut().zip(w.data.chunks_exact(w.cols)) {
        *o += row.iter().zip(dy).map(|(a, b)| a * b).sum::<f64>();
    }
}

/// `grad += xᵀ · dy`, the backward of `vec_mat_acc` with respect to `W`.
#[inline]
pub fn outer_acc(x: &[f64], dy: &[f64], grad: &mut Param) {
    debug_assert_eq!(x.len(), grad.rows);
    debug_assert_eq!(dy.len(), grad.cols);
    for (xi, row) in x.iter().zip(grad.data.chunks_exact_mut(grad.cols)) {
        if *xi == 0.0 {
            continue;
        }
        for (g, d) in row.iter_mut().zip(dy) {
            *g += xi * d;
        }
    }
}

#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn w23() -> Param {
        // [[1, 2, 3], [4, 5, 6]]
        Param {
            rows: 2,
            cols: 3,
            data: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        }
    }

    #[test]
    fn vec_mat() {
        let mut out = vec![0.0; 3];
        vec_mat_acc(&[1.0, 1.0], &w23(), &mut out);
        assert_eq!(out, vec![5.0, 7.0, 9.0]);
    }

    #[test]
    fn mat_vec() {
        let mut out = vec![0.0; 2];
        mat_vec_acc(&w23(), &[1.0, 0.0, 1.0], &mut out);
        assert_eq!(out, vec![4.0, 10.0]);
    }

    #[test]
    fn outer() {
        let mut g = Param::zeros(2, 3);
        outer_acc(&[1.0, 2.0], &[1.0, 0.0, -1.0], &mut g);
        assert_eq!(g.data, vec![1.0, 0.0, -1.0, 2.0, 0.0, -2.0]);
    }

    #[test]
    fn glorot_is_bounded_and_seeded() {
        let mut a = StdRng::seed_from_u64(3);
        let mut b = StdRng::seed_from_u64(3);
        let p = Param::glorot_uniform(10, 20, &mut a);
        let limit = (6.0f64 / 30.0).sqrt();
        assert!(p.data.iter().all(|v| v.abs() <= limit));
        assert_eq!(p, Param::glorot_uniform(10, 20, &mut b));
    }
}
