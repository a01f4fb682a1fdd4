use rand::Rng;

/// Inverted dropout mask: each unit is kept with probability `1 - rate`
/// and scaled by `1 / (1 - rate)`, so inference needs no rescaling.
pub fn dropout_mask<R: Rng + ?Sized>(len: usize, rate: f64, rng: &mut R) -> Vec<f64> {
    if rate <= 0.0 {
        return vec![1.0; len];
    }
    let keep = 1.0 - rate;
    let scale = 1.0 / keep;
    (0..len)
        .map(|_| if rng.random::<f64>() < keep { scale } else { 0.0 })
        .collect()
}

pub fn apply_mask(values: &mut [f64], mask: &[f64]) {
    for (v, m) in values.iter_mut().zip(mask) {
        *v *= m;
    }
}
