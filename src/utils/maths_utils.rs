/// Population mean and standard deviation (divides by n, not n - 1).
#[inline]
pub fn mean_and_stddev(data: &[f64]) -> (f64, f64) {
    let count = data.len();
    if count == 0 {
        return (0.0, 0.0);
    }

    let sum: f64 = data.iter().sum();
    let mean = sum / count as f64;

    let variance: f64 = data
        .iter()
        .map(|value| {
            let diff = mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / count as f64;

    (mean, variance.sqrt())
}

/// Linearly maps a value from one range to another while preserving its relative proportion.
/// A degenerate input range maps everything to `out_min`.
pub fn remap(val: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    let span = in_max - in_min;
    if span.abs() <= f64::EPSILON {
        return out_min;
    }
    let t = (val - in_min) / span;
    out_min + t * (out_max - out_min)
}

/// Percentage change from `previous` to `current`; 0 when `previous` is 0.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous.abs() > f64::EPSILON {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

pub fn all_finite(data: &[f64]) -> bool {
    data.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stddev_is_population() {
        let (mean, sd) = mean_and_stddev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(mean, 5.0);
        assert_eq!(sd, 2.0);
    }

    #[test]
    fn remap_degenerate_range() {
        assert_eq!(remap(5.0, 5.0, 5.0, 0.0, 1.0), 0.0);
        assert_eq!(remap(7.5, 5.0, 10.0, 0.0, 1.0), 0.5);
    }

    #[test]
    fn percent_change_guards_zero() {
        assert_eq!(percent_change(110.0, 100.0), 10.0);
        assert_eq!(percent_change(1.0, 0.0), 0.0);
    }
}
