//! Sample statistics over plain slices.
//!
//! Empty input yields `NaN` rather than an error; the curve layer decides
//! whether an empty sample set is a failure.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `n`).
pub fn stdev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mean = mean(values);
    let var = values
        .iter()
        .map(|&val| (val - mean).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    var.sqrt()
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NAN, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NAN, f64::max)
}

/// Pearson correlation coefficient over the common prefix of both slices.
pub fn pearson(lhs: &[f64], rhs: &[f64]) -> f64 {
    let n = lhs.len().min(rhs.len());
    if n == 0 {
        return f64::NAN;
    }
    let (lhs, rhs) = (&lhs[..n], &rhs[..n]);
    let lhs_mean = mean(lhs);
    let rhs_mean = mean(rhs);

    let mut cov = 0.0;
    let mut lhs_var = 0.0;
    let mut rhs_var = 0.0;
    for (&a, &b) in lhs.iter().zip(rhs) {
        let da = a - lhs_mean;
        let db = b - rhs_mean;
        cov += da * db;
        lhs_var += da * da;
        rhs_var += db * db;
    }
    cov / (lhs_var * rhs_var).sqrt()
}

/// Coefficient of determination of `predicted` against `observed`,
/// `1 - SS_res / SS_tot`, over the common prefix of both slices.
pub fn r_squared(observed: &[f64], predicted: &[f64]) -> f64 {
    let n = observed.len().min(predicted.len());
    if n == 0 {
        return f64::NAN;
    }
    let (observed, predicted) = (&observed[..n], &predicted[..n]);
    let observed_mean = mean(observed);

    let ss_res: f64 = observed
        .iter()
        .zip(predicted)
        .map(|(&y, &f)| (y - f).powi(2))
        .sum();
    let ss_tot: f64 = observed
        .iter()
        .map(|&y| (y - observed_mean).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { f64::NEG_INFINITY };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_moments() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&values), 5.0);
        assert_relative_eq!(stdev(&values), 2.0);
        assert_eq!(min(&values), 2.0);
        assert_eq!(max(&values), 9.0);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_pearson() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(pearson(&x, &[2.0, 4.0, 6.0, 8.0]), 1.0);
        assert_relative_eq!(pearson(&x, &[8.0, 6.0, 4.0, 2.0]), -1.0);
        // truncated to the shorter slice
        assert_relative_eq!(pearson(&x, &[3.0, 5.0, 7.0]), 1.0);
    }

    #[test]
    fn test_r_squared() {
        let observed = [1.0, 2.0, 3.0];
        assert_relative_eq!(r_squared(&observed, &observed), 1.0);
        assert_relative_eq!(r_squared(&observed, &[2.0, 2.0, 2.0]), 0.0);
    }
}
