use std::any::Any;
use std::f64::consts::PI;

use crate::math::curve::boundarypolicy::Boundaries;
use crate::math::curve::curve::Curve;
use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};

/// Normal density `c * exp(-(x - mean)^2 / (2 stdev^2))` with
/// `c = 1 / (stdev * sqrt(2π))`.
///
/// The domain `[mean - stdev, mean + stdev]` only sets the default sampling
/// window; lookups beyond it evaluate the density itself.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianCurve {
    mean: f64,
    stdev: f64,
    boundaries: Boundaries,
    time_shift: f64
}

impl GaussianCurve {
    pub fn new(mean: f64, stdev: f64) -> CurveResult<GaussianCurve> {
        validate_stdev(stdev)?;
        Ok(GaussianCurve {
            mean,
            stdev,
            boundaries: Boundaries::extend(),
            time_shift: 0.0
        })
    }

    pub fn with_boundaries(mut self, boundaries: Boundaries) -> Self {
        self.boundaries = boundaries;
        self
    }

    pub fn with_time_shift(mut self, time_shift: f64) -> Self {
        self.time_shift = time_shift;
        self
    }

    /// `(mean, stdev)`
    pub fn parameters(&self) -> (f64, f64) {
        (self.mean, self.stdev)
    }

    pub fn set_mean(&mut self, mean: f64) {
        self.mean = mean;
    }

    pub fn set_stdev(&mut self, stdev: f64) -> CurveResult<()> {
        validate_stdev(stdev)?;
        self.stdev = stdev;
        Ok(())
    }

    /// Height of the peak.
    pub fn coefficient(&self) -> f64 {
        1.0 / (self.stdev * (2.0 * PI).sqrt())
    }

    /// Reshape the curve so that its peak height becomes `coefficient`.
    pub fn set_coefficient(&mut self, coefficient: f64) -> CurveResult<()> {
        if !coefficient.is_finite() || coefficient <= 0.0 {
            return Err(CurveError::domain(format!(
                "coefficient must be positive and finite, got {}",
                coefficient
            )));
        }
        self.set_stdev(1.0 / (coefficient * (2.0 * PI).sqrt()))
    }
}

fn validate_stdev(stdev: f64) -> CurveResult<()> {
    if stdev.is_finite() && stdev > 0.0 {
        Ok(())
    } else {
        Err(CurveError::domain(format!(
            "standard deviation must be positive and finite, got {}",
            stdev
        )))
    }
}

impl Curve for GaussianCurve {
    fn start(&self) -> f64 {
        self.mean - self.stdev
    }

    fn end(&self) -> f64 {
        self.mean + self.stdev
    }

    fn time_shift(&self) -> f64 {
        self.time_shift
    }

    fn boundaries(&self) -> Boundaries {
        self.boundaries
    }

    fn evaluate(&self, position: f64) -> f64 {
        let exponent = -(position - self.mean).powi(2) / (2.0 * self.stdev.powi(2));
        self.coefficient() * exponent.exp()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn mean(&self) -> CurveResult<f64> {
        Ok(self.mean)
    }

    fn stdev(&self) -> CurveResult<f64> {
        Ok(self.stdev)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_peak_is_coefficient() {
        let curve = GaussianCurve::new(2.0, 0.5).unwrap();
        assert_relative_eq!(curve.value_at(2.0).unwrap().unwrap(), curve.coefficient());
        assert_relative_eq!(curve.coefficient(), 0.797_884_560_802_865_4, epsilon = 1e-12);
    }

    #[test]
    fn test_symmetric_about_mean() {
        let curve = GaussianCurve::new(1.0, 2.0).unwrap();
        for d in [0.3, 1.0, 2.5, 7.0] {
            assert_relative_eq!(
                curve.value_at(1.0 + d).unwrap().unwrap(),
                curve.value_at(1.0 - d).unwrap().unwrap(),
                epsilon = 1e-15
            );
        }
    }

    #[test]
    fn test_rejects_non_positive_stdev() {
        assert!(GaussianCurve::new(0.0, 0.0).unwrap_err().is_domain());
        let mut curve = GaussianCurve::new(0.0, 1.0).unwrap();
        assert!(curve.set_stdev(-1.0).unwrap_err().is_domain());
        assert!(curve.set_coefficient(0.0).unwrap_err().is_domain());
        assert_eq!(curve.parameters(), (0.0, 1.0));
    }

    #[test]
    fn test_coefficient_round_trips() {
        let mut curve = GaussianCurve::new(0.0, 1.0).unwrap();
        curve.set_coefficient(2.0).unwrap();
        assert_relative_eq!(curve.coefficient(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(curve.value_at(0.0).unwrap().unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_statistics_are_parameters() {
        let mut curve = GaussianCurve::new(3.0, 1.5).unwrap();
        assert_eq!(curve.mean().unwrap(), 3.0);
        assert_eq!(curve.stdev().unwrap(), 1.5);
        curve.set_mean(-1.0);
        assert_eq!(curve.start(), -2.5);
        assert_eq!(curve.end(), 0.5);
    }

    #[test]
    fn test_evaluates_beyond_nominal_domain() {
        let curve = GaussianCurve::new(0.0, 1.0).unwrap();
        let tail = curve.value_at(3.0).unwrap().unwrap();
        assert_relative_eq!(tail, curve.coefficient() * (-4.5_f64).exp(), epsilon = 1e-15);
    }
}
