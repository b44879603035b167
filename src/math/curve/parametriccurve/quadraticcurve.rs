use std::any::Any;

use tracing::debug;

use crate::math::curve::curve::Curve;
use crate::math::curve::curveerror::CurveResult;
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    Point2D,
    points_from_values
};
use crate::math::polyfit::{
    polyfit,
    polyval
};

/// Polynomial of any order over an unbounded domain, coefficients highest
/// degree first.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticCurve {
    coefficients: Vec<f64>,
    time_shift: f64
}

/// A first order [`QuadraticCurve`].
pub type LinearCurve = QuadraticCurve;

impl QuadraticCurve {
    pub fn new(coefficients: Vec<f64>) -> QuadraticCurve {
        QuadraticCurve {
            coefficients,
            time_shift: 0.0
        }
    }

    /// Least squares fit of degree `order` through `points`.
    pub fn fit(points: &[Point2D], order: usize) -> CurveResult<QuadraticCurve> {
        let coefficients = polyfit(points, order)?;
        debug!(order, points = points.len(), ?coefficients, "fitted polynomial");
        Ok(QuadraticCurve::new(coefficients))
    }

    /// Fit against samples at implicit positions `0..N`.
    pub fn fit_samples(samples: &[f64], order: usize) -> CurveResult<QuadraticCurve> {
        QuadraticCurve::fit(&points_from_values(samples), order)
    }

    pub fn with_time_shift(mut self, time_shift: f64) -> Self {
        self.time_shift = time_shift;
        self
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn order(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Values at each of `positions`.
    pub fn solve(&self, positions: &[f64]) -> Vec<f64> {
        positions
            .iter()
            .map(|&position| self.evaluate(position - self.time_shift))
            .collect()
    }
}

impl Curve for QuadraticCurve {
    fn start(&self) -> f64 {
        f64::NEG_INFINITY
    }

    fn time_shift(&self) -> f64 {
        self.time_shift
    }

    fn evaluate(&self, position: f64) -> f64 {
        polyval(&self.coefficients, position)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::curve::curveerror::CurveError;

    #[test]
    fn test_linear_fit_extrapolates() {
        let points = vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 2.0), Point2D::new(2.0, 4.0)];
        let line = LinearCurve::fit(&points, 1).unwrap();
        assert_eq!(line.order(), 1);
        assert_relative_eq!(line.value_at(3.0).unwrap().unwrap(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_quadratic_fit_of_samples() {
        let curve = QuadraticCurve::fit_samples(&[1.0, 2.0, 5.0, 10.0], 2).unwrap();
        let coefs = curve.coefficients();
        assert_relative_eq!(coefs[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(coefs[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(coefs[2], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_too_few_points() {
        let err = QuadraticCurve::fit_samples(&[1.0, 2.0], 2).unwrap_err();
        assert_eq!(err, CurveError::insufficient_points(3, 2));
    }

    #[test]
    fn test_solve_and_shift() {
        let curve = QuadraticCurve::new(vec![1.0, 0.0, 0.0]).with_time_shift(1.0);
        assert_eq!(curve.solve(&[1.0, 2.0, 3.0]), vec![0.0, 1.0, 4.0]);
        assert_eq!(curve.value_at(-1.0).unwrap(), Some(4.0));
        assert!(curve.is_infinite());
    }
}
