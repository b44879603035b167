use nalgebra::{
    DMatrix,
    DVector
};

use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};
use crate::math::curve::nonparametriccurve::nonparametriccurve::Point2D;

const SVD_EPS: f64 = 1e-12;

/// Least-squares polynomial of degree `order` through `points`.
///
/// Coefficients are returned highest degree first.
pub fn polyfit(points: &[Point2D], order: usize) -> CurveResult<Vec<f64>> {
    let n_coefs = order + 1;
    if points.len() < n_coefs {
        return Err(CurveError::insufficient_points(n_coefs, points.len()));
    }
    if points.iter().any(|pt| !pt.x().is_finite() || !pt.y().is_finite()) {
        return Err(CurveError::invalid_argument("cannot fit non-finite points"));
    }

    let vandermonde = DMatrix::<f64>::from_fn(points.len(), n_coefs, |r, c| {
        points[r].x().powi((order - c) as i32)
    });
    let rhs = DVector::<f64>::from_iterator(points.len(), points.iter().map(|pt| pt.y()));

    let coefs = vandermonde
        .svd(true, true)
        .solve(&rhs, SVD_EPS)
        .map_err(|reason| CurveError::numerical(reason))?;
    Ok(coefs.iter().copied().collect())
}

/// Evaluate a highest-degree-first polynomial by Horner's rule.
pub fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs
        .iter()
        .fold(0.0, |acc, &beta| f64::mul_add(acc, x, beta))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_exact_linear_fit() {
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 2.0),
            Point2D::new(2.0, 4.0),
        ];
        let coefs = polyfit(&points, 1).unwrap();
        assert_relative_eq!(coefs[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(coefs[1], 0.0, epsilon = 1e-10);
        assert_relative_eq!(polyval(&coefs, 3.0), 6.0, epsilon = 1e-10);
    }

    #[test]
    fn test_least_squares_quadratic() {
        // y = x^2 - 3 sampled exactly, fitted with a quadratic
        let points: Vec<Point2D> = (-3..=3)
            .map(|i| Point2D::new(i as f64, (i * i) as f64 - 3.0))
            .collect();
        let coefs = polyfit(&points, 2).unwrap();
        assert_relative_eq!(coefs[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(coefs[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(coefs[2], -3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_insufficient_points() {
        let points = vec![Point2D::new(0.0, 1.0)];
        assert_eq!(
            polyfit(&points, 1),
            Err(CurveError::insufficient_points(2, 1))
        );
    }
}
