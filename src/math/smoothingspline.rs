use argmin::core::{
    CostFunction,
    Executor,
    State
};
use argmin::solver::brent::BrentRoot;
use nalgebra::DVector;
use tracing::{
    debug,
    trace
};

use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    Point2D,
    is_strictly_increasing
};
use crate::math::curve::nonparametriccurve::piecewisepolynomial::PiecewisePolynomial;
use crate::math::polyfit::polyfit;

// ─────────────────────────────────────────────────────────────────────────────
// Cubic smoothing spline (Reinsch)
// ─────────────────────────────────────────────────────────────────────────────
//
// Minimizes ∫ g''(x)² dx subject to Σ (y_i - g(x_i))² ≤ s, with knots at every
// data x. Written as a penalized least squares problem with weight λ:
//
//   (R + λ QᵀQ) γ = Qᵀ y
//   g = y - λ Q γ
//
// Q is n×(n-2) with three non-zeros per column (second divided differences),
// R is (n-2)×(n-2) tridiagonal and γ are the second derivatives at the
// interior knots (zero at both ends). R + λQᵀQ is symmetric pentadiagonal, so
// only its three upper diagonals are stored and every solve is linear in n.
// The residual RSS(λ) = λ²‖Qγ‖² grows monotonically from 0 (interpolation) to
// the residual of the least squares line, so λ is found by a root search on
// RSS(λ) - s over u = ln(λ / scale).

const LOG_PENALTY_BRACKET: f64 = 40.0;
const ROOT_TOLERANCE: f64 = 1e-10;
const MAX_ITERS: u64 = 200;

/// Upper diagonals of a symmetric pentadiagonal matrix.
#[derive(Clone)]
struct Pentadiagonal {
    d0: Vec<f64>,
    d1: Vec<f64>,
    d2: Vec<f64>
}

impl Pentadiagonal {
    fn zeros(m: usize) -> Pentadiagonal {
        Pentadiagonal {
            d0: vec![0.0; m],
            d1: vec![0.0; m.saturating_sub(1)],
            d2: vec![0.0; m.saturating_sub(2)]
        }
    }

    /// `self + other * factor`, diagonal by diagonal.
    fn add_scaled(&self, other: &Pentadiagonal, factor: f64) -> Pentadiagonal {
        let combine = |a: &[f64], b: &[f64]| -> Vec<f64> {
            a.iter().zip(b.iter()).map(|(x, y)| x + factor * y).collect()
        };
        Pentadiagonal {
            d0: combine(&self.d0, &other.d0),
            d1: combine(&self.d1, &other.d1),
            d2: combine(&self.d2, &other.d2)
        }
    }

    fn trace(&self) -> f64 {
        self.d0.iter().sum()
    }

    /// Solves `A x = rhs` through a banded LDLᵀ factorization. Fails when a
    /// pivot is not positive.
    fn solve(&self, rhs: &DVector<f64>) -> CurveResult<DVector<f64>> {
        let m = self.d0.len();
        let mut diag = vec![0.0; m];
        let mut l1 = vec![0.0; m.saturating_sub(1)];
        let mut l2 = vec![0.0; m.saturating_sub(2)];

        for j in 0..m {
            let mut pivot = self.d0[j];
            if j >= 1 {
                pivot -= l1[j - 1] * l1[j - 1] * diag[j - 1];
            }
            if j >= 2 {
                pivot -= l2[j - 2] * l2[j - 2] * diag[j - 2];
            }
            if !(pivot.is_finite() && pivot > 0.0) {
                return Err(CurveError::numerical("smoothing system is not positive definite"));
            }
            diag[j] = pivot;

            if j + 1 < m {
                let mut off = self.d1[j];
                if j >= 1 {
                    off -= l2[j - 1] * diag[j - 1] * l1[j - 1];
                }
                l1[j] = off / pivot;
            }
            if j + 2 < m {
                l2[j] = self.d2[j] / pivot;
            }
        }

        let mut x = rhs.clone();
        for i in 0..m {
            if i >= 1 {
                x[i] -= l1[i - 1] * x[i - 1];
            }
            if i >= 2 {
                x[i] -= l2[i - 2] * x[i - 2];
            }
        }
        for i in 0..m {
            x[i] /= diag[i];
        }
        for i in (0..m).rev() {
            if i + 1 < m {
                x[i] -= l1[i] * x[i + 1];
            }
            if i + 2 < m {
                x[i] -= l2[i] * x[i + 2];
            }
        }
        Ok(x)
    }
}

struct PenaltySystem {
    y: DVector<f64>,
    // Column k of Q holds q[k] = [Q(k,k), Q(k+1,k), Q(k+2,k)].
    q: Vec<[f64; 3]>,
    r: Pentadiagonal,
    qtq: Pentadiagonal,
    qty: DVector<f64>
}

impl PenaltySystem {
    fn new(points: &[Point2D]) -> PenaltySystem {
        let n = points.len();
        let m = n - 2;
        let h: Vec<f64> = points
            .windows(2)
            .map(|pair| pair[1].x() - pair[0].x())
            .collect();
        let y = DVector::<f64>::from_iterator(n, points.iter().map(|pt| pt.y()));

        let q: Vec<[f64; 3]> = (0..m)
            .map(|k| [1.0 / h[k], -1.0 / h[k] - 1.0 / h[k + 1], 1.0 / h[k + 1]])
            .collect();

        let mut r = Pentadiagonal::zeros(m);
        let mut qtq = Pentadiagonal::zeros(m);
        let mut qty = DVector::<f64>::zeros(m);
        for k in 0..m {
            let [a, b, c] = q[k];
            r.d0[k] = (h[k] + h[k + 1]) / 3.0;
            qtq.d0[k] = a * a + b * b + c * c;
            qty[k] = a * y[k] + b * y[k + 1] + c * y[k + 2];
            if k + 1 < m {
                let next = q[k + 1];
                r.d1[k] = h[k + 1] / 6.0;
                qtq.d1[k] = b * next[0] + c * next[1];
            }
            if k + 2 < m {
                qtq.d2[k] = c * q[k + 2][0];
            }
        }

        PenaltySystem { y, q, r, qtq, qty }
    }

    /// λ at which both terms of the system have comparable magnitude.
    fn scale(&self) -> f64 {
        self.r.trace() / self.qtq.trace()
    }

    /// Second derivatives at the interior knots for penalty `lambda`.
    fn gamma(&self, lambda: f64) -> CurveResult<DVector<f64>> {
        self.r.add_scaled(&self.qtq, lambda).solve(&self.qty)
    }

    /// `Q γ` as a three-term stencil.
    fn q_times(&self, gamma: &DVector<f64>) -> DVector<f64> {
        let mut out = DVector::<f64>::zeros(self.y.len());
        for (k, column) in self.q.iter().enumerate() {
            out[k] += column[0] * gamma[k];
            out[k + 1] += column[1] * gamma[k];
            out[k + 2] += column[2] * gamma[k];
        }
        out
    }

    fn residual(&self, lambda: f64) -> CurveResult<f64> {
        let gamma = self.gamma(lambda)?;
        Ok((self.q_times(&gamma) * lambda).norm_squared())
    }
}

struct ResidualTarget<'a> {
    system: &'a PenaltySystem,
    scale: f64,
    smoothing: f64
}

impl CostFunction for ResidualTarget<'_> {
    type Param = f64;
    type Output = f64;

    fn cost(&self, log_penalty: &f64) -> Result<f64, argmin::core::Error> {
        let lambda = self.scale * log_penalty.exp();
        let rss = self.system.residual(lambda)?;
        trace!(lambda, rss, "smoothing residual");
        Ok(rss - self.smoothing)
    }
}

/// A cubic spline fitted to a set of points under a residual budget.
#[derive(Clone)]
pub struct SmoothingSpline {
    fitted_points: Vec<Point2D>,
    polynomial: Option<PiecewisePolynomial>,
    smoothing: f64,
    residual: f64
}

impl SmoothingSpline {
    /// Fit through `points` (strictly increasing x) allowing a total squared
    /// deviation of `smoothing`. `smoothing = 0` interpolates every point.
    pub fn fit(points: &[Point2D], smoothing: f64) -> CurveResult<SmoothingSpline> {
        if points.is_empty() {
            return Err(CurveError::insufficient_points(1, 0));
        }
        if !smoothing.is_finite() || smoothing < 0.0 {
            return Err(CurveError::invalid_argument(format!(
                "smoothing must be a non-negative finite number, got {}",
                smoothing
            )));
        }
        if !is_strictly_increasing(points) || points.iter().any(|pt| !pt.y().is_finite()) {
            return Err(CurveError::InvalidControlPoints(
                "control points need finite values and strictly increasing positions".to_owned(),
            ));
        }

        match points.len() {
            1 => Ok(SmoothingSpline {
                fitted_points: points.to_vec(),
                polynomial: None,
                smoothing,
                residual: 0.0
            }),
            2 => Self::from_moments(points.to_vec(), vec![0.0, 0.0], smoothing, 0.0),
            _ => Self::fit_penalized(points, smoothing)
        }
    }

    fn fit_penalized(points: &[Point2D], smoothing: f64) -> CurveResult<SmoothingSpline> {
        let line = polyfit(points, 1)?;
        let line_residual: f64 = points
            .iter()
            .map(|pt| (pt.y() - (line[0] * pt.x() + line[1])).powi(2))
            .sum();

        if smoothing >= line_residual {
            debug!(
                knots = points.len(),
                smoothing,
                line_residual,
                "smoothing budget admits the least squares line"
            );
            let fitted = points
                .iter()
                .map(|pt| Point2D::new(pt.x(), line[0] * pt.x() + line[1]))
                .collect();
            return Self::from_moments(fitted, vec![0.0; points.len()], smoothing, line_residual);
        }

        let system = PenaltySystem::new(points);
        let lambda = if smoothing == 0.0 {
            0.0
        } else {
            Self::find_penalty(&system, smoothing)?
        };

        let gamma = system.gamma(lambda)?;
        let values = &system.y - system.q_times(&gamma) * lambda;
        let residual = (&system.y - &values).norm_squared();

        let fitted = points
            .iter()
            .zip(values.iter())
            .map(|(pt, &g)| Point2D::new(pt.x(), g))
            .collect();
        let mut moments = Vec::with_capacity(points.len());
        moments.push(0.0);
        moments.extend(gamma.iter().copied());
        moments.push(0.0);

        debug!(knots = points.len(), smoothing, lambda, residual, "fitted smoothing spline");
        Self::from_moments(fitted, moments, smoothing, residual)
    }

    fn find_penalty(system: &PenaltySystem, smoothing: f64) -> CurveResult<f64> {
        let scale = system.scale();
        let target = ResidualTarget { system, scale, smoothing };

        // Rounding can leave the upper end of the bracket marginally short of
        // the budget; the widest penalty is then the answer.
        if target.cost(&LOG_PENALTY_BRACKET).map_err(|e| CurveError::numerical(e.to_string()))? <= 0.0 {
            return Ok(scale * LOG_PENALTY_BRACKET.exp());
        }

        let solver = BrentRoot::new(-LOG_PENALTY_BRACKET, LOG_PENALTY_BRACKET, ROOT_TOLERANCE);
        let result = Executor::new(target, solver)
            .configure(|state| state.param(0.0).max_iters(MAX_ITERS))
            .run()
            .map_err(|e| CurveError::numerical(e.to_string()))?;
        let log_penalty = result
            .state()
            .get_param()
            .copied()
            .ok_or_else(|| CurveError::numerical("root search returned no penalty"))?;
        Ok(scale * log_penalty.exp())
    }

    fn from_moments(
        fitted_points: Vec<Point2D>,
        moments: Vec<f64>,
        smoothing: f64,
        residual: f64,
    ) -> CurveResult<SmoothingSpline> {
        let polynomial = PiecewisePolynomial::from_moments(&fitted_points, &moments)?;
        Ok(SmoothingSpline {
            fitted_points,
            polynomial: Some(polynomial),
            smoothing,
            residual
        })
    }

    pub fn value(&self, x: f64) -> f64 {
        match &self.polynomial {
            Some(polynomial) => polynomial.value(x),
            None => self.fitted_points[0].y()
        }
    }

    pub fn derivative(&self, x: f64) -> f64 {
        self.polynomial
            .as_ref()
            .map_or(0.0, |polynomial| polynomial.derivative(x))
    }

    /// Knots paired with the fitted (not the input) values.
    pub fn fitted_points(&self) -> &[Point2D] {
        &self.fitted_points
    }

    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    /// Total squared deviation of the fit from its input points.
    pub fn residual(&self) -> f64 {
        self.residual
    }
}
