use nalgebra::{
    DMatrix,
    DVector
};

use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    NonparametricCurve,
    Point2D,
    is_strictly_increasing
};

// ─────────────────────────────────────────────
// Subpolynomial
// ─────────────────────────────────────────────

#[derive(Clone)]
struct Subpolynomial {
    coefs: Vec<f64>,
    lhs_x: f64
}

impl Subpolynomial {
    fn new(coefs: Vec<f64>, lhs_x: f64) -> Subpolynomial {
        Subpolynomial { coefs, lhs_x }
    }

    fn value(&self, x: f64) -> f64 {
        Self::evaluate(&self.coefs, x - self.lhs_x)
    }

    fn derivative(&self, x: f64) -> f64 {
        let order = self.coefs.len() - 1;
        if order == 0 {
            return 0.0;
        }
        let deriv_coefs: Vec<f64> = (0..order)
            .map(|i| (order - i) as f64 * self.coefs[i])
            .collect();
        Self::evaluate(&deriv_coefs, x - self.lhs_x)
    }

    fn evaluate(coefs: &[f64], x_diff: f64) -> f64 {
        let mut result = coefs[0];
        for &beta in &coefs[1..] {
            result = f64::mul_add(result, x_diff, beta);
        }
        result
    }
}

// ─────────────────────────────────────────────
// Flat / Linear
// ─────────────────────────────────────────────

fn generate_forward_flat_coef_list(points: &[Point2D]) -> Vec<Vec<f64>> {
    points[..(points.len() - 1)]
        .iter()
        .map(|pt| vec![pt.y()])
        .collect()
}

fn generate_backward_flat_coef_list(points: &[Point2D]) -> Vec<Vec<f64>> {
    points[1..]
        .iter()
        .map(|pt| vec![pt.y()])
        .collect()
}

fn generate_linear_coef_list(points: &[Point2D]) -> Vec<Vec<f64>> {
    (0..(points.len() - 1))
        .map(|i| vec![
            Point2D::slope(&points[i], &points[i + 1]),
            points[i].y(),
        ])
        .collect()
}

// ─────────────────────────────────────────────
// Shared helpers
// ─────────────────────────────────────────────

fn knot_spacing(points: &[Point2D]) -> Vec<f64> {
    points
        .windows(2)
        .map(|pair| pair[1].x() - pair[0].x())
        .collect()
}

/// Cubic coefficients per interval from the second derivatives ("moments")
/// m[0..=n] at the knots, stored in Horner order [d, c, b, a]:
///   S_i(x) = a + b*(x-x_i) + c*(x-x_i)^2 + d*(x-x_i)^3
fn cubic_coefs_from_moments(points: &[Point2D], h: &[f64], m: &[f64]) -> Vec<Vec<f64>> {
    (0..h.len())
        .map(|i| {
            let d = (m[i + 1] - m[i]) / (6.0 * h[i]);
            let c = m[i] / 2.0;
            let b = (points[i + 1].y() - points[i].y()) / h[i]
                  - h[i] * (2.0 * m[i] + m[i + 1]) / 6.0;
            let a = points[i].y();
            vec![d, c, b, a]
        })
        .collect()
}

/// Cubic coefficients per interval from the first derivatives (Hermite
/// slopes) t[0..=n] at the knots, also stored as [d, c, b, a].
fn cubic_coefs_from_hermite(points: &[Point2D], h: &[f64], t: &[f64]) -> Vec<Vec<f64>> {
    (0..h.len())
        .map(|i| {
            let dy = points[i + 1].y() - points[i].y();
            let a = points[i].y();
            let b = t[i];
            let c = (3.0 * dy / h[i] - 2.0 * t[i] - t[i + 1]) / h[i];
            let d = (-2.0 * dy / h[i] + t[i] + t[i + 1]) / (h[i] * h[i]);
            vec![d, c, b, a]
        })
        .collect()
}

// ─────────────────────────────────────────────
// CubicSpline (Natural / NotAKnot)
// ─────────────────────────────────────────────
//
// Both boundary conditions share one (n+1)×(n+1) system for the moments
// m[0..=n]. Interior rows come from C² continuity:
//     h[i-1]*m[i-1] + 2*(h[i-1]+h[i])*m[i] + h[i]*m[i+1]
//       = 6*( (y[i+1]-y[i])/h[i] - (y[i]-y[i-1])/h[i-1] )
// Rows 0 and n carry the boundary condition.

fn build_interior_system(points: &[Point2D], h: &[f64]) -> (DMatrix<f64>, DVector<f64>) {
    let n = h.len();
    let mut mat = DMatrix::<f64>::zeros(n + 1, n + 1);
    let mut rhs = DVector::<f64>::zeros(n + 1);

    for i in 1..n {
        mat[(i, i - 1)] = h[i - 1];
        mat[(i, i)]     = 2.0 * (h[i - 1] + h[i]);
        mat[(i, i + 1)] = h[i];
        rhs[i] = 6.0 * (
            (points[i + 1].y() - points[i].y()) / h[i]
          - (points[i].y()     - points[i - 1].y()) / h[i - 1]
        );
    }
    (mat, rhs)
}

fn solve_moments(mat: DMatrix<f64>, rhs: DVector<f64>, label: &str) -> CurveResult<Vec<f64>> {
    mat.lu()
        .solve(&rhs)
        .map(|m| m.iter().copied().collect())
        .ok_or_else(|| CurveError::numerical(format!("{}: singular moment system", label)))
}

/// Natural: zero second derivative at both ends (m[0] = m[n] = 0).
fn generate_natural_cubic_coef_list(points: &[Point2D]) -> CurveResult<Vec<Vec<f64>>> {
    let n = points.len() - 1;
    let h = knot_spacing(points);

    let (mut mat, rhs) = build_interior_system(points, &h);
    mat[(0, 0)] = 1.0;
    mat[(n, n)] = 1.0;

    let m = solve_moments(mat, rhs, "natural cubic")?;
    Ok(cubic_coefs_from_moments(points, &h, &m))
}

/// Not-a-knot: third derivative continuous at x[1] and x[n-1].
///
///   at x[1]:   -h[1]*m[0] + (h[0]+h[1])*m[1] - h[0]*m[2] = 0
///   at x[n-1]: -h[n-1]*m[n-2] + (h[n-2]+h[n-1])*m[n-1] - h[n-2]*m[n] = 0
///
/// Needs at least 4 points so that both boundary rows are independent.
fn generate_not_a_knot_cubic_coef_list(points: &[Point2D]) -> CurveResult<Vec<Vec<f64>>> {
    let n = points.len() - 1;
    let h = knot_spacing(points);

    let (mut mat, rhs) = build_interior_system(points, &h);

    mat[(0, 0)] = -h[1];
    mat[(0, 1)] =  h[0] + h[1];
    mat[(0, 2)] = -h[0];

    mat[(n, n - 2)] = -h[n - 1];
    mat[(n, n - 1)] =  h[n - 2] + h[n - 1];
    mat[(n, n)]     = -h[n - 2];

    let m = solve_moments(mat, rhs, "not-a-knot cubic")?;
    Ok(cubic_coefs_from_moments(points, &h, &m))
}

// ─────────────────────────────────────────────
// Akima / Modified Akima
// ─────────────────────────────────────────────
//
// Knot slopes are weighted averages of neighbouring finite differences.
//
// Akima weights:
//   w1 = |s[i+1] - s[i]|
//   w2 = |s[i-1] - s[i-2]|
//
// Modified Akima (makima) weights, less overshoot on flat stretches:
//   w1 = |s[i+1] - s[i]| + |s[i+1] + s[i]| / 2
//   w2 = |s[i-1] - s[i-2]| + |s[i-1] + s[i-2]| / 2
//
// Ghost differences at the ends are linear extrapolations.

fn akima_slopes(points: &[Point2D], h: &[f64], modified: bool) -> Vec<f64> {
    let n = h.len();

    let s: Vec<f64> = (0..n)
        .map(|i| (points[i + 1].y() - points[i].y()) / h[i])
        .collect();

    let s1 = if n > 1 { s[1] } else { s[0] };
    let sn2 = if n > 1 { s[n - 2] } else { s[n - 1] };

    let s_m1 = 2.0 * s[0]      - s1;
    let s_m2 = 2.0 * s_m1      - s[0];
    let s_np1 = 2.0 * s[n - 1] - sn2;
    let s_np2 = 2.0 * s_np1    - s[n - 1];

    // ext[i+2] is s[i]
    let mut ext = Vec::with_capacity(n + 4);
    ext.push(s_m2);
    ext.push(s_m1);
    ext.extend_from_slice(&s);
    ext.push(s_np1);
    ext.push(s_np2);

    (0..=n)
        .map(|i| {
            let sm2 = ext[i];
            let sm1 = ext[i + 1];
            let sp0 = ext[i + 2];
            let sp1 = ext[i + 3];

            let (w1, w2) = if modified {
                (
                    (sp1 - sp0).abs() + (sp1 + sp0).abs() / 2.0,
                    (sm1 - sm2).abs() + (sm1 + sm2).abs() / 2.0,
                )
            } else {
                (
                    (sp1 - sp0).abs(),
                    (sm1 - sm2).abs(),
                )
            };

            if w1 + w2 < f64::EPSILON {
                (sm1 + sp0) / 2.0
            } else {
                (w1 * sm1 + w2 * sp0) / (w1 + w2)
            }
        })
        .collect()
}

fn generate_akima_coef_list(points: &[Point2D], modified: bool) -> Vec<Vec<f64>> {
    let h = knot_spacing(points);
    let t = akima_slopes(points, &h, modified);
    cubic_coefs_from_hermite(points, &h, &t)
}

// ─────────────────────────────────────────────
// PCHIP (Fritsch-Carlson, monotonicity preserving)
// ─────────────────────────────────────────────
//
// Interior slopes: weighted harmonic mean of the adjacent differences, zero
// at local extrema. End slopes: one-sided three-point estimate, zeroed when
// its sign disagrees with s[0] and limited to 3*s[0] across a sign change.

fn end_slope(h0: f64, h1: f64, s0: f64, s1: f64) -> f64 {
    let raw = ((2.0 * h0 + h1) * s0 - h0 * s1) / (h0 + h1);
    if raw.signum() != s0.signum() {
        0.0
    } else if s0.signum() != s1.signum() && raw.abs() > 3.0 * s0.abs() {
        3.0 * s0
    } else {
        raw
    }
}

fn generate_pchip_coef_list(points: &[Point2D]) -> Vec<Vec<f64>> {
    let n = points.len() - 1;
    let h = knot_spacing(points);
    let s: Vec<f64> = (0..n)
        .map(|i| (points[i + 1].y() - points[i].y()) / h[i])
        .collect();

    let mut t = vec![0.0_f64; n + 1];

    if n == 1 {
        t[0] = s[0];
        t[1] = s[0];
        return cubic_coefs_from_hermite(points, &h, &t);
    }

    for i in 1..n {
        if s[i - 1] * s[i] <= 0.0 {
            t[i] = 0.0;
        } else {
            let w1 = 2.0 * h[i]     + h[i - 1];
            let w2 = h[i] + 2.0 * h[i - 1];
            t[i] = (w1 + w2) / (w1 / s[i - 1] + w2 / s[i]);
        }
    }

    t[0] = end_slope(h[0], h[1], s[0], s[1]);
    t[n] = end_slope(h[n - 1], h[n - 2], s[n - 1], s[n - 2]);

    cubic_coefs_from_hermite(points, &h, &t)
}

// ─────────────────────────────────────────────
// PolynomialType
// ─────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PolynomialType {
    /// Holds the left knot's value across each interval.
    ForwardFlat,
    /// Holds the right knot's value across each interval.
    BackwardFlat,
    Linear,
    NaturalCubic,
    /// Needs at least 4 points (3 intervals).
    NotAKnotCubic,
    AkimaCubic,
    ModifiedAkimaCubic,
    PiecewiseCubicHermite
}

impl PolynomialType {
    pub fn necessary_points(&self) -> usize {
        match self {
            PolynomialType::ForwardFlat           => 2,
            PolynomialType::BackwardFlat          => 2,
            PolynomialType::Linear                => 2,
            PolynomialType::NaturalCubic          => 3,
            PolynomialType::NotAKnotCubic         => 4,
            PolynomialType::AkimaCubic            => 3,
            PolynomialType::ModifiedAkimaCubic    => 3,
            PolynomialType::PiecewiseCubicHermite => 3
        }
    }
}

// ─────────────────────────────────────────────
// PiecewisePolynomial
// ─────────────────────────────────────────────

/// Piecewise polynomial through a set of strictly increasing knots.
///
/// Positions left of the first knot use the first piece, positions right of
/// the last knot use the last piece.
#[derive(Clone)]
pub struct PiecewisePolynomial {
    max_x: f64,
    subpolynomial_list: Vec<Subpolynomial>
}

impl PiecewisePolynomial {
    pub fn new(
        polynomial_type: PolynomialType,
        points: &[Point2D],
    ) -> CurveResult<PiecewisePolynomial> {
        Self::validate(points, polynomial_type.necessary_points())?;

        let coef_list = match polynomial_type {
            PolynomialType::ForwardFlat           => generate_forward_flat_coef_list(points),
            PolynomialType::BackwardFlat          => generate_backward_flat_coef_list(points),
            PolynomialType::Linear                => generate_linear_coef_list(points),
            PolynomialType::NaturalCubic          => generate_natural_cubic_coef_list(points)?,
            PolynomialType::NotAKnotCubic         => generate_not_a_knot_cubic_coef_list(points)?,
            PolynomialType::AkimaCubic            => generate_akima_coef_list(points, false),
            PolynomialType::ModifiedAkimaCubic    => generate_akima_coef_list(points, true),
            PolynomialType::PiecewiseCubicHermite => generate_pchip_coef_list(points),
        };

        Ok(Self::from_coef_list(points, coef_list))
    }

    /// Cubic spline from the second derivatives at every knot.
    pub fn from_moments(points: &[Point2D], moments: &[f64]) -> CurveResult<PiecewisePolynomial> {
        Self::validate(points, 2)?;
        if moments.len() != points.len() {
            return Err(CurveError::invalid_argument(format!(
                "{} moments given for {} knots",
                moments.len(),
                points.len()
            )));
        }
        let h = knot_spacing(points);
        Ok(Self::from_coef_list(points, cubic_coefs_from_moments(points, &h, moments)))
    }

    fn validate(points: &[Point2D], necessary_points: usize) -> CurveResult<()> {
        if points.len() < necessary_points {
            return Err(CurveError::insufficient_points(necessary_points, points.len()));
        }
        if !is_strictly_increasing(points) {
            return Err(CurveError::InvalidControlPoints(
                "knot positions must be finite and strictly increasing".to_owned(),
            ));
        }
        Ok(())
    }

    fn from_coef_list(points: &[Point2D], coef_list: Vec<Vec<f64>>) -> PiecewisePolynomial {
        let subpolynomial_list = coef_list
            .into_iter()
            .zip(points.iter())
            .map(|(coefs, pt)| Subpolynomial::new(coefs, pt.x()))
            .collect();

        PiecewisePolynomial {
            subpolynomial_list,
            max_x: points[points.len() - 1].x()
        }
    }

    fn find_segment(&self, x: f64) -> usize {
        let last = self.subpolynomial_list.len() - 1;
        if x <= self.min_x() {
            0
        } else if x >= self.max_x {
            last
        } else {
            self.subpolynomial_list
                .partition_point(|s| s.lhs_x <= x)
                .saturating_sub(1)
                .min(last)
        }
    }

    pub fn value(&self, x: f64) -> f64 {
        let i = self.find_segment(x);
        self.subpolynomial_list[i].value(x)
    }

    pub fn derivative(&self, x: f64) -> f64 {
        let i = self.find_segment(x);
        self.subpolynomial_list[i].derivative(x)
    }
}

impl NonparametricCurve for PiecewisePolynomial {
    fn points(&self) -> Vec<Point2D> {
        let mut pts: Vec<Point2D> = self
            .subpolynomial_list
            .iter()
            .map(|s| Point2D::new(s.lhs_x, s.value(s.lhs_x)))
            .collect();
        if let Some(last) = self.subpolynomial_list.last() {
            pts.push(Point2D::new(self.max_x, last.value(self.max_x)));
        }
        pts
    }

    fn min_x(&self) -> f64 {
        self.subpolynomial_list[0].lhs_x
    }

    fn max_x(&self) -> f64 {
        self.max_x
    }
}
