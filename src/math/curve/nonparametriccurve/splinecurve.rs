use std::any::Any;
use std::fmt;
use std::ops::{
    Add,
    Div,
    Mul,
    Sub
};

use tracing::debug;

use crate::math::curve::boundarypolicy::Boundaries;
use crate::math::curve::curve::{
    Curve,
    DEFAULT_ERROR_TOLERANCE
};
use crate::math::curve::curvecompatible::CurveCompatible;
use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    Point2D,
    points_from_values
};
use crate::math::smoothingspline::SmoothingSpline;

const VALUES_SMOOTHING: f64 = 1.0;

/// A cubic spline fitted through (or near) a set of control points.
///
/// The domain is `[x_first, x_last]`. With zero smoothing the spline
/// interpolates every control point; otherwise it is the smoothest cubic whose
/// squared deviation from the control points stays within the smoothing
/// budget.
#[derive(Clone)]
pub struct SplineCurve {
    control_points: Vec<Point2D>,
    smoothing: f64,
    spline: SmoothingSpline,
    boundaries: Boundaries,
    time_shift: f64
}

impl SplineCurve {
    /// Exact interpolation through `points`.
    pub fn new(points: Vec<Point2D>) -> CurveResult<SplineCurve> {
        SplineCurve::with_smoothing(points, 0.0)
    }

    /// Values at implicit positions `0..N`, lightly smoothed.
    pub fn from_values(values: Vec<f64>) -> CurveResult<SplineCurve> {
        SplineCurve::with_smoothing(points_from_values(&values), VALUES_SMOOTHING)
    }

    pub fn with_smoothing(points: Vec<Point2D>, smoothing: f64) -> CurveResult<SplineCurve> {
        let spline = SmoothingSpline::fit(&points, smoothing)?;
        Ok(SplineCurve {
            control_points: points,
            smoothing,
            spline,
            boundaries: Boundaries::default(),
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

    pub fn control_points(&self) -> &[Point2D] {
        &self.control_points
    }

    /// Refit to new control points with the current smoothing budget.
    pub fn set_control_points(&mut self, points: Vec<Point2D>) -> CurveResult<()> {
        self.spline = SmoothingSpline::fit(&points, self.smoothing)?;
        self.control_points = points;
        Ok(())
    }

    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    pub fn residual(&self) -> f64 {
        self.spline.residual()
    }

    pub fn derivative(&self, position: f64) -> f64 {
        self.spline.derivative(position - self.time_shift)
    }

    fn fitted_values(&self) -> Vec<f64> {
        self.spline
            .fitted_points()
            .iter()
            .map(|pt| pt.y())
            .collect()
    }

    /// Elementwise `self ∘ operand` at this spline's control positions,
    /// interpolated exactly by a new spline.
    pub fn combine(&self, operand: SplineOperand<'_>, op: ArithmeticOp) -> CurveResult<SplineCurve> {
        let fallback;
        let rhs: Option<&dyn Curve> = match operand {
            SplineOperand::Scalar(_) => None,
            SplineOperand::Spline(spline) => Some(spline),
            SplineOperand::Curve(curve) if curve.is_discrete() => {
                fallback = curve.to_spline(DEFAULT_ERROR_TOLERANCE)?;
                Some(&fallback)
            },
            SplineOperand::Curve(curve) => Some(curve)
        };

        let mut points = Vec::with_capacity(self.control_points.len());
        for knot in self.spline.fitted_points() {
            let position = knot.x() + self.time_shift;
            let rhs_value = match (operand, rhs) {
                (SplineOperand::Scalar(value), _) => value,
                (_, Some(curve)) => curve
                    .value_at(position)?
                    .ok_or(CurveError::MissingValue { position })?,
                (_, None) => return Err(CurveError::MissingValue { position })
            };
            points.push(Point2D::new(knot.x(), op.apply(knot.y(), rhs_value)));
        }
        debug!(?op, knots = points.len(), "combined spline");

        Ok(SplineCurve::new(points)?
            .with_boundaries(self.boundaries)
            .with_time_shift(self.time_shift))
    }

    /// [`SplineCurve::combine`] with a curve-compatible operand. Nested
    /// sequences are rejected.
    pub fn apply(&self, operand: &CurveCompatible, op: ArithmeticOp) -> CurveResult<SplineCurve> {
        match operand {
            CurveCompatible::Scalar(value) => self.combine(SplineOperand::Scalar(*value), op),
            CurveCompatible::Curve(curve) => self.combine(SplineOperand::from(curve.as_ref()), op),
            CurveCompatible::Nested(_) => Err(CurveError::unsupported(format!(
                "cannot {} a nested sequence and a spline",
                op.verb()
            )))
        }
    }
}

impl fmt::Debug for SplineCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplineCurve")
            .field("control_points", &self.control_points)
            .field("smoothing", &self.smoothing)
            .field("boundaries", &self.boundaries)
            .field("time_shift", &self.time_shift)
            .finish()
    }
}

impl Curve for SplineCurve {
    fn start(&self) -> f64 {
        self.control_points[0].x()
    }

    fn end(&self) -> f64 {
        self.control_points[self.control_points.len() - 1].x()
    }

    fn time_shift(&self) -> f64 {
        self.time_shift
    }

    fn boundaries(&self) -> Boundaries {
        self.boundaries
    }

    fn evaluate(&self, position: f64) -> f64 {
        self.spline.value(position)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    /// Without bounds, the fitted values at the control positions.
    fn samples(&self, start: Option<f64>, stop: Option<f64>, step: f64) -> CurveResult<Vec<f64>> {
        if start.is_none() && stop.is_none() {
            return Ok(self.fitted_values());
        }
        self.sample_positions(start, stop, step)?
            .into_iter()
            .map(|position| {
                self.value_at(position)
                    .map(|value| value.unwrap_or(f64::NAN))
            })
            .collect()
    }

    fn points(&self, start: Option<f64>, stop: Option<f64>, step: f64) -> CurveResult<Vec<Point2D>> {
        if start.is_none() && stop.is_none() {
            return Ok(self
                .spline
                .fitted_points()
                .iter()
                .map(|pt| Point2D::new(pt.x() + self.time_shift, pt.y()))
                .collect());
        }
        let positions = self.sample_positions(start, stop, step)?;
        let values = self.samples(start, stop, step)?;
        Ok(positions
            .into_iter()
            .zip(values)
            .map(|(x, y)| Point2D::new(x, y))
            .collect())
    }

    fn to_spline(&self, _error_tolerance: f64) -> CurveResult<SplineCurve> {
        Ok(self.clone())
    }
}

// ─────────────────────────────────────────────
// Arithmetic
// ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div
}

impl ArithmeticOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            ArithmeticOp::Add => lhs + rhs,
            ArithmeticOp::Sub => lhs - rhs,
            ArithmeticOp::Mul => lhs * rhs,
            ArithmeticOp::Div => lhs / rhs
        }
    }

    fn verb(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "subtract",
            ArithmeticOp::Mul => "multiply",
            ArithmeticOp::Div => "divide"
        }
    }
}

/// Right-hand side of a spline arithmetic operation.
#[derive(Clone, Copy)]
pub enum SplineOperand<'a> {
    Scalar(f64),
    Spline(&'a SplineCurve),
    /// Any other curve; finite ones are approximated by their own spline.
    Curve(&'a dyn Curve)
}

impl<'a> From<&'a dyn Curve> for SplineOperand<'a> {
    fn from(curve: &'a dyn Curve) -> Self {
        match curve.as_any().downcast_ref::<SplineCurve>() {
            Some(spline) => SplineOperand::Spline(spline),
            None => SplineOperand::Curve(curve)
        }
    }
}

macro_rules! impl_spline_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait<f64> for &SplineCurve {
            type Output = CurveResult<SplineCurve>;

            fn $method(self, rhs: f64) -> Self::Output {
                self.combine(SplineOperand::Scalar(rhs), $op)
            }
        }

        impl $trait<&SplineCurve> for &SplineCurve {
            type Output = CurveResult<SplineCurve>;

            fn $method(self, rhs: &SplineCurve) -> Self::Output {
                self.combine(SplineOperand::Spline(rhs), $op)
            }
        }

        impl<'a> $trait<&'a dyn Curve> for &SplineCurve {
            type Output = CurveResult<SplineCurve>;

            fn $method(self, rhs: &'a dyn Curve) -> Self::Output {
                self.combine(SplineOperand::from(rhs), $op)
            }
        }
    };
}

impl_spline_op!(Add, add, ArithmeticOp::Add);
impl_spline_op!(Sub, sub, ArithmeticOp::Sub);
impl_spline_op!(Mul, mul, ArithmeticOp::Mul);
impl_spline_op!(Div, div, ArithmeticOp::Div);

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::curve::nonparametriccurve::discretepointcurve::DiscretePointCurve;
    use crate::math::curve::parametriccurve::quadraticcurve::QuadraticCurve;

    fn sample_spline() -> SplineCurve {
        SplineCurve::new(points_from_values(&[1.0, 3.0, 2.0, 5.0, 4.0])).unwrap()
    }

    #[test]
    fn test_interpolates_control_points() {
        let spline = sample_spline();
        for pt in spline.control_points() {
            assert_relative_eq!(spline.value_at(pt.x()).unwrap().unwrap(), pt.y(), epsilon = 1e-9);
        }
        assert_eq!(spline.start(), 0.0);
        assert_eq!(spline.end(), 4.0);
    }

    #[test]
    fn test_unbounded_samples_are_fitted_values() {
        let spline = sample_spline();
        let samples = spline.all_samples().unwrap();
        assert_eq!(samples.len(), 5);
        assert_relative_eq!(samples[3], 5.0, epsilon = 1e-9);
        assert_eq!(spline.all_points().unwrap()[4].x(), 4.0);
    }

    #[test]
    fn test_from_values_smooths() {
        let spline = SplineCurve::from_values(vec![0.0, 1.2, 0.7, 2.1, 1.6, 3.2]).unwrap();
        assert_relative_eq!(spline.residual(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_unordered_points() {
        let points = vec![Point2D::new(1.0, 0.0), Point2D::new(0.0, 1.0)];
        assert!(SplineCurve::new(points).is_err());
    }

    #[test]
    fn test_add_self_doubles() {
        let spline = sample_spline();
        let doubled = (&spline + &spline).unwrap();
        let scaled = (&spline * 2.0_f64).unwrap();
        let lhs = doubled.all_samples().unwrap();
        let rhs = scaled.all_samples().unwrap();
        for (a, b) in lhs.iter().zip(rhs.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_scalar_ops() {
        let spline = sample_spline();
        let shifted = (&spline - 1.0_f64).unwrap();
        assert_relative_eq!(shifted.value_at(1.0).unwrap().unwrap(), 2.0, epsilon = 1e-9);
        let halved = (&spline / 2.0_f64).unwrap();
        assert_relative_eq!(halved.value_at(3.0).unwrap().unwrap(), 2.5, epsilon = 1e-9);
    }

    #[test]
    fn test_infinite_curve_operand_is_sampled_directly() {
        let spline = sample_spline();
        let line = QuadraticCurve::new(vec![1.0, 0.0]);
        let sum = (&spline + &line as &dyn Curve).unwrap();
        assert_relative_eq!(sum.value_at(2.0).unwrap().unwrap(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_discrete_operand_goes_through_spline() {
        let spline = sample_spline();
        let flat = DiscretePointCurve::new(vec![1.0; 5]);
        let sum = (&spline + &flat as &dyn Curve).unwrap();
        assert_relative_eq!(sum.value_at(1.0).unwrap().unwrap(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nested_operand_is_unsupported() {
        let spline = sample_spline();
        let nested = CurveCompatible::from(vec![1.0, 2.0]);
        assert!(spline.apply(&nested, ArithmeticOp::Add).unwrap_err().is_unsupported());
        let scalar = CurveCompatible::from(3.0);
        let sum = spline.apply(&scalar, ArithmeticOp::Add).unwrap();
        assert_relative_eq!(sum.value_at(0.0).unwrap().unwrap(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_to_spline_returns_clone() {
        let spline = sample_spline();
        let copy = spline.to_spline(0.5).unwrap();
        assert_eq!(copy.control_points(), spline.control_points());
    }
}
