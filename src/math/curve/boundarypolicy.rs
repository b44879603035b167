use serde::{
    Deserialize,
    Serialize
};

use crate::math::curve::curve::Curve;
use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};
use crate::math::curve::nonparametriccurve::lagrangepolynomial::LagrangePolynomial;
use crate::math::curve::nonparametriccurve::nonparametriccurve::Point2D;

/// What to do when a lookup falls outside `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// The lookup yields no value.
    ReturnNone,
    /// The lookup fails with `CurveError::Boundary`.
    Raise,
    /// Hold the value at the nearest edge.
    Clamp,
    /// Wrap the position back into range modulo the domain length, over the
    /// half-open `[start, end)`. When `end` is itself the last in-domain
    /// position (a spline's last knot), `end` keeps its own value but
    /// `end + length` wraps to `start`.
    Loop,
    /// Mirror the position back into range off the nearest edge.
    Reflect,
    /// Extrapolate along the local slope at the edge.
    LinearProjection,
    /// Extrapolate along a cubic through the four edge-side points.
    CubicProjection,
    /// Evaluate the curve's own rule beyond its nominal domain.
    Extend
}

/// Pair of policies for the pre-start and post-end sides of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundaries {
    pub at_start: BoundaryPolicy,
    pub at_end: BoundaryPolicy
}

impl Boundaries {
    pub fn new(at_start: BoundaryPolicy, at_end: BoundaryPolicy) -> Boundaries {
        Boundaries { at_start, at_end }
    }

    pub fn both(policy: BoundaryPolicy) -> Boundaries {
        Boundaries::new(policy, policy)
    }

    pub fn extend() -> Boundaries {
        Boundaries::both(BoundaryPolicy::Extend)
    }
}

impl Default for Boundaries {
    fn default() -> Self {
        Boundaries::both(BoundaryPolicy::Clamp)
    }
}

/// Look up `position` (already time-shifted) on `curve`, applying the curve's
/// boundary policies outside `[start, end)`.
pub fn resolve<C: Curve + ?Sized>(curve: &C, position: f64) -> CurveResult<Option<f64>> {
    if position.is_nan() {
        return Err(CurveError::invalid_argument("position is NaN"));
    }
    let start = curve.start();
    let end = curve.end();
    // The last in-domain position counts as inside even when it equals `end`,
    // which closes the domain of curves ending on a knot.
    if (position >= start && position < end) || position == curve.last_position() {
        return Ok(Some(curve.evaluate(position)));
    }

    let before_start = position < start;
    let boundaries = curve.boundaries();
    let policy = if before_start {
        boundaries.at_start
    } else {
        boundaries.at_end
    };

    // Edge-side geometry: the in-domain edge nearest to `position` and the
    // direction pointing back into the domain.
    let upper = curve.last_position();
    let (edge, inward) = if before_start {
        (start, 1.0)
    } else {
        (upper, -1.0)
    };
    let width = upper - start;

    match policy {
        BoundaryPolicy::ReturnNone => Ok(None),
        BoundaryPolicy::Raise => Err(CurveError::boundary(position, start, end)),
        BoundaryPolicy::Clamp => Ok(Some(curve.evaluate(edge))),
        BoundaryPolicy::Extend => Ok(Some(curve.evaluate(position))),
        BoundaryPolicy::Loop => {
            let length = end - start;
            if !length.is_finite() {
                return Err(CurveError::non_discrete("loop around"));
            }
            if length <= 0.0 {
                return Err(CurveError::domain("cannot loop over an empty domain"));
            }
            let mut wrapped = start + (position - start).rem_euclid(length);
            if wrapped >= end {
                wrapped = start;
            }
            Ok(Some(curve.evaluate(wrapped)))
        },
        BoundaryPolicy::Reflect => {
            if !width.is_finite() {
                return Err(CurveError::non_discrete("reflect"));
            }
            if width <= 0.0 {
                return Ok(Some(curve.evaluate(start)));
            }
            let u = (position - start).rem_euclid(2.0 * width);
            let mirrored = if u <= width {
                start + u
            } else {
                start + 2.0 * width - u
            };
            Ok(Some(curve.evaluate(mirrored)))
        },
        BoundaryPolicy::LinearProjection => {
            let step = projection_step(width, 2.0);
            let edge_value = curve.evaluate(edge);
            if step <= 0.0 {
                return Ok(Some(edge_value));
            }
            let inner = edge + inward * step;
            let slope = (edge_value - curve.evaluate(inner)) / (edge - inner);
            Ok(Some(edge_value + slope * (position - edge)))
        },
        BoundaryPolicy::CubicProjection => {
            let step = projection_step(width, 3.0);
            if step <= 0.0 {
                return Ok(Some(curve.evaluate(edge)));
            }
            let points = (0..4)
                .map(|i| {
                    let x = edge + inward * step * i as f64;
                    Point2D::new(x, curve.evaluate(x))
                })
                .collect();
            let cubic = LagrangePolynomial::new(points)
                .ok_or_else(|| CurveError::numerical("cubic projection has no points"))?;
            Ok(Some(cubic.value(position)))
        }
    }
}

/// Unit step, shrunk so that `divisions` steps still fit inside the domain.
fn projection_step(width: f64, divisions: f64) -> f64 {
    if width.is_finite() {
        (width / divisions).min(1.0)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::curve::nonparametriccurve::discretepointcurve::DiscretePointCurve;
    use crate::math::curve::nonparametriccurve::splinecurve::SplineCurve;

    fn ramp(boundaries: Boundaries) -> DiscretePointCurve {
        DiscretePointCurve::new(vec![0.0, 1.0, 2.0, 3.0, 4.0]).with_boundaries(boundaries)
    }

    #[test]
    fn test_return_none_and_raise() {
        let curve = ramp(Boundaries::new(BoundaryPolicy::ReturnNone, BoundaryPolicy::Raise));
        assert_eq!(resolve(&curve, -1.0).unwrap(), None);
        let err = resolve(&curve, 7.0).unwrap_err();
        assert!(err.is_boundary());
    }

    #[test]
    fn test_clamp_holds_edges() {
        let curve = ramp(Boundaries::default());
        assert_eq!(resolve(&curve, -3.0).unwrap(), Some(0.0));
        assert_eq!(resolve(&curve, 42.0).unwrap(), Some(4.0));
    }

    #[test]
    fn test_loop_wraps_by_domain_length() {
        let curve = ramp(Boundaries::both(BoundaryPolicy::Loop));
        assert_eq!(resolve(&curve, 6.0).unwrap(), Some(1.0));
        assert_eq!(resolve(&curve, -1.0).unwrap(), Some(4.0));
    }

    #[test]
    fn test_reflect_mirrors_off_edges() {
        let curve = ramp(Boundaries::both(BoundaryPolicy::Reflect));
        assert_eq!(resolve(&curve, 5.0).unwrap(), Some(3.0));
        assert_eq!(resolve(&curve, -2.0).unwrap(), Some(2.0));
    }

    #[test]
    fn test_linear_projection_follows_slope() {
        let curve = ramp(Boundaries::both(BoundaryPolicy::LinearProjection));
        assert_relative_eq!(resolve(&curve, 7.0).unwrap().unwrap(), 7.0, epsilon = 1e-12);
        assert_relative_eq!(resolve(&curve, -2.0).unwrap().unwrap(), -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cubic_projection_extends_polynomial() {
        let squares = DiscretePointCurve::new(vec![0.0, 1.0, 4.0, 9.0, 16.0])
            .with_boundaries(Boundaries::both(BoundaryPolicy::CubicProjection));
        assert_relative_eq!(resolve(&squares, 6.0).unwrap().unwrap(), 36.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nan_position_is_rejected() {
        let curve = ramp(Boundaries::default());
        assert!(resolve(&curve, f64::NAN).is_err());
    }

    #[test]
    fn test_loop_on_closed_spline_end() {
        let spline = SplineCurve::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(2.0, 4.0),
            Point2D::new(3.0, 9.0),
        ])
        .unwrap()
        .with_boundaries(Boundaries::both(BoundaryPolicy::Loop));
        assert_relative_eq!(resolve(&spline, 3.0).unwrap().unwrap(), 9.0, epsilon = 1e-9);
        assert_relative_eq!(resolve(&spline, 6.0).unwrap().unwrap(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(resolve(&spline, 4.0).unwrap().unwrap(), 1.0, epsilon = 1e-9);
    }
}
