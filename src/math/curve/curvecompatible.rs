use std::sync::Arc;

use tracing::debug;

use crate::math::curve::curve::Curve;
use crate::math::curve::curveerror::CurveResult;
use crate::math::curve::nonparametriccurve::discretepointcurve::DiscretePointCurve;
use crate::math::curve::nonparametriccurve::nonparametriccurve::points_from_values;
use crate::math::curve::nonparametriccurve::splinecurve::SplineCurve;
use crate::math::curve::parametriccurve::gaussiancurve::GaussianCurve;
use crate::math::curve::parametriccurve::quadraticcurve::QuadraticCurve;
use crate::math::curve::parametriccurve::sinecurve::SineCurve;
use crate::math::polyfit::polyfit;

/// Anything a curve factory accepts: a scalar, an existing curve, or an
/// arbitrarily nested sequence of those.
#[derive(Clone)]
pub enum CurveCompatible {
    Scalar(f64),
    Curve(Arc<dyn Curve>),
    Nested(Vec<CurveCompatible>)
}

impl CurveCompatible {
    /// Depth-first flattening into one value sequence. A curve contributes
    /// its natural samples.
    pub fn flatten(&self) -> CurveResult<Vec<f64>> {
        let mut values = Vec::new();
        self.flatten_into(&mut values)?;
        Ok(values)
    }

    fn flatten_into(&self, values: &mut Vec<f64>) -> CurveResult<()> {
        match self {
            CurveCompatible::Scalar(value) => values.push(*value),
            CurveCompatible::Curve(curve) => values.extend(curve.all_samples()?),
            CurveCompatible::Nested(items) => {
                for item in items {
                    item.flatten_into(values)?;
                }
            }
        }
        Ok(())
    }

    pub fn curve(&self) -> Option<&Arc<dyn Curve>> {
        match self {
            CurveCompatible::Curve(curve) => Some(curve),
            _ => None
        }
    }
}

impl From<f64> for CurveCompatible {
    fn from(value: f64) -> Self {
        CurveCompatible::Scalar(value)
    }
}

impl From<Vec<f64>> for CurveCompatible {
    fn from(values: Vec<f64>) -> Self {
        CurveCompatible::Nested(values.into_iter().map(CurveCompatible::Scalar).collect())
    }
}

impl From<&[f64]> for CurveCompatible {
    fn from(values: &[f64]) -> Self {
        CurveCompatible::from(values.to_vec())
    }
}

impl From<Vec<CurveCompatible>> for CurveCompatible {
    fn from(items: Vec<CurveCompatible>) -> Self {
        CurveCompatible::Nested(items)
    }
}

impl From<Arc<dyn Curve>> for CurveCompatible {
    fn from(curve: Arc<dyn Curve>) -> Self {
        CurveCompatible::Curve(curve)
    }
}

macro_rules! impl_from_curve {
    ($($curve:ty),+ $(,)?) => {
        $(
            impl From<$curve> for CurveCompatible {
                fn from(curve: $curve) -> Self {
                    CurveCompatible::Curve(Arc::new(curve))
                }
            }
        )+
    };
}

impl_from_curve!(
    DiscretePointCurve,
    SplineCurve,
    GaussianCurve,
    QuadraticCurve,
    SineCurve
);

/// The curve itself, or a `DiscretePointCurve` over the flattened values.
pub fn as_curve(value: CurveCompatible) -> CurveResult<Arc<dyn Curve>> {
    match value {
        CurveCompatible::Curve(curve) => Ok(curve),
        other => Ok(Arc::new(DiscretePointCurve::new(other.flatten()?)))
    }
}

pub fn as_discrete_point_curve(value: &CurveCompatible) -> CurveResult<DiscretePointCurve> {
    if let Some(existing) = value
        .curve()
        .and_then(|curve| curve.as_any().downcast_ref::<DiscretePointCurve>())
    {
        return Ok(existing.clone());
    }
    Ok(DiscretePointCurve::new(value.flatten()?))
}

/// A clone when `value` already is a quadratic curve, otherwise a least
/// squares polynomial of `order` through its sample points.
pub fn as_quadratic_curve(value: &CurveCompatible, order: usize) -> CurveResult<QuadraticCurve> {
    if let Some(existing) = value
        .curve()
        .and_then(|curve| curve.as_any().downcast_ref::<QuadraticCurve>())
    {
        return Ok(existing.clone());
    }

    let points = match value.curve() {
        Some(curve) => curve.all_points()?,
        None => points_from_values(&value.flatten()?)
    };
    let coefficients = polyfit(&points, order)?;
    debug!(order, points = points.len(), ?coefficients, "fitted quadratic curve");
    Ok(QuadraticCurve::new(coefficients))
}
