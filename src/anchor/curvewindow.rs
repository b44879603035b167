use std::any::Any;
use std::sync::Arc;

use crate::math::curve::boundarypolicy::{
    Boundaries,
    BoundaryPolicy
};
use crate::math::curve::curve::Curve;
use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};

/// Finite slice `[offset, offset + length)` of another curve, re-based to
/// start at zero. Positions outside the slice yield no value; inside it the
/// inner curve's lookup result is returned as is, errors and gaps included.
#[derive(Clone)]
pub struct CurveWindow {
    inner: Arc<dyn Curve>,
    offset: f64,
    length: f64
}

impl CurveWindow {
    pub fn new(inner: Arc<dyn Curve>, offset: f64, length: f64) -> CurveWindow {
        CurveWindow { inner, offset, length }
    }

    pub fn inner(&self) -> &Arc<dyn Curve> {
        &self.inner
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }
}

impl Curve for CurveWindow {
    fn end(&self) -> f64 {
        self.length
    }

    fn boundaries(&self) -> Boundaries {
        Boundaries::both(BoundaryPolicy::ReturnNone)
    }

    fn value_at(&self, position: f64) -> CurveResult<Option<f64>> {
        if position.is_nan() {
            return Err(CurveError::invalid_argument("position is NaN"));
        }
        if position < 0.0 || position >= self.length {
            return Ok(None);
        }
        self.inner.value_at(self.offset + position)
    }

    /// Infallible view for callers that bypass [`CurveWindow::value_at`];
    /// failed or absent inner values read as `NaN`.
    fn evaluate(&self, position: f64) -> f64 {
        self.inner
            .value_at(self.offset + position)
            .ok()
            .flatten()
            .unwrap_or(f64::NAN)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::curve::nonparametriccurve::discretepointcurve::DiscretePointCurve;
    use crate::math::curve::parametriccurve::quadraticcurve::QuadraticCurve;

    #[test]
    fn test_window_rebases_positions() {
        let line: Arc<dyn Curve> = Arc::new(QuadraticCurve::new(vec![1.0, 0.0]));
        let window = CurveWindow::new(line, 10.0, 3.0);
        assert_eq!(window.all_samples().unwrap(), vec![10.0, 11.0, 12.0]);
        assert_eq!(window.value_at(5.0).unwrap(), None);
        assert!(window.has_endpoint());
    }

    #[test]
    fn test_window_forwards_inner_lookup() {
        let raising: Arc<dyn Curve> = Arc::new(
            DiscretePointCurve::new(vec![1.0, 2.0, 3.0])
                .with_boundaries(Boundaries::both(BoundaryPolicy::Raise)),
        );
        let window = CurveWindow::new(raising, 1.0, 10.0);
        assert_eq!(window.value_at(1.0).unwrap(), Some(3.0));
        assert!(window.value_at(4.0).unwrap_err().is_boundary());
        assert!(window.samples(None, None, 1.0).is_err());
        assert_eq!(window.value_at(10.0).unwrap(), None);

        let gapped: Arc<dyn Curve> = Arc::new(
            DiscretePointCurve::new(vec![1.0, 2.0, 3.0])
                .with_boundaries(Boundaries::both(BoundaryPolicy::ReturnNone)),
        );
        let window = CurveWindow::new(gapped, 0.0, 10.0);
        assert_eq!(window.value_at(5.0).unwrap(), None);
        assert!(window.evaluate(5.0).is_nan());
    }
}
