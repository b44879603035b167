use std::any::Any;

use chrono::TimeDelta;

use crate::math::curve::boundarypolicy::{
    self,
    Boundaries
};
use crate::math::curve::curvecompatible::{
    CurveCompatible,
    as_curve
};
use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};
use crate::math::curve::nonparametriccurve::nonparametriccurve::Point2D;
use crate::math::curve::nonparametriccurve::splinecurve::SplineCurve;
use crate::math::statistics;
use crate::time::utility::seconds_to_timedelta;

pub const DEFAULT_ERROR_TOLERANCE: f64 = 0.80;

/// A function of one position (or time) variable with a possibly infinite
/// domain `[start, end)`.
///
/// Implementors supply the bounds and [`Curve::evaluate`]; lookups, sampling,
/// statistics and spline conversion are derived from those. Lookups outside
/// the domain follow the curve's [`Boundaries`].
///
/// `Send + Sync` lets one curve be shared between several anchors as
/// `Arc<dyn Curve>`.
pub trait Curve: Send + Sync {
    fn start(&self) -> f64 {
        0.0
    }

    fn end(&self) -> f64 {
        f64::INFINITY
    }

    /// Offset subtracted from every position before lookup.
    fn time_shift(&self) -> f64 {
        0.0
    }

    fn boundaries(&self) -> Boundaries {
        Boundaries::default()
    }

    /// Last position still inside the domain. Edge-based boundary policies
    /// (clamp, reflect, projections) anchor here on the upper side.
    fn last_position(&self) -> f64 {
        self.end()
    }

    /// The curve's own rule at an unshifted position. Called for in-domain
    /// positions and by boundary policies that extrapolate.
    fn evaluate(&self, position: f64) -> f64;

    fn as_any(&self) -> &dyn Any;

    // ─────────────────────────────────────────
    // Domain
    // ─────────────────────────────────────────

    fn is_discrete(&self) -> bool {
        self.start().is_finite() && self.end().is_finite()
    }

    /// `end - start`, or infinity for a non-discrete curve.
    fn length(&self) -> f64 {
        if self.is_discrete() {
            self.end() - self.start()
        } else {
            f64::INFINITY
        }
    }

    fn finite_length(&self) -> CurveResult<f64> {
        if self.is_discrete() {
            Ok(self.length())
        } else {
            Err(CurveError::non_discrete("take the length"))
        }
    }

    /// How long the curve lasts, in seconds (may be infinite).
    fn duration(&self) -> f64 {
        self.length()
    }

    fn timedelta(&self) -> CurveResult<TimeDelta> {
        let duration = self.duration();
        if !duration.is_finite() {
            return Err(CurveError::domain("an infinite curve has no timedelta"));
        }
        seconds_to_timedelta(duration)
    }

    fn is_infinite(&self) -> bool {
        !self.duration().is_finite()
    }

    fn has_endpoint(&self) -> bool {
        !self.is_infinite()
    }

    // ─────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────

    /// Value at `position`; `None` when the boundary policy yields no value.
    fn value_at(&self, position: f64) -> CurveResult<Option<f64>> {
        boundarypolicy::resolve(self, position - self.time_shift())
    }

    fn at(&self, position: f64) -> CurveResult<Option<f64>> {
        self.value_at(position)
    }

    fn at_many(&self, positions: &[f64]) -> CurveResult<Vec<Option<f64>>> {
        positions
            .iter()
            .map(|&position| self.value_at(position))
            .collect()
    }

    // ─────────────────────────────────────────
    // Sampling
    // ─────────────────────────────────────────

    /// Positions `start + i*step` below `stop`. Omitted bounds default to the
    /// curve's shifted domain.
    fn sample_positions(
        &self,
        start: Option<f64>,
        stop: Option<f64>,
        step: f64,
    ) -> CurveResult<Vec<f64>> {
        if !step.is_finite() || step <= 0.0 {
            return Err(CurveError::invalid_argument(format!(
                "sample step must be positive and finite, got {}",
                step
            )));
        }
        let start = match start {
            Some(start) => start,
            None if self.start().is_finite() => self.start() + self.time_shift(),
            None => return Err(CurveError::non_discrete("sample without a start")),
        };
        let stop = match stop {
            Some(stop) => stop,
            None if self.end().is_finite() => self.end() + self.time_shift(),
            None => return Err(CurveError::non_discrete("sample without an end")),
        };
        if !start.is_finite() || !stop.is_finite() {
            return Err(CurveError::non_discrete("sample an unbounded range"));
        }

        let count = ((stop - start) / step).ceil().max(0.0) as usize;
        Ok((0..count)
            .map(|i| start + i as f64 * step)
            .filter(|&position| position < stop)
            .collect())
    }

    /// Values over a discretized window. Positions where the boundary policy
    /// yields no value are `NaN`.
    fn samples(&self, start: Option<f64>, stop: Option<f64>, step: f64) -> CurveResult<Vec<f64>> {
        self.sample_positions(start, stop, step)?
            .into_iter()
            .map(|position| {
                self.value_at(position)
                    .map(|value| value.unwrap_or(f64::NAN))
            })
            .collect()
    }

    /// All default samples at unit step.
    fn all_samples(&self) -> CurveResult<Vec<f64>> {
        self.samples(None, None, 1.0)
    }

    fn points(&self, start: Option<f64>, stop: Option<f64>, step: f64) -> CurveResult<Vec<Point2D>> {
        let positions = self.sample_positions(start, stop, step)?;
        let values = self.samples(start, stop, step)?;
        Ok(positions
            .into_iter()
            .zip(values)
            .map(|(x, y)| Point2D::new(x, y))
            .collect())
    }

    /// Default sample points; the pairing of `sample_positions` and
    /// `all_samples`.
    fn all_points(&self) -> CurveResult<Vec<Point2D>> {
        self.points(None, None, 1.0)
    }

    /// Lazy values over `[start, end)` at unit step.
    fn iter(&self) -> CurveResult<Box<dyn Iterator<Item = f64> + '_>> {
        if !self.is_discrete() {
            return Err(CurveError::non_discrete("iterate"));
        }
        Ok(Box::new(CurveIter {
            curve: self,
            position: self.start() + self.time_shift(),
            stop: self.end() + self.time_shift()
        }))
    }

    // ─────────────────────────────────────────
    // Statistics over all_samples()
    // ─────────────────────────────────────────

    fn mean(&self) -> CurveResult<f64> {
        Ok(statistics::mean(&non_empty(self.all_samples()?)?))
    }

    fn stdev(&self) -> CurveResult<f64> {
        Ok(statistics::stdev(&non_empty(self.all_samples()?)?))
    }

    /// Coefficient of variation as `mean / stdev`.
    fn cov(&self) -> CurveResult<f64> {
        Ok(self.mean()? / self.stdev()?)
    }

    fn min(&self) -> CurveResult<f64> {
        Ok(statistics::min(&non_empty(self.all_samples()?)?))
    }

    fn max(&self) -> CurveResult<f64> {
        Ok(statistics::max(&non_empty(self.all_samples()?)?))
    }

    fn value_range(&self) -> CurveResult<(f64, f64)> {
        Ok((self.min()?, self.max()?))
    }

    fn range_amount(&self) -> CurveResult<f64> {
        let (min, max) = self.value_range()?;
        Ok(max - min)
    }

    // ─────────────────────────────────────────
    // Similarity
    // ─────────────────────────────────────────

    /// Pearson correlation between both curves' natural samples, truncated to
    /// the shorter sequence.
    fn correlate(&self, other: &CurveCompatible) -> CurveResult<f64> {
        Ok(statistics::pearson(&self.all_samples()?, &other.flatten()?))
    }

    /// Coefficient of determination of `other` as a predictor of this curve.
    fn r_squared(&self, other: &CurveCompatible) -> CurveResult<f64> {
        Ok(statistics::r_squared(&self.all_samples()?, &other.flatten()?))
    }

    fn compare(&self, other: &CurveCompatible) -> CurveResult<f64> {
        self.r_squared(other)
    }

    /// Pearson correlation with both curves sampled on the same grid.
    fn correlate_over(
        &self,
        other: &CurveCompatible,
        start: f64,
        stop: f64,
        step: f64,
    ) -> CurveResult<f64> {
        let other = as_curve(other.clone())?;
        Ok(statistics::pearson(
            &self.samples(Some(start), Some(stop), step)?,
            &other.samples(Some(start), Some(stop), step)?,
        ))
    }

    fn r_squared_over(
        &self,
        other: &CurveCompatible,
        start: f64,
        stop: f64,
        step: f64,
    ) -> CurveResult<f64> {
        let other = as_curve(other.clone())?;
        Ok(statistics::r_squared(
            &self.samples(Some(start), Some(stop), step)?,
            &other.samples(Some(start), Some(stop), step)?,
        ))
    }

    // ─────────────────────────────────────────
    // Spline conversion
    // ─────────────────────────────────────────

    /// Best-fit smoothing spline through this curve's own sample points.
    ///
    /// `error_tolerance` is the fraction (0..=1) of the value range each
    /// sample may deviate by; the residual budget is `N * (tolerance *
    /// range)^2`. Percentages are not accepted: pass `0.8`, not `80`.
    fn to_spline(&self, error_tolerance: f64) -> CurveResult<SplineCurve> {
        if !(0.0..=1.0).contains(&error_tolerance) {
            return Err(CurveError::invalid_argument(format!(
                "error tolerance must be within [0, 1], got {}",
                error_tolerance
            )));
        }
        let points = self.all_points()?;
        if points.is_empty() {
            return Err(CurveError::insufficient_points(1, 0));
        }
        let allowed_deviation = error_tolerance * self.range_amount()?;
        let smoothing = points.len() as f64 * allowed_deviation.powi(2);
        SplineCurve::with_smoothing(points, smoothing)
    }
}

fn non_empty(samples: Vec<f64>) -> CurveResult<Vec<f64>> {
    if samples.is_empty() {
        Err(CurveError::insufficient_points(1, 0))
    } else {
        Ok(samples)
    }
}

struct CurveIter<'a, C: Curve + ?Sized> {
    curve: &'a C,
    position: f64,
    stop: f64
}

impl<C: Curve + ?Sized> Iterator for CurveIter<'_, C> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.position >= self.stop {
            return None;
        }
        let value = self
            .curve
            .value_at(self.position)
            .ok()
            .flatten()
            .unwrap_or(f64::NAN);
        self.position += 1.0;
        Some(value)
    }
}
