use std::sync::Arc;

use chrono::{
    DateTime,
    TimeDelta,
    Utc
};
use tracing::debug;

use crate::anchor::curvewindow::CurveWindow;
use crate::anchor::timebound::TimeBound;
use crate::math::curve::boundarypolicy::BoundaryPolicy;
use crate::math::curve::curve::Curve;
use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};
use crate::time::utility::timedelta_to_seconds;

const PLOT_POINTS: i32 = 100;

/// A shared curve pinned to a wall-clock start time. Positions on the curve
/// are seconds since `start_time`.
#[derive(Clone)]
pub struct CurveAnchor {
    curve: Arc<dyn Curve>,
    start_time: DateTime<Utc>
}

impl CurveAnchor {
    /// `start_time` defaults to now.
    pub fn new(curve: Arc<dyn Curve>, start_time: Option<DateTime<Utc>>) -> CurveAnchor {
        CurveAnchor {
            curve,
            start_time: start_time.unwrap_or_else(Utc::now)
        }
    }

    pub fn curve(&self) -> &Arc<dyn Curve> {
        &self.curve
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Seconds, possibly infinite.
    pub fn duration(&self) -> f64 {
        self.curve.duration()
    }

    pub fn timedelta(&self) -> CurveResult<TimeDelta> {
        self.curve.timedelta()
    }

    pub fn is_infinite(&self) -> bool {
        self.curve.is_infinite()
    }

    pub fn has_endpoint(&self) -> bool {
        self.curve.has_endpoint()
    }

    pub fn end_time(&self) -> CurveResult<DateTime<Utc>> {
        if self.is_infinite() {
            return Err(CurveError::domain("an infinite curve has no end time"));
        }
        TimeBound::Relative(self.timedelta()?).resolve(self.start_time)
    }

    fn relative_seconds(&self, timestamp: DateTime<Utc>) -> f64 {
        timedelta_to_seconds(timestamp - self.start_time)
    }

    pub fn value_at(&self, timestamp: DateTime<Utc>) -> CurveResult<Option<f64>> {
        let position = self.relative_seconds(timestamp);
        if position < 0.0 && self.curve.boundaries().at_start == BoundaryPolicy::Raise {
            return Err(CurveError::boundary(position, self.curve.start(), self.curve.end()));
        }
        self.curve.value_at(position)
    }

    /// Concrete `[start, end)` for optional bounds. An open end falls back to
    /// the anchor's end time, then to `max_time`, then to one second.
    fn normalize_window(
        &self,
        start: Option<TimeBound>,
        end: Option<TimeBound>,
        max_time: Option<TimeBound>,
    ) -> CurveResult<(DateTime<Utc>, DateTime<Utc>)> {
        let start = match start {
            Some(bound) => bound.resolve(self.start_time)?,
            None => self.start_time
        };
        let end = match (end, max_time) {
            (Some(bound), _) => bound.resolve(self.start_time)?,
            (None, _) if self.has_endpoint() => self.end_time()?,
            (None, Some(bound)) => bound.resolve(self.start_time)?,
            (None, None) => {
                debug!("infinite curve without max_time, clamping window to one second");
                TimeBound::Relative(TimeDelta::seconds(1)).resolve(start)?
            }
        };
        Ok((start, end))
    }

    /// Timestamps and values at a fixed interval over `[start, end)`.
    /// Positions without a value are `NaN`.
    pub fn get_points(
        &self,
        sample_interval: TimeDelta,
        start: Option<TimeBound>,
        end: Option<TimeBound>,
        max_time: Option<TimeBound>,
    ) -> CurveResult<(Vec<DateTime<Utc>>, Vec<f64>)> {
        if sample_interval <= TimeDelta::zero() {
            return Err(CurveError::invalid_argument(format!(
                "sample interval must be positive, got {}",
                sample_interval
            )));
        }
        let (start, end) = self.normalize_window(start, end, max_time)?;

        let mut timestamps = Vec::new();
        let mut values = Vec::new();
        let mut timestamp = start;
        while timestamp < end {
            timestamps.push(timestamp);
            values.push(self.value_at(timestamp)?.unwrap_or(f64::NAN));
            timestamp = TimeBound::Relative(sample_interval).resolve(timestamp)?;
        }
        Ok((timestamps, values))
    }

    /// A hundred evenly spaced points over the window, for rendering. Fails
    /// when the window is too short to hold a hundred distinct timestamps.
    pub fn get_plot_points(
        &self,
        start: Option<TimeBound>,
        end: Option<TimeBound>,
        max_time: Option<TimeBound>,
    ) -> CurveResult<(Vec<DateTime<Utc>>, Vec<f64>)> {
        let (start, end) = self.normalize_window(start, end, max_time)?;
        let interval = (end - start) / PLOT_POINTS;
        if interval <= TimeDelta::zero() {
            return Err(CurveError::invalid_argument(format!(
                "window from {} to {} is too short for {} plot points",
                start, end, PLOT_POINTS
            )));
        }
        self.get_points(
            interval,
            Some(TimeBound::Absolute(start)),
            Some(TimeBound::Absolute(end)),
            None,
        )
    }

    /// A finite anchor over `[start, end)` of this one.
    pub fn get_window(
        &self,
        start: Option<TimeBound>,
        end: Option<TimeBound>,
        max_time: Option<TimeBound>,
    ) -> CurveResult<CurveAnchor> {
        let (start, end) = self.normalize_window(start, end, max_time)?;
        let length = timedelta_to_seconds(end - start);
        if length <= 0.0 {
            return Err(CurveError::invalid_argument(format!(
                "window end {} is not after its start {}",
                end, start
            )));
        }
        let window = CurveWindow::new(self.curve.clone(), self.relative_seconds(start), length);
        Ok(CurveAnchor::new(Arc::new(window), Some(start)))
    }
}

/// Entry point for pinning a shared curve to a start time.
pub trait StartAnchor {
    fn start_anchor(&self, start_time: Option<DateTime<Utc>>) -> CurveAnchor;
}

impl StartAnchor for Arc<dyn Curve> {
    fn start_anchor(&self, start_time: Option<DateTime<Utc>>) -> CurveAnchor {
        CurveAnchor::new(self.clone(), start_time)
    }
}
