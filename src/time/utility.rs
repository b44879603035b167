use chrono::TimeDelta;

use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};

const NANOS_PER_SECOND: f64 = 1e9;

/// Fractional seconds as a `TimeDelta`, truncated to whole nanoseconds.
pub fn seconds_to_timedelta(seconds: f64) -> CurveResult<TimeDelta> {
    if !seconds.is_finite() {
        return Err(CurveError::domain(format!(
            "cannot represent {} seconds as a timedelta",
            seconds
        )));
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * NANOS_PER_SECOND).round().min(NANOS_PER_SECOND - 1.0);
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return Err(CurveError::domain(format!("{} seconds is out of range", seconds)));
    }
    TimeDelta::new(whole as i64, nanos as u32)
        .ok_or_else(|| CurveError::domain(format!("{} seconds is out of range", seconds)))
}

#[inline]
pub fn timedelta_to_seconds(delta: TimeDelta) -> f64 {
    delta.num_seconds() as f64 + delta.subsec_nanos() as f64 / NANOS_PER_SECOND
}
