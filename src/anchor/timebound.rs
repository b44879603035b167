use chrono::{
    DateTime,
    TimeDelta,
    Utc
};

use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};

/// A point in time given either outright or as an offset from an anchor's
/// start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBound {
    Absolute(DateTime<Utc>),
    Relative(TimeDelta)
}

impl TimeBound {
    pub fn resolve(&self, origin: DateTime<Utc>) -> CurveResult<DateTime<Utc>> {
        match self {
            TimeBound::Absolute(timestamp) => Ok(*timestamp),
            TimeBound::Relative(offset) => origin
                .checked_add_signed(*offset)
                .ok_or_else(|| CurveError::domain(format!("{} past {} is out of range", offset, origin)))
        }
    }
}

impl From<DateTime<Utc>> for TimeBound {
    fn from(timestamp: DateTime<Utc>) -> Self {
        TimeBound::Absolute(timestamp)
    }
}

impl From<TimeDelta> for TimeBound {
    fn from(offset: TimeDelta) -> Self {
        TimeBound::Relative(offset)
    }
}
