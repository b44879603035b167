use thiserror::Error;

pub type CurveResult<T> = Result<T, CurveError>;

/// Errors raised by curve construction, lookup and fitting.
///
/// Every variant is an input-contract violation; nothing here is transient.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CurveError {
    /// A finite domain was required but the curve has an infinite bound.
    #[error("cannot {operation} on an infinite curve")]
    NonDiscreteCurve {
        operation: &'static str
    },

    /// Lookup outside `[start, end)` under the `Raise` boundary policy.
    #[error("position {position} is outside of [{start}, {end})")]
    Boundary {
        position: f64,
        start: f64,
        end: f64
    },

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Mathematical domain violation, e.g. a non-positive standard deviation.
    #[error("domain error: {0}")]
    Domain(String),

    #[error("insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints {
        required: usize,
        actual: usize
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid control points: {0}")]
    InvalidControlPoints(String),

    /// An operand produced no value at a position that had to be combined.
    #[error("no value available at position {position}")]
    MissingValue {
        position: f64
    },

    #[error("numerical computation failed: {0}")]
    Numerical(String)
}

impl CurveError {
    pub fn non_discrete(operation: &'static str) -> CurveError {
        CurveError::NonDiscreteCurve { operation }
    }

    pub fn boundary(position: f64, start: f64, end: f64) -> CurveError {
        CurveError::Boundary { position, start, end }
    }

    pub fn unsupported(reason: impl Into<String>) -> CurveError {
        CurveError::UnsupportedOperation(reason.into())
    }

    pub fn domain(reason: impl Into<String>) -> CurveError {
        CurveError::Domain(reason.into())
    }

    pub fn insufficient_points(required: usize, actual: usize) -> CurveError {
        CurveError::InsufficientPoints { required, actual }
    }

    pub fn invalid_argument(reason: impl Into<String>) -> CurveError {
        CurveError::InvalidArgument(reason.into())
    }

    pub fn numerical(reason: impl Into<String>) -> CurveError {
        CurveError::Numerical(reason.into())
    }

    pub fn is_non_discrete(&self) -> bool {
        matches!(self, CurveError::NonDiscreteCurve { .. })
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, CurveError::Boundary { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, CurveError::UnsupportedOperation(_))
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, CurveError::Domain(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CurveError::boundary(12.5, 0.0, 10.0);
        assert_eq!(err.to_string(), "position 12.5 is outside of [0, 10)");

        let err = CurveError::non_discrete("take samples");
        assert_eq!(err.to_string(), "cannot take samples on an infinite curve");

        let err = CurveError::insufficient_points(2, 1);
        assert!(err.to_string().contains("need at least 2"));
    }

    #[test]
    fn test_error_predicates() {
        assert!(CurveError::non_discrete("iterate").is_non_discrete());
        assert!(CurveError::boundary(-1.0, 0.0, 1.0).is_boundary());
        assert!(CurveError::unsupported("fractional index").is_unsupported());
        assert!(CurveError::domain("stdev must be positive").is_domain());
        assert!(!CurveError::domain("x").is_boundary());
    }
}
