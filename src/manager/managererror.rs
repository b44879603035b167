use serde::Deserialize;
use serde::de::{
    self,
    Error
};
use thiserror::Error as ThisError;

use crate::math::curve::curveerror::CurveError;

#[derive(Debug, ThisError)]
pub enum ManagerError {
    #[error(transparent)]
    CurveError(#[from] CurveError),

    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    JsonParseError(#[from] serde_json::Error),

    #[error("key '{0}' not found")]
    NameNotFoundError(String)
}

impl ManagerError {
    pub fn from_json_or_json_parse_error<T>(json_value: serde_json::Value) -> Result<T, Self>
    where
        T: for<'a> Deserialize<'a>
    {
        serde_json::from_value(json_value).map_err(ManagerError::JsonParseError)
    }

    pub fn json_missing_field(field: &'static str) -> ManagerError {
        ManagerError::JsonParseError(serde_json::Error::missing_field(field))
    }

    pub fn json_invalid_value(unexp: de::Unexpected, exp: &dyn de::Expected) -> ManagerError {
        ManagerError::JsonParseError(serde_json::Error::invalid_value(unexp, exp))
    }

    pub fn map_elem_not_found(name: &str) -> ManagerError {
        ManagerError::NameNotFoundError(name.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ManagerError::map_elem_not_found("pulse").to_string(), "key 'pulse' not found");
        let err = ManagerError::from(CurveError::domain("stdev must be positive"));
        assert_eq!(err.to_string(), "domain error: stdev must be positive");
        assert!(ManagerError::json_missing_field("mean").to_string().contains("mean"));
    }

    #[test]
    fn test_from_json() {
        let value: Result<Vec<f64>, ManagerError> =
            ManagerError::from_json_or_json_parse_error(serde_json::json!([1.0, 2.0]));
        assert_eq!(value.unwrap(), vec![1.0, 2.0]);
        let value: Result<Vec<f64>, ManagerError> =
            ManagerError::from_json_or_json_parse_error(serde_json::json!({"a": 1}));
        assert!(matches!(value, Err(ManagerError::JsonParseError(_))));
    }
}
