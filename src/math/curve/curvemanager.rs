use std::sync::Arc;

use serde::Deserialize;
use serde::de::Unexpected;
use tracing::{
    debug,
    warn
};

use crate::manager::manager::Manager;
use crate::manager::managererror::ManagerError;
use crate::math::curve::boundarypolicy::{
    Boundaries,
    BoundaryPolicy
};
use crate::math::curve::curve::Curve;
use crate::math::curve::nonparametriccurve::discretepointcurve::{
    DiscretePointCurve,
    InterpolationKind
};
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    Point2D,
    points_from_values
};
use crate::math::curve::nonparametriccurve::splinecurve::SplineCurve;
use crate::math::curve::parametriccurve::gaussiancurve::GaussianCurve;
use crate::math::curve::parametriccurve::quadraticcurve::QuadraticCurve;
use crate::math::curve::parametriccurve::sinecurve::SineCurve;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveType {
    Gaussian,
    Quadratic,
    Sine,
    DiscretePoint,
    Spline
}

#[derive(Deserialize)]
struct CurveTypedObject {
    #[serde(rename = "type")]
    curve_type: CurveType,
    at_start: Option<BoundaryPolicy>,
    at_end: Option<BoundaryPolicy>,
    #[serde(default)]
    time_shift: f64
}

impl CurveTypedObject {
    fn boundaries(&self, default: Boundaries) -> Boundaries {
        Boundaries::new(
            self.at_start.unwrap_or(default.at_start),
            self.at_end.unwrap_or(default.at_end),
        )
    }

    fn has_boundaries(&self) -> bool {
        self.at_start.is_some() || self.at_end.is_some()
    }
}

#[derive(Deserialize)]
struct GaussianJsonProp {
    mean: f64,
    stdev: f64
}

#[derive(Deserialize)]
struct QuadraticJsonProp {
    coefficients: Option<Vec<f64>>,
    samples: Option<Vec<f64>>,
    order: Option<usize>
}

#[derive(Deserialize)]
struct SineJsonProp {
    #[serde(default = "unit")]
    amplitude: f64,
    #[serde(default = "unit")]
    angular_frequency: f64,
    #[serde(default)]
    phase: f64,
    #[serde(default)]
    offset: f64
}

#[derive(Deserialize)]
struct DiscretePointJsonProp {
    samples: Vec<f64>,
    #[serde(default)]
    interpolation: InterpolationKind
}

#[derive(Deserialize)]
struct SplineJsonProp {
    points: Option<Vec<[f64; 2]>>,
    values: Option<Vec<f64>>,
    smoothing: Option<f64>
}

fn unit() -> f64 {
    1.0
}

fn get_quadratic_curve_from_json(json_value: serde_json::Value) -> Result<QuadraticCurve, ManagerError> {
    let json_prop: QuadraticJsonProp = ManagerError::from_json_or_json_parse_error(json_value)?;
    match (json_prop.coefficients, json_prop.samples) {
        (Some(coefficients), _) => Ok(QuadraticCurve::new(coefficients)),
        (None, Some(samples)) => {
            let order = json_prop.order.unwrap_or(2);
            Ok(QuadraticCurve::fit_samples(&samples, order)?)
        },
        (None, None) => Err(ManagerError::json_missing_field("coefficients"))
    }
}

fn get_spline_curve_from_json(json_value: serde_json::Value) -> Result<SplineCurve, ManagerError> {
    let json_prop: SplineJsonProp = ManagerError::from_json_or_json_parse_error(json_value)?;
    let (points, default_smoothing) = match (json_prop.points, json_prop.values) {
        (Some(points), _) => (points.into_iter().map(Point2D::from).collect(), 0.0),
        (None, Some(values)) => (points_from_values(&values), 1.0),
        (None, None) => return Err(ManagerError::json_missing_field("points")),
    };
    let smoothing = json_prop.smoothing.unwrap_or(default_smoothing);
    if smoothing < 0.0 {
        return Err(ManagerError::json_invalid_value(
            Unexpected::Float(smoothing),
            &"a non-negative smoothing budget",
        ));
    }
    Ok(SplineCurve::with_smoothing(points, smoothing)?)
}

pub fn get_curve_from_json(json_value: serde_json::Value) -> Result<Arc<dyn Curve>, ManagerError> {
    let typed_object: CurveTypedObject = ManagerError::from_json_or_json_parse_error(json_value.clone())?;
    let time_shift = typed_object.time_shift;

    let curve: Arc<dyn Curve> = match typed_object.curve_type {
        CurveType::Gaussian => {
            let json_prop: GaussianJsonProp = ManagerError::from_json_or_json_parse_error(json_value)?;
            let curve = GaussianCurve::new(json_prop.mean, json_prop.stdev)?
                .with_boundaries(typed_object.boundaries(Boundaries::extend()))
                .with_time_shift(time_shift);
            Arc::new(curve)
        },
        CurveType::Quadratic => {
            if typed_object.has_boundaries() {
                warn!("boundary policies have no effect on an unbounded quadratic curve");
            }
            Arc::new(get_quadratic_curve_from_json(json_value)?.with_time_shift(time_shift))
        },
        CurveType::Sine => {
            if typed_object.has_boundaries() {
                warn!("boundary policies have no effect on an unbounded sine curve");
            }
            let json_prop: SineJsonProp = ManagerError::from_json_or_json_parse_error(json_value)?;
            let curve = SineCurve::new(
                json_prop.amplitude,
                json_prop.angular_frequency,
                json_prop.phase,
                json_prop.offset,
            );
            Arc::new(curve.with_time_shift(time_shift))
        },
        CurveType::DiscretePoint => {
            let json_prop: DiscretePointJsonProp = ManagerError::from_json_or_json_parse_error(json_value)?;
            let curve = DiscretePointCurve::new(json_prop.samples)
                .with_interpolation(json_prop.interpolation)
                .with_boundaries(typed_object.boundaries(Boundaries::default()))
                .with_time_shift(time_shift);
            Arc::new(curve)
        },
        CurveType::Spline => {
            let curve = get_spline_curve_from_json(json_value)?
                .with_boundaries(typed_object.boundaries(Boundaries::default()))
                .with_time_shift(time_shift);
            Arc::new(curve)
        }
    };
    debug!(curve_type = ?typed_object.curve_type, "built curve from json");
    Ok(curve)
}

pub struct CurveManager;

impl CurveManager {
    pub fn new() -> Manager<Arc<dyn Curve>> {
        Manager::new(get_curve_from_json)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use serde_json::json;

    use super::*;
    use crate::manager::manager::IManager;

    #[test]
    fn test_gaussian_from_json() {
        let curve = get_curve_from_json(json!({
            "name": "pulse",
            "type": "gaussian",
            "mean": 0.0,
            "stdev": 1.0
        }))
        .unwrap();
        let gaussian = curve.as_any().downcast_ref::<GaussianCurve>().unwrap();
        assert_eq!(gaussian.parameters(), (0.0, 1.0));
        assert_eq!(curve.boundaries(), Boundaries::extend());
    }

    #[test]
    fn test_discrete_point_with_policies() {
        let curve = get_curve_from_json(json!({
            "name": "ramp",
            "type": "discrete_point",
            "samples": [0.0, 1.0, 2.0],
            "interpolation": "nearest",
            "at_end": "loop",
            "time_shift": 1.0
        }))
        .unwrap();
        assert_eq!(curve.boundaries().at_start, BoundaryPolicy::Clamp);
        assert_eq!(curve.boundaries().at_end, BoundaryPolicy::Loop);
        assert_eq!(curve.value_at(2.0).unwrap(), Some(1.0));
        assert_eq!(curve.value_at(5.0).unwrap(), Some(1.0));
    }

    #[test]
    fn test_quadratic_from_samples() {
        let curve = get_curve_from_json(json!({
            "name": "line",
            "type": "quadratic",
            "samples": [0.0, 2.0, 4.0],
            "order": 1
        }))
        .unwrap();
        assert_relative_eq!(curve.value_at(3.0).unwrap().unwrap(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_spline_and_sine_from_json() {
        let spline = get_curve_from_json(json!({
            "name": "s",
            "type": "spline",
            "points": [[0.0, 1.0], [1.0, 3.0], [2.0, 2.0]]
        }))
        .unwrap();
        assert_relative_eq!(spline.value_at(1.0).unwrap().unwrap(), 3.0, epsilon = 1e-9);

        let sine = get_curve_from_json(json!({"name": "w", "type": "sine", "offset": 2.0})).unwrap();
        assert_relative_eq!(sine.value_at(0.0).unwrap().unwrap(), 2.0);
    }

    #[test]
    fn test_invalid_definitions() {
        let bad_stdev = get_curve_from_json(json!({
            "name": "bad", "type": "gaussian", "mean": 0.0, "stdev": -1.0
        }));
        assert!(matches!(bad_stdev, Err(ManagerError::CurveError(_))));

        let unknown = get_curve_from_json(json!({"name": "x", "type": "bezier"}));
        assert!(matches!(unknown, Err(ManagerError::JsonParseError(_))));

        let empty = get_curve_from_json(json!({"name": "q", "type": "quadratic"}));
        assert!(matches!(empty, Err(ManagerError::JsonParseError(_))));
    }

    #[test]
    fn test_manager_registers_by_name() {
        let manager = CurveManager::new();
        manager
            .insert_obj_from_json(
                json!({"name": "ramp", "type": "discrete_point", "samples": [1.0, 2.0]}),
                &(),
            )
            .unwrap();
        let curve = manager.get("ramp").unwrap();
        assert_eq!(curve.all_samples().unwrap(), vec![1.0, 2.0]);
    }
}
