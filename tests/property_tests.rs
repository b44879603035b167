//! Property-based tests for lookup and boundary handling.

use approx::relative_eq;
use proptest::prelude::*;

use curveshape::math::curve::boundarypolicy::{
    Boundaries,
    BoundaryPolicy
};
use curveshape::math::curve::curve::Curve;
use curveshape::math::curve::nonparametriccurve::discretepointcurve::DiscretePointCurve;
use curveshape::math::curve::nonparametriccurve::nonparametriccurve::points_from_values;
use curveshape::math::curve::nonparametriccurve::splinecurve::SplineCurve;
use curveshape::math::curve::parametriccurve::gaussiancurve::GaussianCurve;

fn samples() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(-100.0f64..100.0, 2..32)
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(128))]

    #[test]
    fn prop_integer_lookup_returns_sample(values in samples()) {
        let curve = DiscretePointCurve::new(values.clone());
        for (i, expected) in values.iter().enumerate() {
            prop_assert_eq!(curve.value_at(i as f64).unwrap(), Some(*expected));
        }
    }

    #[test]
    fn prop_linear_lookup_stays_between_neighbours(values in samples(), t in 0.0f64..1.0) {
        let curve = DiscretePointCurve::new(values.clone());
        let i = values.len() / 2 - 1;
        let value = curve.value_at(i as f64 + t).unwrap().unwrap();
        let lo = values[i].min(values[i + 1]);
        let hi = values[i].max(values[i + 1]);
        prop_assert!(value >= lo - 1e-9 && value <= hi + 1e-9);
    }

    #[test]
    fn prop_clamp_beyond_end(values in samples(), distance in 0.0f64..1e6) {
        let curve = DiscretePointCurve::new(values.clone());
        let last = values[values.len() - 1];
        prop_assert_eq!(curve.value_at(curve.end() + distance).unwrap(), Some(last));
        prop_assert_eq!(curve.value_at(-1.0 - distance).unwrap(), Some(values[0]));
    }

    #[test]
    fn prop_loop_is_periodic(values in samples(), position in 0.0f64..1.0, cycles in 1i32..20) {
        let curve = DiscretePointCurve::new(values)
            .with_boundaries(Boundaries::both(BoundaryPolicy::Loop));
        let position = position * curve.last_position();
        let base = curve.value_at(position).unwrap().unwrap();
        let wrapped = curve.value_at(position + f64::from(cycles) * curve.length()).unwrap().unwrap();
        prop_assert!(relative_eq!(base, wrapped, epsilon = 1e-6));
    }

    #[test]
    fn prop_reflect_stays_in_range(values in samples(), position in -1e3f64..1e3) {
        let curve = DiscretePointCurve::new(values.clone())
            .with_boundaries(Boundaries::both(BoundaryPolicy::Reflect));
        let value = curve.value_at(position).unwrap().unwrap();
        let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(value >= lo - 1e-9 && value <= hi + 1e-9);
    }

    #[test]
    fn prop_gaussian_is_symmetric(mean in -50.0f64..50.0, stdev in 0.1f64..20.0, d in 0.0f64..30.0) {
        let curve = GaussianCurve::new(mean, stdev).unwrap();
        let lhs = curve.value_at(mean + d).unwrap().unwrap();
        let rhs = curve.value_at(mean - d).unwrap().unwrap();
        prop_assert!(relative_eq!(lhs, rhs, epsilon = 1e-12, max_relative = 1e-9));
        prop_assert!(lhs <= curve.coefficient() + 1e-15);
    }

    #[test]
    fn prop_exact_spline_interpolates(values in samples()) {
        let spline = SplineCurve::new(points_from_values(&values)).unwrap();
        for (i, expected) in values.iter().enumerate() {
            let value = spline.value_at(i as f64).unwrap().unwrap();
            prop_assert!(relative_eq!(value, *expected, epsilon = 1e-6));
        }
    }
}
