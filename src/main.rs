use std::sync::Arc;

use chrono::{
    TimeDelta,
    Utc
};
use tracing_subscriber::prelude::*;

use curveshape::anchor::curveanchor::StartAnchor;
use curveshape::anchor::timebound::TimeBound;
use curveshape::configuration::Configuration;
use curveshape::manager::manager::IManager;
use curveshape::manager::managererror::ManagerError;
use curveshape::math::curve::curve::Curve;
use curveshape::math::curve::nonparametriccurve::discretepointcurve::DiscretePointCurve;
use curveshape::math::curve::parametriccurve::gaussiancurve::GaussianCurve;

const PREVIEW_SECONDS: f64 = 10.0;

fn preview(curve: &dyn Curve) -> Result<Vec<f64>, ManagerError> {
    let samples = if curve.is_discrete() {
        curve.all_samples()?
    } else {
        curve.samples(Some(0.0), Some(PREVIEW_SECONDS), 1.0)?
    };
    Ok(samples)
}

fn run_demo() -> Result<(), ManagerError> {
    let pulse: Arc<dyn Curve> = Arc::new(GaussianCurve::new(0.0, 1.0)?);
    let anchor = pulse.start_anchor(Some(Utc::now()));
    let (timestamps, values) = anchor.get_points(
        TimeDelta::milliseconds(250),
        Some(TimeBound::Relative(TimeDelta::seconds(-2))),
        Some(TimeBound::Relative(TimeDelta::seconds(2))),
        None,
    )?;
    println!("gaussian(0, 1) anchored at {}", anchor.start_time());
    for (timestamp, value) in timestamps.iter().zip(values.iter()) {
        println!("  {}  {:.6}", timestamp.format("%H:%M:%S%.3f"), value);
    }

    let ramp = DiscretePointCurve::new(vec![0.0, 1.0, 0.0, 1.0, 0.0]);
    let spline = ramp.to_spline(0.0)?;
    println!("spline through {:?}", ramp.samples_buffer());
    for position in [0.5, 1.5, 2.5, 3.5] {
        println!("  {:.1}  {:.6}", position, spline.value_at(position)?.unwrap_or(f64::NAN));
    }
    Ok(())
}

fn main() -> Result<(), ManagerError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "curveshape=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let Some(config_path) = std::env::args().nth(1) else {
        return run_demo();
    };

    let config = Configuration::new();
    config.from_reader(&config_path)?;
    let curve_manager = config.curve_manager();
    for name in curve_manager.names() {
        let curve = curve_manager.get(&name)?;
        println!("{}: {:?}", name, preview(curve.as_ref())?);
    }
    Ok(())
}
