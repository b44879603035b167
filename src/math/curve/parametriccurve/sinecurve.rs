use std::any::Any;

use crate::math::curve::curve::Curve;

/// `amplitude * sin(angular_frequency * x + phase) + offset` over an
/// unbounded domain.
#[derive(Debug, Clone, PartialEq)]
pub struct SineCurve {
    amplitude: f64,
    angular_frequency: f64,
    phase: f64,
    offset: f64,
    time_shift: f64
}

impl SineCurve {
    pub fn new(amplitude: f64, angular_frequency: f64, phase: f64, offset: f64) -> SineCurve {
        SineCurve {
            amplitude,
            angular_frequency,
            phase,
            offset,
            time_shift: 0.0
        }
    }

    pub fn with_time_shift(mut self, time_shift: f64) -> Self {
        self.time_shift = time_shift;
        self
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn angular_frequency(&self) -> f64 {
        self.angular_frequency
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Length of one cycle; infinite for a constant curve.
    pub fn period(&self) -> f64 {
        2.0 * std::f64::consts::PI / self.angular_frequency.abs()
    }
}

impl Default for SineCurve {
    fn default() -> Self {
        SineCurve::new(1.0, 1.0, 0.0, 0.0)
    }
}

impl Curve for SineCurve {
    fn start(&self) -> f64 {
        f64::NEG_INFINITY
    }

    fn time_shift(&self) -> f64 {
        self.time_shift
    }

    fn evaluate(&self, position: f64) -> f64 {
        self.amplitude * (self.angular_frequency * position + self.phase).sin() + self.offset
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
