use std::any::Any;
use std::fmt;
use std::ops::{
    Index,
    IndexMut
};
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{
    Deserialize,
    Serialize
};
use tracing::warn;

use crate::math::curve::boundarypolicy::Boundaries;
use crate::math::curve::curve::Curve;
use crate::math::curve::curvecompatible::CurveCompatible;
use crate::math::curve::curveerror::{
    CurveError,
    CurveResult
};
use crate::math::curve::nonparametriccurve::nonparametriccurve::points_from_values;
use crate::math::curve::nonparametriccurve::piecewisepolynomial::{
    PiecewisePolynomial,
    PolynomialType
};

/// Rule used between two stored samples.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationKind {
    #[default]
    Linear,
    Nearest,
    Previous,
    Next,
    Cubic,
    NotAKnot,
    Akima,
    Makima,
    Pchip
}

impl InterpolationKind {
    fn polynomial_type(&self) -> Option<PolynomialType> {
        match self {
            InterpolationKind::Linear   => Some(PolynomialType::Linear),
            InterpolationKind::Nearest  => None,
            InterpolationKind::Previous => Some(PolynomialType::ForwardFlat),
            InterpolationKind::Next     => Some(PolynomialType::BackwardFlat),
            InterpolationKind::Cubic    => Some(PolynomialType::NaturalCubic),
            InterpolationKind::NotAKnot => Some(PolynomialType::NotAKnotCubic),
            InterpolationKind::Akima    => Some(PolynomialType::AkimaCubic),
            InterpolationKind::Makima   => Some(PolynomialType::ModifiedAkimaCubic),
            InterpolationKind::Pchip    => Some(PolynomialType::PiecewiseCubicHermite)
        }
    }
}

impl FromStr for InterpolationKind {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear"                   => Ok(InterpolationKind::Linear),
            "nearest"                  => Ok(InterpolationKind::Nearest),
            "previous"                 => Ok(InterpolationKind::Previous),
            "next"                     => Ok(InterpolationKind::Next),
            "cubic"                    => Ok(InterpolationKind::Cubic),
            "not_a_knot" | "notaknot"  => Ok(InterpolationKind::NotAKnot),
            "akima"                    => Ok(InterpolationKind::Akima),
            "makima"                   => Ok(InterpolationKind::Makima),
            "pchip"                    => Ok(InterpolationKind::Pchip),
            other => Err(CurveError::invalid_argument(format!(
                "unknown interpolation kind '{}'",
                other
            )))
        }
    }
}

/// A curve over a buffer of equally spaced samples at positions `0..len`.
#[derive(Clone)]
pub struct DiscretePointCurve {
    samples: Vec<f64>,
    interpolation: InterpolationKind,
    boundaries: Boundaries,
    time_shift: f64,
    interpolant: OnceLock<Option<PiecewisePolynomial>>
}

impl DiscretePointCurve {
    pub fn new(samples: Vec<f64>) -> DiscretePointCurve {
        DiscretePointCurve {
            samples,
            interpolation: InterpolationKind::default(),
            boundaries: Boundaries::default(),
            time_shift: 0.0,
            interpolant: OnceLock::new()
        }
    }

    /// Samples of anything curve-compatible, flattened.
    pub fn from_compatible(value: impl Into<CurveCompatible>) -> CurveResult<DiscretePointCurve> {
        Ok(DiscretePointCurve::new(value.into().flatten()?))
    }

    pub fn with_interpolation(mut self, interpolation: InterpolationKind) -> Self {
        self.interpolation = interpolation;
        self.invalidate();
        self
    }

    pub fn with_boundaries(mut self, boundaries: Boundaries) -> Self {
        self.boundaries = boundaries;
        self
    }

    pub fn with_time_shift(mut self, time_shift: f64) -> Self {
        self.time_shift = time_shift;
        self
    }

    pub fn interpolation(&self) -> InterpolationKind {
        self.interpolation
    }

    pub fn samples_buffer(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append a scalar, a sequence or another curve's samples.
    pub fn append(&mut self, value: impl Into<CurveCompatible>) -> CurveResult<()> {
        let values = value.into().flatten()?;
        self.samples.extend(values);
        self.invalidate();
        Ok(())
    }

    pub fn extend<I>(&mut self, values: I) -> CurveResult<()>
    where
        I: IntoIterator,
        I::Item: Into<CurveCompatible>
    {
        let nested: Vec<CurveCompatible> = values.into_iter().map(Into::into).collect();
        self.append(nested)
    }

    /// Overwrite the sample at an integer position.
    pub fn set(&mut self, index: f64, value: f64) -> CurveResult<()> {
        if index.fract() != 0.0 {
            return Err(CurveError::unsupported(format!(
                "cannot set a value at fractional index {}",
                index
            )));
        }
        if index < 0.0 || index >= self.samples.len() as f64 {
            return Err(CurveError::boundary(index, 0.0, self.samples.len() as f64));
        }
        self.samples[index as usize] = value;
        self.invalidate();
        Ok(())
    }

    fn invalidate(&mut self) {
        self.interpolant = OnceLock::new();
    }

    fn interpolant(&self) -> Option<&PiecewisePolynomial> {
        self.interpolant
            .get_or_init(|| self.build_interpolant())
            .as_ref()
    }

    fn build_interpolant(&self) -> Option<PiecewisePolynomial> {
        let points = points_from_values(&self.samples);
        let requested = self.interpolation.polynomial_type()?;
        let polynomial_type = if points.len() < requested.necessary_points() {
            warn!(
                interpolation = ?self.interpolation,
                samples = points.len(),
                "too few samples, falling back to linear interpolation"
            );
            PolynomialType::Linear
        } else {
            requested
        };

        match PiecewisePolynomial::new(polynomial_type, &points) {
            Ok(polynomial) => Some(polynomial),
            Err(err) if polynomial_type != PolynomialType::Linear => {
                warn!(%err, "interpolant construction failed, falling back to linear");
                PiecewisePolynomial::new(PolynomialType::Linear, &points).ok()
            },
            Err(_) => None
        }
    }
}

impl fmt::Debug for DiscretePointCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscretePointCurve")
            .field("samples", &self.samples)
            .field("interpolation", &self.interpolation)
            .field("boundaries", &self.boundaries)
            .field("time_shift", &self.time_shift)
            .finish()
    }
}

impl Curve for DiscretePointCurve {
    fn start(&self) -> f64 {
        0.0
    }

    fn end(&self) -> f64 {
        self.samples.len() as f64
    }

    fn time_shift(&self) -> f64 {
        self.time_shift
    }

    fn boundaries(&self) -> Boundaries {
        self.boundaries
    }

    fn last_position(&self) -> f64 {
        self.samples.len().saturating_sub(1) as f64
    }

    fn evaluate(&self, position: f64) -> f64 {
        let n = self.samples.len();
        if n == 0 {
            return f64::NAN;
        }
        let clamped = position.clamp(0.0, (n - 1) as f64);
        if clamped.fract() == 0.0 {
            return self.samples[clamped as usize];
        }
        if self.interpolation == InterpolationKind::Nearest {
            return self.samples[clamped.round() as usize];
        }
        match self.interpolant() {
            Some(polynomial) => polynomial.value(clamped),
            None => self.samples[clamped.round() as usize]
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Index<usize> for DiscretePointCurve {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.samples[index]
    }
}

impl IndexMut<usize> for DiscretePointCurve {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        self.invalidate();
        &mut self.samples[index]
    }
}
