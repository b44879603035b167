#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    x: f64,
    y: f64
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Point2D {
        Point2D { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn slope(lhs_pt: &Point2D, rhs_pt: &Point2D) -> f64 {
        (rhs_pt.y - lhs_pt.y) / (rhs_pt.x - lhs_pt.x)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Point2D::new(x, y)
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Point2D::new(x, y)
    }
}

/// A curve defined by a set of knots it passes through (or is fitted to).
pub trait NonparametricCurve {
    fn points(&self) -> Vec<Point2D>;

    fn min_x(&self) -> f64;

    fn max_x(&self) -> f64;
}

/// Positions `0, 1, .., n-1` paired with `values`.
pub fn points_from_values(values: &[f64]) -> Vec<Point2D> {
    values
        .iter()
        .enumerate()
        .map(|(i, &y)| Point2D::new(i as f64, y))
        .collect()
}

/// Knot x positions must be finite and strictly increasing.
pub fn is_strictly_increasing(points: &[Point2D]) -> bool {
    points.iter().all(|pt| pt.x().is_finite())
        && points.windows(2).all(|pair| pair[0].x() < pair[1].x())
}
