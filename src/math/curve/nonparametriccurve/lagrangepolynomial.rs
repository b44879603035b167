use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    NonparametricCurve,
    Point2D
};

// ─────────────────────────────────────────────────────────────────────────────
// LagrangePolynomial - barycentric form (2nd kind)
// ─────────────────────────────────────────────────────────────────────────────
//
//   L(x) = Σ w_i·y_i/(x-x_i) / Σ w_i/(x-x_i)
//   w_i  = 1 / Π_{j≠i} (x_i - x_j)
//
// Global interpolant, so only meant for a handful of knots (the cubic boundary
// projection uses four). Evaluation outside the knots extrapolates.

pub struct LagrangePolynomial {
    x_data: Vec<f64>,
    y_data: Vec<f64>,
    weights: Vec<f64>
}

impl LagrangePolynomial {
    pub fn new(mut points: Vec<Point2D>) -> Option<LagrangePolynomial> {
        if points.is_empty() {
            return None;
        }

        points.sort_by(|a, b| a.x().total_cmp(&b.x()));

        let x_data: Vec<f64> = points.iter().map(|p| p.x()).collect();
        let y_data: Vec<f64> = points.iter().map(|p| p.y()).collect();
        let weights = Self::compute_barycentric_weights(&x_data);

        Some(LagrangePolynomial {
            x_data,
            y_data,
            weights
        })
    }

    fn compute_barycentric_weights(x_data: &[f64]) -> Vec<f64> {
        let n = x_data.len();
        let mut weights = vec![1.0; n];

        for i in 0..n {
            for j in 0..n {
                if i != j {
                    weights[i] /= x_data[i] - x_data[j];
                }
            }
        }

        weights
    }

    pub fn value(&self, x: f64) -> f64 {
        // exactly on a knot: avoid 0/0
        for (i, &xi) in self.x_data.iter().enumerate() {
            if (x - xi).abs() < f64::EPSILON {
                return self.y_data[i];
            }
        }

        let mut numerator = 0.0;
        let mut denominator = 0.0;

        for i in 0..self.x_data.len() {
            let temp = self.weights[i] / (x - self.x_data[i]);
            numerator += temp * self.y_data[i];
            denominator += temp;
        }

        numerator / denominator
    }

    /// L'(x) = (N'(x)·D(x) - N(x)·D'(x)) / D(x)²
    pub fn derivative(&self, x: f64) -> f64 {
        for &xi in &self.x_data {
            if (x - xi).abs() < f64::EPSILON {
                let h = 1e-6;
                return (self.value(x + h) - self.value(x - h)) / (2.0 * h);
            }
        }

        let mut n_val = 0.0;
        let mut d_val = 0.0;
        let mut n_prime = 0.0;
        let mut d_prime = 0.0;

        for i in 0..self.x_data.len() {
            let diff = x - self.x_data[i];
            let temp = self.weights[i] / diff;
            let temp_sq = temp / diff;

            n_val += temp * self.y_data[i];
            d_val += temp;
            n_prime -= temp_sq * self.y_data[i];
            d_prime -= temp_sq;
        }

        (n_prime * d_val - n_val * d_prime) / (d_val * d_val)
    }
}

impl NonparametricCurve for LagrangePolynomial {
    fn points(&self) -> Vec<Point2D> {
        self.x_data
            .iter()
            .zip(self.y_data.iter())
            .map(|(&x, &y)| Point2D::new(x, y))
            .collect()
    }

    fn min_x(&self) -> f64 {
        self.x_data[0]
    }

    fn max_x(&self) -> f64 {
        self.x_data[self.x_data.len() - 1]
    }
}
