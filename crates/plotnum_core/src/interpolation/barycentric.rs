//! Polynomial interpolation in barycentric form.

use crate::traits::{ParametricCurve, RealFunction};
use crate::types::Point2;

/// The interpolating polynomial curve through `points`, where point `i` is
/// reached at parameter `t = i`.
///
/// Uses the barycentric formula with the weights `(-1)^i * C(n-1, i)` for
/// equidistant nodes.
#[derive(Debug, Clone)]
pub struct NevilleCurve {
    points: Vec<Point2>,
    weights: Vec<f64>,
}

impl NevilleCurve {
    pub fn new(points: Vec<Point2>) -> Self {
        let degree = points.len().saturating_sub(1);
        let mut weights = Vec::with_capacity(points.len());
        let mut binomial = 1.0;
        let mut sign = 1.0;
        for i in 0..points.len() {
            weights.push(sign * binomial);
            binomial = binomial * (degree - i) as f64 / (i + 1) as f64;
            sign = -sign;
        }
        Self { points, weights }
    }

    fn coordinate(&self, t: f64, coord: impl Fn(&Point2) -> f64) -> f64 {
        let mut num = 0.0;
        let mut denom = 0.0;
        let mut d = t;
        for (p, w) in self.points.iter().zip(&self.weights) {
            if d == 0.0 {
                return coord(p);
            }
            let s = w / d;
            num += coord(p) * s;
            denom += s;
            d -= 1.0;
        }
        num / denom
    }
}

impl ParametricCurve for NevilleCurve {
    fn x(&self, t: f64) -> f64 {
        self.coordinate(t, |p| p.x)
    }

    fn y(&self, t: f64) -> f64 {
        self.coordinate(t, |p| p.y)
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, self.points.len().saturating_sub(1) as f64)
    }
}

/// The interpolating polynomial `y = p(x)` through points with distinct `x`.
#[derive(Debug, Clone)]
pub struct LagrangePolynomial {
    points: Vec<Point2>,
    weights: Vec<f64>,
}

impl LagrangePolynomial {
    pub fn new(points: Vec<Point2>) -> Self {
        let weights = points
            .iter()
            .enumerate()
            .map(|(i, pi)| {
                let product: f64 = points
                    .iter()
                    .enumerate()
                    .filter(|&(k, _)| k != i)
                    .map(|(_, pk)| pi.x - pk.x)
                    .product();
                1.0 / product
            })
            .collect();
        Self { points, weights }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let mut num = 0.0;
        let mut denom = 0.0;
        for (p, w) in self.points.iter().zip(&self.weights) {
            if x == p.x {
                return p.y;
            }
            let s = w / (x - p.x);
            denom += s;
            num += s * p.y;
        }
        num / denom
    }
}

impl RealFunction for LagrangePolynomial {
    fn value(&self, x: f64) -> f64 {
        self.evaluate(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neville_passes_through_parabola() {
        let curve = NevilleCurve::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 4.0),
        ]);
        assert_eq!(curve.domain(), (0.0, 2.0));
        assert_eq!(curve.point(1.0), (1.0, 1.0));
        let (x, y) = curve.point(1.5);
        assert!((x - 1.5).abs() < 1e-12);
        assert!((y - 2.25).abs() < 1e-12);
        // Extrapolation follows the same polynomial.
        assert!((curve.y(3.0) - 9.0).abs() < 1e-9);
    }

    #[test]
    fn neville_without_points_is_nan() {
        let curve = NevilleCurve::new(Vec::new());
        assert!(curve.x(0.5).is_nan());
    }

    #[test]
    fn lagrange_reproduces_quadratic() {
        let p = LagrangePolynomial::new(vec![
            Point2::new(-1.0, 1.0),
            Point2::new(0.0, 1.0),
            Point2::new(2.0, 7.0),
        ]);
        // x^2 + x + 1
        assert_eq!(p.evaluate(2.0), 7.0);
        assert!((p.evaluate(3.0) - 13.0).abs() < 1e-9);
        assert!((p.value(0.5) - 1.75).abs() < 1e-12);
    }
}
