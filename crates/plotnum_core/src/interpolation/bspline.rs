//! Clamped uniform B-spline curves evaluated with the Cox–de Boor recursion.

use crate::error::{NumericsError, Result};
use crate::traits::ParametricCurve;
use crate::types::Point2;

#[derive(Debug, Clone)]
pub struct BSplineCurve {
    points: Vec<Point2>,
    order: usize,
    knots: Vec<f64>,
}

impl BSplineCurve {
    /// Builds a curve of the given `order` (degree + 1). The order is clamped
    /// to `points.len()` when there are too few control points.
    pub fn new(points: Vec<Point2>, order: usize) -> Result<Self> {
        if order < 1 {
            return Err(NumericsError::InvalidArgument(
                "B-spline order must be at least 1".to_string(),
            ));
        }
        let n = points.len().saturating_sub(1);
        let order = order.min(n + 1);
        let knots = knot_vector(n, order);
        Ok(Self {
            points,
            order,
            knots,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Upper end of the parameter range, `n - k + 2` for `n + 1` points of order `k`.
    fn t_max(&self) -> f64 {
        (self.points.len() + 1) as f64 - self.order as f64
    }

    fn coordinate(&self, t: f64, coord: impl Fn(&Point2) -> f64) -> f64 {
        let len = self.points.len();
        if len < 2 || t.is_nan() {
            return f64::NAN;
        }
        if t <= 0.0 {
            return coord(&self.points[0]);
        }
        if t >= self.t_max() {
            return coord(&self.points[len - 1]);
        }

        let k = self.order;
        let s = t.floor() as usize + k - 1;
        let basis = basis_functions(t, &self.knots, k, s);

        // basis[m] belongs to control point s + 1 - k + m.
        basis
            .iter()
            .enumerate()
            .filter_map(|(m, b)| {
                let j = (s + 1 + m).checked_sub(k)?;
                self.points.get(j).map(|p| coord(p) * b)
            })
            .sum()
    }
}

/// Clamped knot vector with `k` leading zeros and unit spacing.
fn knot_vector(n: usize, k: usize) -> Vec<f64> {
    (0..n + k + 1)
        .map(|j| {
            if j < k {
                0.0
            } else if j <= n {
                (j + 1 - k) as f64
            } else {
                (n + 2 - k) as f64
            }
        })
        .collect()
}

/// Non-zero basis functions `N[s-k+1..=s]` of order `k` at `t`, where
/// `knots[s] <= t < knots[s+1]`.
fn basis_functions(t: f64, knots: &[f64], k: usize, s: usize) -> Vec<f64> {
    let mut n = vec![0.0; k];
    // Index m stands for basis function s + 1 - k + m, so s itself is k - 1.
    n[k - 1] = if knots[s] <= t && t < knots[s + 1] { 1.0 } else { 0.0 };

    for i in 2..=k {
        for m in (k - i)..k {
            let j = s + 1 + m - k;
            let a = if m == k - i { 0.0 } else { n[m] };
            let b = if m == k - 1 { 0.0 } else { n[m + 1] };

            let den = knots[j + i - 1] - knots[j];
            n[m] = if den == 0.0 { 0.0 } else { (t - knots[j]) / den * a };

            let den = knots[j + i] - knots[j + 1];
            if den != 0.0 {
                n[m] += (knots[j + i] - t) / den * b;
            }
        }
    }
    n
}

impl ParametricCurve for BSplineCurve {
    fn x(&self, t: f64) -> f64 {
        self.coordinate(t, |p| p.x)
    }

    fn y(&self, t: f64) -> f64 {
        self.coordinate(t, |p| p.y)
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, self.t_max())
    }
}
