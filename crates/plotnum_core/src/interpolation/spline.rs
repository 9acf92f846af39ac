//! Natural cubic splines.

use crate::error::{NumericsError, Result};
use serde::Serialize;

/// Second derivatives of the natural cubic spline through `(x[i], y[i])`.
///
/// Sorts both slices by `x` in place as a side effect; the returned vector is
/// aligned with the sorted knots and always has `F[0] = F[n-1] = 0`.
pub fn spline_coefficients(x: &mut [f64], y: &mut [f64]) -> Result<Vec<f64>> {
    let n = x.len();
    if y.len() != n {
        return Err(NumericsError::DimensionMismatch(format!(
            "spline needs as many y values as x values, got {} and {}",
            n,
            y.len()
        )));
    }
    if n < 2 {
        return Err(NumericsError::InvalidArgument(format!(
            "spline needs at least 2 knots, got {n}"
        )));
    }

    sort_knots(x, y);
    if let Some(pair) = x.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(NumericsError::InvalidArgument(format!(
            "spline knots must have distinct x values, {} appears twice",
            pair[0]
        )));
    }

    if n == 2 {
        return Ok(vec![0.0, 0.0]);
    }

    let dx: Vec<f64> = x.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let delta: Vec<f64> = (0..n - 2)
        .map(|i| 6.0 * (y[i + 2] - y[i + 1]) / dx[i + 1] - 6.0 * (y[i + 1] - y[i]) / dx[i])
        .collect();

    // Tridiagonal system for the interior second derivatives (Thomas algorithm).
    let mut diag = Vec::with_capacity(n - 2);
    let mut z = Vec::with_capacity(n - 2);
    diag.push(2.0 * (dx[0] + dx[1]));
    z.push(delta[0]);
    for i in 0..n - 3 {
        let l = dx[i + 1] / diag[i];
        diag.push(2.0 * (dx[i + 1] + dx[i + 2]) - l * dx[i + 1]);
        z.push(delta[i + 1] - l * z[i]);
    }

    let mut f = vec![0.0; n];
    f[n - 2] = z[n - 3] / diag[n - 3];
    for i in (0..n - 3).rev() {
        f[i + 1] = (z[i] - dx[i + 1] * f[i + 2]) / diag[i];
    }
    Ok(f)
}

fn sort_knots(x: &mut [f64], y: &mut [f64]) {
    let mut pairs: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    for (i, (px, py)) in pairs.into_iter().enumerate() {
        x[i] = px;
        y[i] = py;
    }
}

/// Evaluates the spline given by sorted knots `x`, `y` and second derivatives
/// `f` at `x0`. Returns NaN outside `[x[0], x[n-1]]`.
pub fn spline_evaluate(x0: f64, x: &[f64], y: &[f64], f: &[f64]) -> f64 {
    let n = x.len().min(y.len()).min(f.len());
    if n < 2 || x0.is_nan() || x0 < x[0] || x0 > x[n - 1] {
        return f64::NAN;
    }

    // First knot at or right of x0, then step back to the interval start.
    let j = (1..n).find(|&j| x0 <= x[j]).unwrap_or(n - 1) - 1;

    let h = x[j + 1] - x[j];
    let a = y[j];
    let b = (y[j + 1] - y[j]) / h - h / 6.0 * (f[j + 1] + 2.0 * f[j]);
    let c = f[j] / 2.0;
    let d = (f[j + 1] - f[j]) / (6.0 * h);
    let t = x0 - x[j];
    a + (b + (c + d * t) * t) * t
}

/// [`spline_evaluate`] over a slice of arguments. Each argument outside the
/// knot range yields its own NaN.
pub fn spline_evaluate_many(x0: &[f64], x: &[f64], y: &[f64], f: &[f64]) -> Vec<f64> {
    x0.iter().map(|&t| spline_evaluate(t, x, y, f)).collect()
}

/// A natural cubic spline with its coefficients computed once.
#[derive(Debug, Clone, Serialize)]
pub struct NaturalSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl NaturalSpline {
    /// Copies and sorts the knots, then solves for the second derivatives.
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self> {
        let mut x = x.to_vec();
        let mut y = y.to_vec();
        let second_derivatives = spline_coefficients(&mut x, &mut y)?;
        Ok(Self {
            x,
            y,
            second_derivatives,
        })
    }

    pub fn evaluate(&self, x0: f64) -> f64 {
        spline_evaluate(x0, &self.x, &self.y, &self.second_derivatives)
    }

    pub fn evaluate_many(&self, x0: &[f64]) -> Vec<f64> {
        spline_evaluate_many(x0, &self.x, &self.y, &self.second_derivatives)
    }

    /// Knot range `[x[0], x[n-1]]`.
    pub fn domain(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    pub fn knots(&self) -> (&[f64], &[f64]) {
        (&self.x, &self.y)
    }

    pub fn second_derivatives(&self) -> &[f64] {
        &self.second_derivatives
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_knots_give_a_line() {
        let mut x = vec![2.0, 0.0];
        let mut y = vec![4.0, 0.0];
        let f = spline_coefficients(&mut x, &mut y).expect("spline");
        assert_eq!(f, vec![0.0, 0.0]);
        assert_eq!(x, vec![0.0, 2.0]);
        assert!((spline_evaluate(1.0, &x, &y, &f) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn three_knot_tent() {
        let mut x = vec![0.0, 1.0, 2.0];
        let mut y = vec![0.0, 1.0, 0.0];
        let f = spline_coefficients(&mut x, &mut y).expect("spline");
        assert_eq!(f.len(), 3);
        assert!((f[1] + 3.0).abs() < 1e-12);
        assert!((spline_evaluate(0.5, &x, &y, &f) - 0.6875).abs() < 1e-12);
        assert!((spline_evaluate(1.5, &x, &y, &f) - 0.6875).abs() < 1e-12);
    }

    #[test]
    fn knots_are_reproduced_after_sorting() {
        let xs = [3.0, -1.0, 0.5, 2.0, 1.0, 4.5];
        let ys = [1.0, 2.0, -1.0, 0.0, 3.0, 2.5];
        let spline = NaturalSpline::new(&xs, &ys).expect("spline");
        let f = spline.second_derivatives();
        assert_eq!(f[0], 0.0);
        assert_eq!(f[f.len() - 1], 0.0);
        for (&x, &y) in xs.iter().zip(&ys) {
            assert!((spline.evaluate(x) - y).abs() < 1e-9, "knot {x}");
        }
        assert_eq!(spline.domain(), (-1.0, 4.5));
    }

    #[test]
    fn outside_the_knot_range_is_nan() {
        let spline = NaturalSpline::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]).expect("spline");
        let values = spline.evaluate_many(&[-0.5, 1.0, 2.5]);
        assert!(values[0].is_nan());
        assert!((values[1] - 1.0).abs() < 1e-12);
        assert!(values[2].is_nan());
        assert!(spline.evaluate(f64::NAN).is_nan());
    }

    #[test]
    fn rejects_bad_knot_sets() {
        let err = NaturalSpline::new(&[0.0], &[1.0]).expect_err("one knot");
        assert!(matches!(err, NumericsError::InvalidArgument(_)));

        let err = NaturalSpline::new(&[0.0, 1.0], &[1.0]).expect_err("length mismatch");
        assert!(matches!(err, NumericsError::DimensionMismatch(_)));

        let err = NaturalSpline::new(&[1.0, 0.0, 1.0], &[1.0, 2.0, 3.0]).expect_err("duplicate");
        assert!(matches!(err, NumericsError::InvalidArgument(_)));
    }
}
