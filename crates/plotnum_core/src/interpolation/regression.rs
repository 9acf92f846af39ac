//! Least-squares polynomial regression.

use crate::error::{NumericsError, Result};
use crate::linalg;
use crate::traits::RealFunction;
use nalgebra::{DMatrix, DVector};
use std::fmt;

/// Where a regression reads its degree from.
///
/// `Live` sources (a slider value, say) are read again on every
/// [`PolynomialRegression::fit`]; the value is floored.
pub enum DegreeSource {
    Constant(usize),
    Live(Box<dyn Fn() -> f64>),
}

impl DegreeSource {
    pub fn current(&self) -> Result<usize> {
        match self {
            DegreeSource::Constant(degree) => Ok(*degree),
            DegreeSource::Live(source) => {
                let value = source().floor();
                if value.is_finite() && value >= 0.0 {
                    Ok(value as usize)
                } else {
                    Err(NumericsError::InvalidArgument(format!(
                        "regression degree must be a non-negative number, got {value}"
                    )))
                }
            }
        }
    }
}

impl fmt::Debug for DegreeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegreeSource::Constant(degree) => f.debug_tuple("Constant").field(degree).finish(),
            DegreeSource::Live(_) => f.write_str("Live(..)"),
        }
    }
}

impl From<usize> for DegreeSource {
    fn from(degree: usize) -> Self {
        DegreeSource::Constant(degree)
    }
}

/// Data and degree of a regression, ready to be fitted.
#[derive(Debug)]
pub struct PolynomialRegression {
    degree: DegreeSource,
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl PolynomialRegression {
    pub fn new(degree: impl Into<DegreeSource>, xs: &[f64], ys: &[f64]) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(NumericsError::DimensionMismatch(format!(
                "regression needs as many y values as x values, got {} and {}",
                xs.len(),
                ys.len()
            )));
        }
        Ok(Self {
            degree: degree.into(),
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }

    /// Replaces the data while keeping the degree source.
    pub fn set_data(&mut self, xs: &[f64], ys: &[f64]) -> Result<()> {
        if xs.len() != ys.len() {
            return Err(NumericsError::DimensionMismatch(format!(
                "regression needs as many y values as x values, got {} and {}",
                xs.len(),
                ys.len()
            )));
        }
        self.xs = xs.to_vec();
        self.ys = ys.to_vec();
        Ok(())
    }

    /// Solves the normal equations `(MᵀM) c = Mᵀy` for the Vandermonde matrix `M`.
    ///
    /// A degree of at least the number of data points leaves the system
    /// underdetermined and is rejected before anything is allocated.
    pub fn fit(&self) -> Result<RegressionPolynomial> {
        let degree = self.degree.current()?;
        let rows = self.xs.len();
        if degree >= rows {
            return Err(NumericsError::InvalidArgument(format!(
                "a degree {degree} fit needs more than {rows} data points"
            )));
        }
        let design = DMatrix::from_fn(rows, degree + 1, |j, i| self.xs[j].powi(i as i32));
        let y = DVector::from_column_slice(&self.ys);

        let normal = design.tr_mul(&design);
        let rhs = design.tr_mul(&y);
        let coefficients = linalg::solve(&normal, rhs.as_slice())?;
        Ok(RegressionPolynomial { coefficients })
    }
}

/// Fits a polynomial of fixed `degree` to `(xs, ys)` in one go.
pub fn regression_polynomial(degree: usize, xs: &[f64], ys: &[f64]) -> Result<RegressionPolynomial> {
    PolynomialRegression::new(degree, xs, ys)?.fit()
}

/// A fitted polynomial, coefficients in ascending order of power.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionPolynomial {
    coefficients: Vec<f64>,
}

impl RegressionPolynomial {
    pub fn from_coefficients(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Horner evaluation.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }

    /// Human-readable form, highest power first, e.g. `(2.00)*x^2 + (0.00)*x + (-1.00)`.
    pub fn term(&self, var: &str, precision: usize) -> String {
        let mut out = String::new();
        for (power, &c) in self.coefficients.iter().enumerate().rev() {
            out.push('(');
            out.push_str(&format_significant(c, precision));
            out.push(')');
            match power {
                0 => {}
                1 => {
                    out.push('*');
                    out.push_str(var);
                    out.push_str(" + ");
                }
                _ => out.push_str(&format!("*{var}^{power} + ")),
            }
        }
        out
    }
}

impl RealFunction for RegressionPolynomial {
    fn value(&self, x: f64) -> f64 {
        self.evaluate(x)
    }
}

/// Formats `value` with `precision` significant digits, switching to
/// exponent notation for very small or very large magnitudes.
pub fn format_significant(value: f64, precision: usize) -> String {
    let precision = precision.max(1);
    if !value.is_finite() {
        return value.to_string();
    }
    let scientific = format!("{:.*e}", precision - 1, value);
    let exponent: i32 = scientific
        .rsplit('e')
        .next()
        .and_then(|e| e.parse().ok())
        .unwrap_or(0);

    if exponent < -6 || exponent >= precision as i32 {
        match scientific.split_once('e') {
            Some((mantissa, e)) if !e.starts_with('-') => format!("{mantissa}e+{e}"),
            _ => scientific,
        }
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        format!("{value:.decimals$}")
    }
}
