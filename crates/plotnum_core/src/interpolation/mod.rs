//! Curve fitting through, or near, a set of data points.
//!
//! Every fitter is split into a preparation step that does the expensive
//! setup once (sorting, solving for coefficients, computing weights) and a
//! cheap evaluation step. Parametric fitters implement
//! [`ParametricCurve`](crate::traits::ParametricCurve).

pub mod barycentric;
pub mod bezier;
pub mod bspline;
pub mod regression;
pub mod spline;

pub use barycentric::{LagrangePolynomial, NevilleCurve};
pub use bezier::{BezierCurve, CardinalSpline};
pub use bspline::BSplineCurve;
pub use regression::{regression_polynomial, DegreeSource, PolynomialRegression, RegressionPolynomial};
pub use spline::{spline_coefficients, spline_evaluate, spline_evaluate_many, NaturalSpline};
