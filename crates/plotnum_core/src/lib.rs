pub mod error;
pub mod integration;
pub mod interpolation;
pub mod linalg;
pub mod roots;
pub mod simplify;
pub mod solvers;
/// The `plotnum_core` crate holds the numerical algorithms behind the plotting layer:
/// everything that turns user data and user functions into numbers or sampled curves.
///
/// Key components:
/// - **Traits**: `RealFunction` (callables with optional typed context), `ParametricCurve`
///   (`t -> (x, y)` evaluators), `DynamicalSystem` and `Steppable` (ODE right hand sides and steppers).
/// - **Linear algebra**: pivoted Gaussian elimination, Bareiss determinants, Jacobi eigenpairs.
/// - **Roots**: Newton, bracketed root search with fallbacks, golden-section minimisation.
/// - **Interpolation**: natural splines, barycentric polynomials, regression, Bézier and B-spline curves.
/// - **Integration**: Newton–Cotes quadrature and Riemann sums.
/// - **Solvers**: explicit Runge-Kutta integration driven by a Butcher tableau.
/// - **Simplify**: Ramer–Douglas–Peucker reduction of sampled polylines.
pub mod traits;
pub mod types;

pub use error::{NumericsError, Result};
pub use types::{Point2, EPS};
