//! Univariate root finding and minimisation.
//!
//! All searches are bounded by [`SearchSettings::max_iterations`]. Running out
//! of iterations is not an error: the best estimate is returned, flagged with
//! `converged: false`, and a warning is logged.

use crate::error::{NumericsError, Result};
use crate::traits::{ParametricCurve, RealFunction};
use crate::types::EPS;
use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Step of the symmetric difference quotient used by [`derivative`].
pub const DERIVATIVE_STEP: f64 = 1e-5;

/// Maximum number of Newton steps in [`curve_intersection`].
const CURVE_NEWTON_STEPS: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub max_iterations: usize,
    /// Absolute tolerance on residuals and step sizes.
    pub tolerance: f64,
    /// Relative tolerance of the minimiser, scaled by `|x|`.
    pub relative_tolerance: f64,
    pub derivative_step: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: EPS,
            relative_tolerance: f64::EPSILON.sqrt(),
            derivative_step: DERIVATIVE_STEP,
        }
    }
}

/// Where a root search starts: a single guess or an enclosing interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RootSeed {
    Point(f64),
    Bracket(f64, f64),
}

impl From<f64> for RootSeed {
    fn from(x: f64) -> Self {
        RootSeed::Point(x)
    }
}

impl From<(f64, f64)> for RootSeed {
    fn from((a, b): (f64, f64)) -> Self {
        RootSeed::Bracket(a, b)
    }
}

impl From<[f64; 2]> for RootSeed {
    fn from([a, b]: [f64; 2]) -> Self {
        RootSeed::Bracket(a, b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMethod {
    Newton,
    Brent,
    GoldenSection,
}

/// Result of a search together with the bookkeeping callers may want to log.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SearchOutcome {
    pub x: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub converged: bool,
    /// The method that produced `x`, after any fallbacks.
    pub method: SearchMethod,
}

/// Symmetric difference quotient of `f` at `x` with step `h`.
pub fn derivative<F: RealFunction + ?Sized>(f: &F, x: f64, h: f64) -> f64 {
    (f.value(x + h) - f.value(x - h)) / (2.0 * h)
}

/// Returns the numerical derivative of `f` as a new function.
pub fn derivative_fn<F: RealFunction>(f: F) -> impl Fn(f64) -> f64 {
    move |x| derivative(&f, x, DERIVATIVE_STEP)
}

/// Newton's method with a numerical derivative, starting at `x0`.
pub fn newton<F: RealFunction + ?Sized>(f: &F, x0: f64) -> f64 {
    newton_with(f, x0, &SearchSettings::default()).x
}

/// Newton's method with explicit settings.
///
/// Stops once `|f(x)| <= tolerance`. Where the derivative is flatter than the
/// tolerance the iterate is shifted by a small random amount instead of
/// dividing by it.
pub fn newton_with<F: RealFunction + ?Sized>(
    f: &F,
    x0: f64,
    settings: &SearchSettings,
) -> SearchOutcome {
    let mut rng = rand::rng();
    let mut x = x0;
    let mut fx = f.value(x);
    let mut evaluations = 1;
    let mut iterations = 0;

    while iterations < settings.max_iterations && fx.abs() > settings.tolerance {
        let df = derivative(f, x, settings.derivative_step);
        evaluations += 2;

        if df.abs() > settings.tolerance {
            x -= fx / df;
        } else {
            let jitter = rng.random_range(-1.0..-0.8);
            debug!("Newton: flat derivative at x = {x}, shifting by {jitter}.");
            x += jitter;
        }

        fx = f.value(x);
        evaluations += 1;
        iterations += 1;
    }

    SearchOutcome {
        x,
        iterations,
        evaluations,
        converged: fx.abs() <= settings.tolerance,
        method: SearchMethod::Newton,
    }
}

/// Finds a root of `f`. Always goes through [`bracketed_root`].
pub fn root<F: RealFunction + ?Sized>(f: &F, seed: impl Into<RootSeed>) -> Result<f64> {
    bracketed_root(f, seed)
}

/// Brent-style root search with default settings.
pub fn bracketed_root<F: RealFunction + ?Sized>(f: &F, seed: impl Into<RootSeed>) -> Result<f64> {
    bracketed_root_with(f, seed.into(), &SearchSettings::default()).map(|outcome| outcome.x)
}

/// Brent-style root search: inverse quadratic / secant interpolation
/// safeguarded by bisection (Forsythe, Malcolm, Moler).
///
/// A [`RootSeed::Bracket`] must enclose a sign change; if it does not, the
/// minimiser is run on the interval instead. A [`RootSeed::Point`] seed is
/// widened into a bracket by probing a fixed list of offsets; if no sign
/// change turns up, Newton's method takes over from the seed.
pub fn bracketed_root_with<F: RealFunction + ?Sized>(
    f: &F,
    seed: RootSeed,
    settings: &SearchSettings,
) -> Result<SearchOutcome> {
    let tol = settings.tolerance;
    let mut evaluations = 0;

    let (mut a, mut fa, mut b, mut fb) = match seed {
        RootSeed::Bracket(a, b) => {
            if !a.is_finite() || !b.is_finite() {
                return Err(NumericsError::InvalidBracket(format!(
                    "endpoints must be finite, got [{a}, {b}]"
                )));
            }
            evaluations += 2;
            (a, f.value(a), b, f.value(b))
        }
        RootSeed::Point(x0) => {
            if !x0.is_finite() {
                return Err(NumericsError::InvalidArgument(format!(
                    "start value must be finite, got {x0}"
                )));
            }
            let fa = f.value(x0);
            evaluations += 1;

            let base = if x0 == 0.0 { 1.0 } else { x0 };
            let probes = [
                0.9 * base,
                1.1 * base,
                base - 1.0,
                base + 1.0,
                0.5 * base,
                1.5 * base,
                -base,
                2.0 * base,
                -10.0 * base,
                10.0 * base,
            ];
            let mut b = x0;
            let mut fb = fa;
            for probe in probes {
                b = probe;
                fb = f.value(b);
                evaluations += 1;
                if fa * fb <= 0.0 {
                    break;
                }
            }
            if b < x0 {
                (b, fb, x0, fa)
            } else {
                (x0, fa, b, fb)
            }
        }
    };

    if fa * fb > 0.0 {
        return Ok(match seed {
            RootSeed::Bracket(..) => {
                debug!("Root search: no sign change on [{a}, {b}], minimising instead.");
                minimize_with(f, (a, b), settings)?
            }
            RootSeed::Point(x0) => {
                debug!("Root search: no bracket found around {x0}, using Newton's method.");
                newton_with(f, x0, settings)
            }
        });
    }

    let mut c = a;
    let mut fc = fa;
    let mut iterations = 0;

    while iterations < settings.max_iterations {
        let prev_step = b - a;

        // Keep b as the best approximation.
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol_act = 2.0 * tol * b.abs() + tol * 0.5;
        let mut new_step = (c - b) * 0.5;

        if (new_step.abs() <= tol_act && fb.abs() <= tol) || fb == 0.0 {
            return Ok(SearchOutcome {
                x: b,
                iterations,
                evaluations,
                converged: true,
                method: SearchMethod::Brent,
            });
        }

        // Interpolate only if the previous step was large enough and went the right way.
        if prev_step.abs() >= tol_act && fa.abs() > fb.abs() {
            let cb = c - b;
            let (mut p, mut q) = if a == c {
                // Two distinct points: secant step.
                let t1 = fb / fa;
                (cb * t1, 1.0 - t1)
            } else {
                // Inverse quadratic interpolation.
                let qa = fa / fc;
                let t1 = fb / fc;
                let t2 = fb / fa;
                (
                    t2 * (cb * qa * (qa - t1) - (b - a) * (t1 - 1.0)),
                    (qa - 1.0) * (t1 - 1.0) * (t2 - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            } else {
                p = -p;
            }

            // Accept b + p/q only if it stays well inside [b, c] and shrinks faster than bisection.
            if p < 0.75 * cb * q - (tol_act * q).abs() * 0.5 && p < (prev_step * q * 0.5).abs() {
                new_step = p / q;
            }
        }

        if new_step.abs() < tol_act {
            new_step = if new_step > 0.0 { tol_act } else { -tol_act };
        }

        a = b;
        fa = fb;
        b += new_step;
        fb = f.value(b);
        evaluations += 1;

        // Keep the root between b and c.
        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            c = a;
            fc = fa;
        }
        iterations += 1;
    }

    warn!(
        "Root search reached the maximum of {} iterations (x = {b}, f(x) = {fb}).",
        settings.max_iterations
    );
    Ok(SearchOutcome {
        x: b,
        iterations,
        evaluations,
        converged: false,
        method: SearchMethod::Brent,
    })
}

/// Minimiser of `f` on `[a, b]` with default settings.
pub fn minimize<F: RealFunction + ?Sized>(f: &F, interval: (f64, f64)) -> Result<f64> {
    minimize_with(f, interval, &SearchSettings::default()).map(|outcome| outcome.x)
}

/// Golden-section search combined with successive parabolic interpolation
/// (Brent's `fmin`).
///
/// `x` is the best point so far, `w` the second best and `v` the previous
/// value of `w`. A parabola through them is tried first; the golden-section
/// step is used whenever the parabolic step would leave the bracket, land
/// too close to its ends, or not shrink fast enough.
pub fn minimize_with<F: RealFunction + ?Sized>(
    f: &F,
    interval: (f64, f64),
    settings: &SearchSettings,
) -> Result<SearchOutcome> {
    let (mut a, mut b) = interval;
    if !a.is_finite() || !b.is_finite() {
        return Err(NumericsError::InvalidBracket(format!(
            "endpoints must be finite, got [{a}, {b}]"
        )));
    }
    if a > b {
        std::mem::swap(&mut a, &mut b);
    }

    // Golden section ratio
    let r = (3.0 - 5f64.sqrt()) * 0.5;
    let tol = settings.tolerance;

    let mut v = a + r * (b - a);
    let mut fv = f.value(v);
    let mut evaluations = 1;
    let (mut x, mut w) = (v, v);
    let (mut fx, mut fw) = (fv, fv);
    let mut iterations = 0;

    while iterations < settings.max_iterations {
        let range = b - a;
        let middle = (a + b) * 0.5;
        let tol_act = settings.relative_tolerance * x.abs() + tol / 3.0;

        if (x - middle).abs() + range * 0.5 <= 2.0 * tol_act {
            return Ok(SearchOutcome {
                x,
                iterations,
                evaluations,
                converged: true,
                method: SearchMethod::GoldenSection,
            });
        }

        let mut new_step = r * if x < middle { b - x } else { a - x };

        if (x - w).abs() >= tol_act {
            let t = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * t;
            q = 2.0 * (q - t);

            if q > 0.0 {
                p = -p;
            } else {
                q = -q;
            }

            if p.abs() < (new_step * q).abs()
                && p > q * (a - x + 2.0 * tol_act)
                && p < q * (b - x - 2.0 * tol_act)
            {
                new_step = p / q;
            }
        }

        if new_step.abs() < tol_act {
            new_step = if new_step > 0.0 { tol_act } else { -tol_act };
        }

        let t = x + new_step;
        let ft = f.value(t);
        evaluations += 1;

        if ft <= fx {
            if t < x {
                b = x;
            } else {
                a = x;
            }
            v = w;
            w = x;
            x = t;
            fv = fw;
            fw = fx;
            fx = ft;
        } else {
            if t < x {
                a = t;
            } else {
                b = t;
            }
            if ft <= fw || w == x {
                v = w;
                w = t;
                fv = fw;
                fw = ft;
            } else if ft <= fv || v == x || v == w {
                v = t;
                fv = ft;
            }
        }
        iterations += 1;
    }

    warn!(
        "Minimisation reached the maximum of {} iterations (x = {x}, f(x) = {fx}).",
        settings.max_iterations
    );
    Ok(SearchOutcome {
        x,
        iterations,
        evaluations,
        converged: false,
        method: SearchMethod::GoldenSection,
    })
}

/// Result of [`curve_intersection`].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CurveIntersection {
    pub t1: f64,
    pub t2: f64,
    pub point: (f64, f64),
    /// Squared distance between `c1(t1)` and `c2(t2)`.
    pub residual: f64,
}

/// Intersects two parametric curves with a two-dimensional Newton iteration
/// on `c1(t1) - c2(t2) = 0`, starting from `(t1, t2)`.
///
/// Pass the parameters of the previous result back in to track a moving
/// intersection. The reported point is taken on whichever curve has the
/// parameter of smaller magnitude.
pub fn curve_intersection<C1, C2>(c1: &C1, c2: &C2, t1: f64, t2: f64) -> CurveIntersection
where
    C1: ParametricCurve + ?Sized,
    C2: ParametricCurve + ?Sized,
{
    let (mut t1, mut t2) = (t1, t2);
    let h = DERIVATIVE_STEP;

    let mut e = c1.x(t1) - c2.x(t2);
    let mut g = c1.y(t1) - c2.y(t2);
    let mut residual = e * e + g * g;
    let mut count = 0;

    while residual > EPS && count < CURVE_NEWTON_STEPS {
        let a = derivative(&|t: f64| c1.x(t), t1, h);
        let b = -derivative(&|t: f64| c2.x(t), t2, h);
        let c = derivative(&|t: f64| c1.y(t), t1, h);
        let d = -derivative(&|t: f64| c2.y(t), t2, h);
        let disc = a * d - b * c;
        if disc == 0.0 || !disc.is_finite() {
            debug!("Curve intersection: singular Jacobian at ({t1}, {t2}).");
            break;
        }

        t1 -= (d * e - b * g) / disc;
        t2 -= (a * g - c * e) / disc;
        e = c1.x(t1) - c2.x(t2);
        g = c1.y(t1) - c2.y(t2);
        residual = e * e + g * g;
        count += 1;
    }

    if residual > EPS {
        warn!("Curve intersection did not converge (squared distance {residual}).");
    }

    let point = if t1.abs() < t2.abs() {
        c1.point(t1)
    } else {
        c2.point(t2)
    };
    CurveIntersection {
        t1,
        t2,
        point,
        residual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::with_context;

    struct Line {
        origin: (f64, f64),
        direction: (f64, f64),
    }

    impl ParametricCurve for Line {
        fn x(&self, t: f64) -> f64 {
            self.origin.0 + t * self.direction.0
        }
        fn y(&self, t: f64) -> f64 {
            self.origin.1 + t * self.direction.1
        }
        fn domain(&self) -> (f64, f64) {
            (f64::NEG_INFINITY, f64::INFINITY)
        }
    }

    #[test]
    fn derivative_of_square() {
        let df = derivative_fn(|x: f64| x * x);
        assert!((df(1.0) - 2.0).abs() < EPS);
    }

    #[test]
    fn newton_finds_linear_root() {
        let x = newton(&|x: f64| x - 2.0, 0.0);
        assert!((x - 2.0).abs() < EPS);
    }

    #[test]
    fn newton_escapes_flat_start() {
        // f'(0) = 0, so the first step is a random shift.
        let outcome = newton_with(&|x: f64| x * x - 4.0, 0.0, &SearchSettings::default());
        assert!(outcome.converged);
        assert!((outcome.x.abs() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn bracketed_root_from_seed() {
        let x = bracketed_root(&|x: f64| x - 2.0, 0.0).expect("root");
        assert!((x - 2.0).abs() < EPS);
    }

    #[test]
    fn bracketed_root_inside_interval() {
        let f = |x: f64| x * x - 2.0;
        let outcome =
            bracketed_root_with(&f, RootSeed::Bracket(0.0, 2.0), &SearchSettings::default())
                .expect("root");
        assert_eq!(outcome.method, SearchMethod::Brent);
        assert!(outcome.converged);
        assert!(f(outcome.x).abs() < EPS);
        assert!((outcome.x - 2f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn steep_root_meets_residual_tolerance() {
        // A bracket narrower than tol_act is not enough; |f(b)| must be small too.
        let f = |x: f64| 1e7 * (x - 0.3);
        let outcome =
            bracketed_root_with(&f, RootSeed::Bracket(0.0, 1.0), &SearchSettings::default())
                .expect("root");
        assert!(outcome.converged);
        assert!(f(outcome.x).abs() <= EPS);
    }

    #[test]
    fn root_of_triple_zero() {
        let f = |x: f64| (x - 1.0) * (x - 1.0) * (x - 1.0);
        let x = root(&f, 0.0).expect("root");
        assert!(f(x).abs() < EPS);
    }

    #[test]
    fn root_without_sign_change_falls_back_to_newton() {
        let f = |x: f64| (x - 5.0) * (x - 5.0);
        let outcome =
            bracketed_root_with(&f, RootSeed::Point(0.0), &SearchSettings::default()).expect("root");
        assert_eq!(outcome.method, SearchMethod::Newton);
        assert!(f(outcome.x).abs() < EPS);
    }

    #[test]
    fn bracket_without_sign_change_falls_back_to_minimisation() {
        let f = |x: f64| (x - 1.0) * (x - 1.0) + 1.0;
        let outcome =
            bracketed_root_with(&f, [0.0, 3.0].into(), &SearchSettings::default()).expect("search");
        assert_eq!(outcome.method, SearchMethod::GoldenSection);
        assert!((outcome.x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn bracket_must_be_finite() {
        let err = bracketed_root(&|x: f64| x, (f64::NAN, 1.0)).expect_err("nan bracket");
        assert!(matches!(err, NumericsError::InvalidBracket(_)));
    }

    #[test]
    fn root_search_with_context() {
        struct Shift {
            by: f64,
        }
        let shift = Shift { by: 3.0 };
        let f = with_context(&shift, |s: &Shift, x| x - s.by);
        let x = root(&f, (0.0, 10.0)).expect("root");
        assert!((x - 3.0).abs() < EPS);
    }

    #[test]
    fn minimize_parabola() {
        let x = minimize(&|x: f64| (x - 3.0) * (x - 3.0), (0.0, 10.0)).expect("minimum");
        assert!((x - 3.0).abs() < 1e-4);
    }

    #[test]
    fn minimize_cosine_on_reversed_interval() {
        let outcome = minimize_with(&f64::cos, (5.0, 2.0), &SearchSettings::default()).expect("minimum");
        assert!((outcome.x - std::f64::consts::PI).abs() < 1e-4);
    }

    #[test]
    fn curve_intersection_of_two_lines() {
        let l1 = Line {
            origin: (0.0, 0.0),
            direction: (1.0, 1.0),
        };
        let l2 = Line {
            origin: (0.0, 2.0),
            direction: (1.0, -1.0),
        };
        let hit = curve_intersection(&l1, &l2, 0.0, 0.5);
        assert!(hit.residual <= EPS);
        assert!((hit.point.0 - 1.0).abs() < 1e-6);
        assert!((hit.point.1 - 1.0).abs() < 1e-6);
    }
}
