//! Function-valued numerics: roots, quadrature, Riemann sums, ODE trajectories,
//! splines and polyline simplification.
//!
//! JS callbacks are plain `Function`s taking numbers. A callback that throws or
//! returns something other than a number counts as NaN at that argument.

use crate::shared::{
    decode_settings, js_error, points_from_flat, real_function, serialize, vector_field,
};
use js_sys::Function;
use plotnum_core::integration::{self, QuadratureSettings, RiemannKind};
use plotnum_core::interpolation::spline;
use plotnum_core::roots::{self, RootSeed, SearchSettings};
use plotnum_core::simplify;
use plotnum_core::solvers::{self, ButcherTableau, RungeKuttaMethod};
use serde::Serialize;
use serde_wasm_bindgen::from_value;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct SplinePayload {
    xs: Vec<f64>,
    ys: Vec<f64>,
    second_derivatives: Vec<f64>,
}

#[derive(Serialize)]
struct PolylinePayload {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

/// Second derivatives of the natural spline, along with the knots sorted by x.
#[wasm_bindgen]
pub fn spline_coefficients(xs: Vec<f64>, ys: Vec<f64>) -> Result<JsValue, JsValue> {
    let (mut xs, mut ys) = (xs, ys);
    let second_derivatives = spline::spline_coefficients(&mut xs, &mut ys)
        .map_err(|e| js_error("Spline setup failed", e))?;
    serialize(&SplinePayload {
        xs,
        ys,
        second_derivatives,
    })
}

/// Evaluates a spline from sorted knots and its second derivatives; NaN outside the knots.
#[wasm_bindgen]
pub fn spline_evaluate(at: Vec<f64>, xs: Vec<f64>, ys: Vec<f64>, second_derivatives: Vec<f64>) -> Vec<f64> {
    spline::spline_evaluate_many(&at, &xs, &ys, &second_derivatives)
}

/// Integral of `f` over `[a, b]`. `settings` is `{ node_count, rule }` with `rule`
/// one of `"trapezoid"`, `"simpson"`, `"milne"`; omitted fields use the defaults.
#[wasm_bindgen]
pub fn quadrature(a: f64, b: f64, f: &Function, settings: JsValue) -> Result<f64, JsValue> {
    let settings: QuadratureSettings = decode_settings(settings)?;
    integration::quadrature((a, b), &real_function(f), &settings)
        .map_err(|e| js_error("Quadrature failed", e))
}

/// Rectangle outline `{ xs, ys, sum }` of a Riemann sum.
#[wasm_bindgen]
pub fn riemann(f: &Function, n: u32, kind: &str, start: f64, end: f64) -> Result<JsValue, JsValue> {
    let kind: RiemannKind = kind.parse().map_err(|e| js_error("Invalid Riemann sum type", e))?;
    let outline = integration::riemann(&real_function(f), n as usize, kind, start, end);
    serialize(&outline)
}

#[wasm_bindgen]
pub fn riemann_sum(f: &Function, n: u32, kind: &str, start: f64, end: f64) -> Result<f64, JsValue> {
    let kind: RiemannKind = kind.parse().map_err(|e| js_error("Invalid Riemann sum type", e))?;
    Ok(integration::riemann_sum(&real_function(f), n as usize, kind, start, end))
}

/// Root of `f`. `seed` is either `[x0]` or a bracket `[a, b]`.
#[wasm_bindgen]
pub fn find_root(f: &Function, seed: Vec<f64>, settings: JsValue) -> Result<JsValue, JsValue> {
    let settings: SearchSettings = decode_settings(settings)?;
    let seed = match seed.as_slice() {
        [x0] => RootSeed::Point(*x0),
        [a, b] => RootSeed::Bracket(*a, *b),
        _ => {
            return Err(JsValue::from_str(&format!(
                "Root seed must have 1 or 2 entries (got {})",
                seed.len()
            )))
        }
    };
    let outcome = roots::bracketed_root_with(&real_function(f), seed, &settings)
        .map_err(|e| js_error("Root search failed", e))?;
    serialize(&outcome)
}

#[wasm_bindgen]
pub fn minimize(f: &Function, a: f64, b: f64, settings: JsValue) -> Result<JsValue, JsValue> {
    let settings: SearchSettings = decode_settings(settings)?;
    let outcome = roots::minimize_with(&real_function(f), (a, b), &settings)
        .map_err(|e| js_error("Minimisation failed", e))?;
    serialize(&outcome)
}

/// Trajectory of `dx/dt = f(t, x)` as an array of `steps + 1` states.
///
/// `method` is `"euler"`, `"heun"`, `"rk4"` or a tableau object `{ a, b, c }`.
#[wasm_bindgen]
pub fn runge_kutta(
    method: JsValue,
    x0: Vec<f64>,
    t0: f64,
    t1: f64,
    steps: u32,
    f: &Function,
) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let method = match method.as_string() {
        Some(name) => name
            .parse::<RungeKuttaMethod>()
            .map_err(|e| js_error("Invalid method", e))?,
        None => {
            let tableau: ButcherTableau =
                from_value(method).map_err(|e| js_error("Invalid Butcher tableau", e))?;
            RungeKuttaMethod::Custom(tableau)
        }
    };

    let states = solvers::runge_kutta(&method, &x0, (t0, t1), steps as usize, vector_field(f))
        .map_err(|e| js_error("Integration failed", e))?;
    serialize(&states)
}

/// Simplified polyline `{ xs, ys }`; interior gaps come back as NaN markers.
#[wasm_bindgen]
pub fn simplify_polyline(xs: Vec<f64>, ys: Vec<f64>, eps: f64) -> Result<JsValue, JsValue> {
    let points = points_from_flat(&xs, &ys).map_err(|e| js_error("Invalid polyline", e))?;
    let simplified = simplify::simplify(&points, eps);
    serialize(&PolylinePayload {
        xs: simplified.iter().map(|p| p.x).collect(),
        ys: simplified.iter().map(|p| p.y).collect(),
    })
}
