//! Prepared evaluators: set up once from data, then sampled many times by the plotter.

use crate::shared::{js_error, points_from_flat, serialize};
use js_sys::Function;
use plotnum_core::interpolation::{
    BSplineCurve, BezierCurve, CardinalSpline, DegreeSource, NaturalSpline, NevilleCurve,
    PolynomialRegression, RegressionPolynomial,
};
use plotnum_core::roots::curve_intersection;
use plotnum_core::traits::ParametricCurve;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmSpline {
    spline: NaturalSpline,
}

#[wasm_bindgen]
impl WasmSpline {
    #[wasm_bindgen(constructor)]
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<WasmSpline, JsValue> {
        console_error_panic_hook::set_once();
        let spline = NaturalSpline::new(&xs, &ys).map_err(|e| js_error("Spline setup failed", e))?;
        Ok(WasmSpline { spline })
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.spline.evaluate(x)
    }

    pub fn evaluate_many(&self, xs: Vec<f64>) -> Vec<f64> {
        self.spline.evaluate_many(&xs)
    }

    /// `[x_min, x_max]` of the knots.
    pub fn domain(&self) -> Vec<f64> {
        let (lo, hi) = self.spline.domain();
        vec![lo, hi]
    }
}

/// Least-squares polynomial that can be refitted when its data or degree changes.
#[wasm_bindgen]
pub struct WasmRegression {
    regression: PolynomialRegression,
    fitted: RegressionPolynomial,
}

#[wasm_bindgen]
impl WasmRegression {
    /// `degree` is a number or a function returning one (read again on every `refit`).
    #[wasm_bindgen(constructor)]
    pub fn new(degree: JsValue, xs: Vec<f64>, ys: Vec<f64>) -> Result<WasmRegression, JsValue> {
        console_error_panic_hook::set_once();

        let degree = if let Some(value) = degree.as_f64() {
            if !(value.is_finite() && value >= 0.0) {
                return Err(JsValue::from_str(&format!(
                    "Regression degree must be a non-negative number (got {})",
                    value
                )));
            }
            DegreeSource::Constant(value.floor() as usize)
        } else if let Some(source) = degree.dyn_ref::<Function>() {
            let source = source.clone();
            DegreeSource::Live(Box::new(move || {
                source
                    .call0(&JsValue::NULL)
                    .ok()
                    .and_then(|value| value.as_f64())
                    .unwrap_or(f64::NAN)
            }))
        } else {
            return Err(JsValue::from_str(
                "Regression degree must be a number or a function",
            ));
        };

        let regression =
            PolynomialRegression::new(degree, &xs, &ys).map_err(|e| js_error("Invalid data", e))?;
        let fitted = regression.fit().map_err(|e| js_error("Regression failed", e))?;
        Ok(WasmRegression { regression, fitted })
    }

    pub fn set_data(&mut self, xs: Vec<f64>, ys: Vec<f64>) -> Result<(), JsValue> {
        self.regression
            .set_data(&xs, &ys)
            .map_err(|e| js_error("Invalid data", e))?;
        self.refit()
    }

    pub fn refit(&mut self) -> Result<(), JsValue> {
        self.fitted = self
            .regression
            .fit()
            .map_err(|e| js_error("Regression failed", e))?;
        Ok(())
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.fitted.evaluate(x)
    }

    pub fn coefficients(&self) -> Vec<f64> {
        self.fitted.coefficients().to_vec()
    }

    pub fn term(&self, var: &str, precision: u32) -> String {
        self.fitted.term(var, precision as usize)
    }
}

/// A parametric curve `t -> (x, y)` built from control points.
#[wasm_bindgen]
pub struct WasmCurve {
    curve: Box<dyn ParametricCurve>,
}

#[wasm_bindgen]
impl WasmCurve {
    pub fn bezier(xs: Vec<f64>, ys: Vec<f64>) -> Result<WasmCurve, JsValue> {
        let points = points_from_flat(&xs, &ys).map_err(|e| js_error("Invalid control points", e))?;
        Ok(Self::wrap(BezierCurve::new(points)))
    }

    pub fn bspline(xs: Vec<f64>, ys: Vec<f64>, order: u32) -> Result<WasmCurve, JsValue> {
        let points = points_from_flat(&xs, &ys).map_err(|e| js_error("Invalid control points", e))?;
        let curve = BSplineCurve::new(points, order as usize)
            .map_err(|e| js_error("B-spline setup failed", e))?;
        Ok(Self::wrap(curve))
    }

    pub fn neville(xs: Vec<f64>, ys: Vec<f64>) -> Result<WasmCurve, JsValue> {
        let points = points_from_flat(&xs, &ys).map_err(|e| js_error("Invalid control points", e))?;
        Ok(Self::wrap(NevilleCurve::new(points)))
    }

    pub fn cardinal(xs: Vec<f64>, ys: Vec<f64>, tau: f64) -> Result<WasmCurve, JsValue> {
        let points = points_from_flat(&xs, &ys).map_err(|e| js_error("Invalid control points", e))?;
        Ok(Self::wrap(CardinalSpline::new(points, tau)))
    }

    pub fn catmull_rom(xs: Vec<f64>, ys: Vec<f64>) -> Result<WasmCurve, JsValue> {
        Self::cardinal(xs, ys, 0.5)
    }

    pub fn x(&self, t: f64) -> f64 {
        self.curve.x(t)
    }

    pub fn y(&self, t: f64) -> f64 {
        self.curve.y(t)
    }

    pub fn t_min(&self) -> f64 {
        self.curve.domain().0
    }

    pub fn t_max(&self) -> f64 {
        self.curve.domain().1
    }

    /// Samples `count` evenly spaced parameters over the domain, returned as `[x0, y0, x1, y1, ...]`.
    pub fn sample(&self, count: u32) -> Vec<f64> {
        let (t_min, t_max) = self.curve.domain();
        let count = count as usize;
        let mut out = Vec::with_capacity(2 * count);
        for i in 0..count {
            let t = if count > 1 {
                t_min + (t_max - t_min) * i as f64 / (count - 1) as f64
            } else {
                t_min
            };
            let (x, y) = self.curve.point(t);
            out.push(x);
            out.push(y);
        }
        out
    }

    /// Intersection with `other` by Newton's method from parameters `(t1, t2)`.
    pub fn intersect(&self, other: &WasmCurve, t1: f64, t2: f64) -> Result<JsValue, JsValue> {
        let hit = curve_intersection(self.curve.as_ref(), other.curve.as_ref(), t1, t2);
        serialize(&hit)
    }
}

impl WasmCurve {
    fn wrap(curve: impl ParametricCurve + 'static) -> WasmCurve {
        console_error_panic_hook::set_once();
        WasmCurve {
            curve: Box::new(curve),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spline_wrapper_sorts_and_evaluates() {
        let spline = WasmSpline::new(vec![2.0, 0.0, 1.0], vec![0.0, 0.0, 1.0]).expect("spline");
        assert_eq!(spline.domain(), vec![0.0, 2.0]);
        assert!((spline.evaluate(0.5) - 0.6875).abs() < 1e-12);
        assert!(spline.evaluate(3.0).is_nan());
    }

    #[test]
    fn bezier_samples_cover_the_domain() {
        let curve = WasmCurve::bezier(vec![0.0, 1.0, 3.0, 4.0], vec![0.0, 2.0, 2.0, 0.0]).expect("curve");
        assert_eq!((curve.t_min(), curve.t_max()), (0.0, 1.0));
        let samples = curve.sample(3);
        assert_eq!(samples, vec![0.0, 0.0, 2.0, 1.5, 4.0, 0.0]);
    }

    #[test]
    fn bspline_and_cardinal_wrappers() {
        let bspline = WasmCurve::bspline(vec![0.0, 2.0, 4.0], vec![0.0, 2.0, 0.0], 2).expect("curve");
        assert!((bspline.x(0.5) - 1.0).abs() < 1e-12);

        let cardinal = WasmCurve::catmull_rom(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0]).expect("curve");
        assert_eq!(cardinal.t_max(), 2.0);
        assert_eq!(cardinal.y(1.0), 1.0);
    }

    #[test]
    fn neville_wrapper() {
        let curve = WasmCurve::neville(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 4.0]).expect("curve");
        assert!((curve.y(1.5) - 2.25).abs() < 1e-12);
    }
}
