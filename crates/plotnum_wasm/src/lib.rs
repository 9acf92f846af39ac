//! WASM bindings for `plotnum_core`.
//!
//! Everything crosses the boundary as numbers, flat `Float64Array`s, strings, plain
//! objects (via `serde-wasm-bindgen`) or JS functions. Errors surface as string
//! `JsValue`s prefixed with the failing step.

mod curves;
mod linalg;
mod numerics;
mod shared;

pub use curves::{WasmCurve, WasmRegression, WasmSpline};
pub use linalg::{determinant, jacobi_eigen, solve_linear_system};
pub use numerics::{
    find_root, minimize, quadrature, riemann, riemann_sum, runge_kutta, simplify_polyline,
    spline_coefficients, spline_evaluate,
};

#[cfg(test)]
mod tests {
    use super::{WasmCurve, WasmRegression, WasmSpline};

    #[test]
    fn exported_types_are_wired() {
        assert!(std::any::type_name::<WasmSpline>().ends_with("WasmSpline"));
        assert!(std::any::type_name::<WasmRegression>().ends_with("WasmRegression"));
        assert!(std::any::type_name::<WasmCurve>().ends_with("WasmCurve"));
    }
}
