//! Conversions between JS-friendly flat data and the core types.

use js_sys::{Float64Array, Function};
use nalgebra::DMatrix;
use plotnum_core::Point2;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::fmt::Display;
use wasm_bindgen::prelude::*;

/// Reads a row-major `rows x cols` matrix.
pub(crate) fn matrix_from_flat(data: &[f64], rows: usize, cols: usize) -> anyhow::Result<DMatrix<f64>> {
    if data.len() != rows * cols {
        anyhow::bail!(
            "Matrix data has {} entries, expected {} for a {}x{} matrix",
            data.len(),
            rows * cols,
            rows,
            cols
        );
    }
    Ok(DMatrix::from_row_slice(rows, cols, data))
}

/// Flattens `matrix` in row-major order.
pub(crate) fn matrix_to_flat(matrix: &DMatrix<f64>) -> Vec<f64> {
    matrix.transpose().as_slice().to_vec()
}

pub(crate) fn points_from_flat(xs: &[f64], ys: &[f64]) -> anyhow::Result<Vec<Point2>> {
    if xs.len() != ys.len() {
        anyhow::bail!(
            "Coordinate arrays differ in length ({} x values, {} y values)",
            xs.len(),
            ys.len()
        );
    }
    Ok(plotnum_core::types::points_from_coords(xs, ys))
}

/// Wraps a JS function of one number. Exceptions and non-numeric results read as NaN.
pub(crate) fn real_function(f: &Function) -> impl Fn(f64) -> f64 + '_ {
    move |x: f64| {
        f.call1(&JsValue::NULL, &JsValue::from_f64(x))
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(f64::NAN)
    }
}

/// Wraps a JS right hand side `f(t, x) -> dx`. A failed call or a result of the
/// wrong length fills `dx` with NaN.
pub(crate) fn vector_field(f: &Function) -> impl Fn(f64, &[f64], &mut [f64]) + '_ {
    move |t: f64, x: &[f64], dx: &mut [f64]| {
        let state = Float64Array::from(x);
        let result = f
            .call2(&JsValue::NULL, &JsValue::from_f64(t), &JsValue::from(state))
            .ok()
            .map(|value| Float64Array::new(&value));
        match result {
            Some(values) if values.length() as usize == dx.len() => values.copy_to(dx),
            _ => dx.fill(f64::NAN),
        }
    }
}

pub(crate) fn js_error(context: &str, err: impl Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

/// Decodes a settings object; `undefined` or `null` selects the defaults and
/// missing fields keep their default values.
pub(crate) fn decode_settings<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    from_value(value).map_err(|e| js_error("Invalid settings", e))
}

pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrices_round_trip_row_major() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let matrix = matrix_from_flat(&data, 2, 3).expect("matrix");
        assert_eq!(matrix[(0, 2)], 3.0);
        assert_eq!(matrix[(1, 0)], 4.0);
        assert_eq!(matrix_to_flat(&matrix), data.to_vec());
    }

    #[test]
    fn matrix_size_is_checked() {
        let err = matrix_from_flat(&[1.0, 2.0, 3.0], 2, 2).expect_err("size");
        assert!(err.to_string().contains("expected 4"));
    }

    #[test]
    fn points_need_parallel_arrays() {
        let points = points_from_flat(&[0.0, 1.0], &[2.0, 3.0]).expect("points");
        assert_eq!(points[1], Point2::new(1.0, 3.0));
        assert!(points_from_flat(&[0.0], &[]).is_err());
    }
}
