//! Dense linear algebra bindings. Matrices travel as flat row-major arrays.

use crate::shared::{js_error, matrix_from_flat, matrix_to_flat, serialize};
use plotnum_core::linalg;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Eigen-decomposition payload; `eigenvectors` holds one eigenvector per column.
#[derive(Serialize)]
struct EigenPayload {
    eigenvalues: Vec<f64>,
    eigenvectors: Vec<f64>,
    sweeps: usize,
    converged: bool,
}

#[wasm_bindgen]
pub fn solve_linear_system(matrix: Vec<f64>, n: u32, rhs: Vec<f64>) -> Result<Vec<f64>, JsValue> {
    let n = n as usize;
    let a = matrix_from_flat(&matrix, n, n).map_err(|e| js_error("Invalid matrix", e))?;
    linalg::solve(&a, &rhs).map_err(|e| js_error("Linear solve failed", e))
}

#[wasm_bindgen]
pub fn determinant(matrix: Vec<f64>, rows: u32, cols: u32) -> Result<f64, JsValue> {
    let m = matrix_from_flat(&matrix, rows as usize, cols as usize)
        .map_err(|e| js_error("Invalid matrix", e))?;
    linalg::determinant(&m).map_err(|e| js_error("Determinant failed", e))
}

#[wasm_bindgen]
pub fn jacobi_eigen(matrix: Vec<f64>, n: u32) -> Result<JsValue, JsValue> {
    let n = n as usize;
    let a = matrix_from_flat(&matrix, n, n).map_err(|e| js_error("Invalid matrix", e))?;
    let eigen = linalg::jacobi_eigen(&a).map_err(|e| js_error("Eigen decomposition failed", e))?;

    serialize(&EigenPayload {
        eigenvalues: eigen.values(),
        eigenvectors: matrix_to_flat(&eigen.eigenvectors),
        sweeps: eigen.sweeps,
        converged: eigen.converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_flat_system() {
        let x = solve_linear_system(vec![2.0, 1.0, 1.0, 3.0], 2, vec![3.0, 5.0]).expect("solve");
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.4).abs() < 1e-12);
    }

    #[test]
    fn determinant_of_flat_matrix() {
        let det = determinant(vec![1.0, 2.0, 3.0, 4.0], 2, 2).expect("determinant");
        assert_eq!(det, -2.0);
    }
}
