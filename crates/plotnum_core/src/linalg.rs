//! Dense linear algebra on small square systems.
//!
//! Inputs are borrowed and never modified; every routine works on its own copy.

use crate::error::{NumericsError, Result};
use crate::types::EPS;
use log::warn;
use nalgebra::DMatrix;

/// Hard cap on Jacobi sweeps before the best-so-far result is returned.
pub const JACOBI_MAX_SWEEPS: usize = 2000;

/// Solves `A x = b` by Gaussian elimination with partial pivoting followed by
/// back substitution.
///
/// Fails if `A` is not square, if `b` does not match its size, or if no pivot
/// of magnitude at least [`EPS`] exists for some column.
pub fn solve(a: &DMatrix<f64>, b: &[f64]) -> Result<Vec<f64>> {
    let n = a.ncols();
    if a.nrows() != n || b.len() != n {
        return Err(NumericsError::DimensionMismatch(format!(
            "expected a square matrix and a right hand side of the same size, got {}x{} and {}",
            a.nrows(),
            n,
            b.len()
        )));
    }

    let mut m = a.clone();
    let mut x = b.to_vec();

    for j in 0..n {
        let mut pivot_row = j;
        let mut pivot_abs = m[(j, j)].abs();
        for i in (j + 1)..n {
            let candidate = m[(i, j)].abs();
            if candidate > pivot_abs {
                pivot_row = i;
                pivot_abs = candidate;
            }
        }
        if pivot_abs < EPS {
            return Err(NumericsError::SingularMatrix { column: j });
        }
        if pivot_row != j {
            m.swap_rows(pivot_row, j);
            x.swap(pivot_row, j);
        }

        let pivot = m[(j, j)];
        for i in (j + 1)..n {
            let factor = m[(i, j)] / pivot;
            if factor == 0.0 {
                continue;
            }
            m[(i, j)] = 0.0;
            for k in (j + 1)..n {
                m[(i, k)] -= factor * m[(j, k)];
            }
            x[i] -= factor * x[j];
        }
    }

    back_substitute_in_place(&m, &mut x)?;
    Ok(x)
}

/// Solves the upper triangular system `R x = b`, leaving `b` untouched.
/// Entries of `R` below the diagonal are ignored.
pub fn back_substitute(r: &DMatrix<f64>, b: &[f64]) -> Result<Vec<f64>> {
    let mut x = b.to_vec();
    back_substitute_in_place(r, &mut x)?;
    Ok(x)
}

/// Solves the upper triangular system `R x = b`, overwriting `b` with `x`.
pub fn back_substitute_in_place(r: &DMatrix<f64>, b: &mut [f64]) -> Result<()> {
    let m = r.nrows();
    let n = r.ncols();
    if b.len() != m || n < m {
        return Err(NumericsError::DimensionMismatch(format!(
            "upper triangular matrix is {}x{} but right hand side has {} entries",
            m,
            n,
            b.len()
        )));
    }

    for i in (0..m).rev() {
        let diag = r[(i, i)];
        if diag == 0.0 {
            return Err(NumericsError::SingularMatrix { column: i });
        }
        let mut acc = b[i];
        for j in (i + 1)..m {
            acc -= r[(i, j)] * b[j];
        }
        b[i] = acc / diag;
    }
    Ok(())
}

/// Determinant of a square matrix.
///
/// 2x2 matrices use the closed formula, everything else goes through
/// [`gauss_bareiss`]. The empty matrix has determinant 0.
pub fn determinant(m: &DMatrix<f64>) -> Result<f64> {
    if m.nrows() != m.ncols() {
        return Err(NumericsError::DimensionMismatch(format!(
            "determinant needs a square matrix, got {}x{}",
            m.nrows(),
            m.ncols()
        )));
    }
    if m.nrows() == 2 {
        return Ok(m[(0, 0)] * m[(1, 1)] - m[(1, 0)] * m[(0, 1)]);
    }
    Ok(gauss_bareiss(m))
}

/// Fraction-free (Bareiss) elimination.
///
/// Each elimination step divides exactly by the previous pivot, so no
/// fractions appear until the last entry. A column without a pivot means the
/// matrix is singular and 0 is returned.
/// See H. Cohen, "A Course in Computational Algebraic Number Theory",
/// Algorithm 2.2.6.
///
/// Only the leading square block is used if `m` is not square.
pub fn gauss_bareiss(m: &DMatrix<f64>) -> f64 {
    let n = m.nrows().min(m.ncols());
    if n == 0 {
        return 0.0;
    }

    let mut a = m.view((0, 0), (n, n)).into_owned();
    let mut previous_pivot = 1.0;
    let mut sign = 1.0;

    for k in 0..(n - 1) {
        let mut pivot = a[(k, k)];

        if pivot.abs() < EPS {
            let Some(row) = ((k + 1)..n).find(|&i| a[(i, k)].abs() >= EPS) else {
                return 0.0;
            };
            // Columns left of k are already eliminated, so a partial swap suffices.
            for j in k..n {
                let tmp = a[(row, j)];
                a[(row, j)] = a[(k, j)];
                a[(k, j)] = tmp;
            }
            sign = -sign;
            pivot = a[(k, k)];
        }

        for i in (k + 1)..n {
            for j in (k + 1)..n {
                a[(i, j)] = (pivot * a[(i, j)] - a[(i, k)] * a[(k, j)]) / previous_pivot;
            }
        }
        previous_pivot = pivot;
    }

    sign * a[(n - 1, n - 1)]
}

/// Result of [`jacobi_eigen`].
#[derive(Debug, Clone)]
pub struct JacobiEigen {
    /// Diagonalised matrix. The eigenvalues sit on its diagonal.
    pub eigenvalues: DMatrix<f64>,
    /// Column `i` is the unit eigenvector for `eigenvalues[(i, i)]`.
    pub eigenvectors: DMatrix<f64>,
    pub sweeps: usize,
    /// False if the sweep cap was hit before the off-diagonal mass fell below [`EPS`].
    pub converged: bool,
}

impl JacobiEigen {
    pub fn values(&self) -> Vec<f64> {
        self.eigenvalues.diagonal().iter().copied().collect()
    }
}

/// Eigen-decomposition of a small symmetric matrix by cyclic Jacobi rotations.
///
/// Meant for the 3x3 (and smaller) matrices of conic and quadric fitting, but
/// any symmetric size works. Each sweep visits every upper off-diagonal entry
/// and annihilates it with a plane rotation of angle
/// `atan2(2 a_ij, a_ii - a_jj) / 2`, accumulating the rotations into `V`.
/// Sweeping stops once the mean absolute off-diagonal entry, relative to the
/// mean absolute entry of the input, drops below [`EPS`], or after
/// [`JACOBI_MAX_SWEEPS`] sweeps.
pub fn jacobi_eigen(input: &DMatrix<f64>) -> Result<JacobiEigen> {
    jacobi_eigen_with(input, JACOBI_MAX_SWEEPS)
}

/// [`jacobi_eigen`] with an explicit sweep cap. At least one sweep is always run.
pub fn jacobi_eigen_with(input: &DMatrix<f64>, max_sweeps: usize) -> Result<JacobiEigen> {
    let n = input.nrows();
    if input.ncols() != n {
        return Err(NumericsError::DimensionMismatch(format!(
            "eigen-decomposition needs a square matrix, got {}x{}",
            n,
            input.ncols()
        )));
    }
    for i in 0..n {
        for j in (i + 1)..n {
            let (upper, lower) = (input[(i, j)], input[(j, i)]);
            if (upper - lower).abs() > EPS * (1.0 + upper.abs().max(lower.abs())) {
                return Err(NumericsError::InvalidArgument(format!(
                    "matrix is not symmetric at ({i}, {j})"
                )));
            }
        }
    }

    let mut a = input.clone();
    let mut v = DMatrix::<f64>::identity(n, n);
    let total: f64 = a.iter().map(|x| x.abs()).sum();

    if n <= 1 || total <= 0.0 {
        return Ok(JacobiEigen {
            eigenvalues: a,
            eigenvectors: v,
            sweeps: 0,
            converged: true,
        });
    }
    let mean = total / (n * n) as f64;

    let mut sweeps = 0;
    loop {
        let mut off_diagonal = 0.0;
        for j in 1..n {
            for i in 0..j {
                let aij = a[(i, j)];
                off_diagonal += aij.abs();
                if aij.abs() < EPS {
                    continue;
                }

                let angle = 0.5 * (2.0 * aij).atan2(a[(i, i)] - a[(j, j)]);
                let (si, co) = angle.sin_cos();

                // A <- A R and V <- V R
                for k in 0..n {
                    let tt = a[(k, i)];
                    a[(k, i)] = co * tt + si * a[(k, j)];
                    a[(k, j)] = -si * tt + co * a[(k, j)];
                    let tt = v[(k, i)];
                    v[(k, i)] = co * tt + si * v[(k, j)];
                    v[(k, j)] = -si * tt + co * v[(k, j)];
                }

                // Rows i and j of R^T (A R); the rest follows from symmetry.
                a[(i, i)] = co * a[(i, i)] + si * a[(j, i)];
                a[(j, j)] = -si * a[(i, j)] + co * a[(j, j)];
                a[(i, j)] = 0.0;
                a[(j, i)] = 0.0;
                for k in 0..n {
                    if k != i && k != j {
                        a[(i, k)] = a[(k, i)];
                        a[(j, k)] = a[(k, j)];
                    }
                }
            }
        }
        sweeps += 1;

        let converged = off_diagonal / mean <= EPS;
        if converged || sweeps >= max_sweeps {
            if !converged {
                warn!(
                    "Jacobi eigen-decomposition stopped after {} sweeps (relative off-diagonal mass {:e}).",
                    sweeps,
                    off_diagonal / mean
                );
            }
            return Ok(JacobiEigen {
                eigenvalues: a,
                eigenvectors: v,
                sweeps,
                converged,
            });
        }
    }
}

/// Residual `A x - b`.
pub fn residual(a: &DMatrix<f64>, x: &[f64], b: &[f64]) -> Vec<f64> {
    (0..a.nrows())
        .map(|i| {
            let row: f64 = (0..a.ncols()).map(|j| a[(i, j)] * x[j]).sum();
            row - b[i]
        })
        .collect()
}
