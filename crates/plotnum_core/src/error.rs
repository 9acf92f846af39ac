//! Error type shared by every fallible operation in the crate.
//!
//! Only structural misuse surfaces here. Numerical trouble that a plot can
//! live with (points outside a spline's range, searches that run out of
//! iterations) is reported through NaN values or best-effort results instead.

use thiserror::Error;

/// Result alias used throughout `plotnum_core`.
pub type Result<T> = std::result::Result<T, NumericsError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericsError {
    /// Operand shapes do not fit together (non-square matrix, length mismatch, ...).
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Elimination found no usable pivot for the given column.
    #[error("Matrix is singular: no pivot above tolerance in column {column}.")]
    SingularMatrix { column: usize },

    /// The quadrature rule cannot be applied with this many nodes.
    #[error("{rule} rule requires {requirement}, got {node_count} nodes.")]
    InvalidNodeCount {
        rule: &'static str,
        requirement: &'static str,
        node_count: usize,
    },

    #[error("Invalid bracket: {0}")]
    InvalidBracket(String),

    #[error("Invalid Butcher tableau: {0}")]
    InvalidTableau(String),

    #[error("Unknown Runge-Kutta method '{0}'.")]
    UnknownMethod(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
