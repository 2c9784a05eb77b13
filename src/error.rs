//! Error types for checked math operations.

use thiserror::Error;

/// Errors surfaced by the checked variants of math operations.
///
/// The unchecked operations never return these; they follow IEEE float
/// semantics and let `NaN`/`Inf` propagate to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    /// A component or row index was outside the valid range.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of addressable elements.
        len: usize,
    },

    /// The input cannot be processed, e.g. normalizing a zero vector.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// The matrix has no inverse.
    #[error("singular matrix: determinant is {determinant}")]
    SingularMatrix {
        /// The determinant that made inversion impossible.
        determinant: f32,
    },
}

impl MathError {
    /// Creates an index out of range error.
    #[must_use]
    pub const fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Creates a degenerate input error.
    #[must_use]
    pub fn degenerate_input(reason: impl Into<String>) -> Self {
        Self::DegenerateInput(reason.into())
    }

    /// Creates a singular matrix error.
    #[must_use]
    pub const fn singular_matrix(determinant: f32) -> Self {
        Self::SingularMatrix { determinant }
    }
}

/// Result type for checked math operations.
pub type Result<T> = std::result::Result<T, MathError>;
