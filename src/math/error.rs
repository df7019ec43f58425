//! Failure taxonomy for the least-squares core.
//!
//! All variants are local precondition failures with no recovery inside the
//! core: the caller fixes the inputs (drop a collinear column, realign vector
//! lengths, fix uncertainty values) and retries. No partial result accompanies
//! an error.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LsqError {
    /// Two inputs that must share a length disagree.
    ///
    /// Detected eagerly, before any numeric work. Inputs are never silently
    /// truncated or padded.
    #[error("dimension mismatch: {what} has length {got}, expected {expected}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        got: usize,
    },

    /// An uncertainty entry is non-positive or non-finite.
    ///
    /// Never clamped to a small positive value: that would silently bias the
    /// weighting.
    #[error("invalid uncertainty at index {index}: {value} (must be finite and > 0)")]
    InvalidUncertainty { index: usize, value: f64 },

    /// The normal-equations matrix is not invertible within tolerance.
    ///
    /// `rcond` is the reciprocal-condition estimate that triggered the
    /// rejection (0 when the Cholesky factorization failed outright or the
    /// system is under-determined).
    #[error(
        "singular design matrix: normal equations are rank-deficient \
         (n={n}, k={k}, rcond~{rcond:.3e}); check for collinear basis vectors"
    )]
    SingularDesignMatrix { n: usize, k: usize, rcond: f64 },

    /// The design matrix has no columns.
    #[error("design matrix needs at least one basis vector")]
    EmptyBasis,
}
