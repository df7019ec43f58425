//! Design matrix assembly.
//!
//! The builder column-stacks named basis vectors, in caller order, into an
//! `n x k` matrix. Column order is a binding contract: coefficient `j` of the
//! solver output corresponds to column `j` here, and the reconstruction step
//! relies on `column_index` to locate the signal-template column.
//!
//! Rank deficiency is deliberately NOT checked here; it depends on the actual
//! values, not the shape, and is surfaced by the solver.

use nalgebra::DMatrix;

use crate::domain::BasisVector;
use crate::math::error::LsqError;

/// An `n x k` design matrix with named columns.
///
/// Immutable once built; rebuild it when the set or order of basis vectors
/// changes.
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    names: Vec<String>,
    matrix: DMatrix<f64>,
}

impl DesignMatrix {
    /// Column-stack basis vectors in the given order.
    ///
    /// Fails with `DimensionMismatch` (naming the offending vector) if any
    /// basis vector's length differs from the first, and with `EmptyBasis`
    /// for an empty collection.
    pub fn from_basis(basis: &[BasisVector]) -> Result<Self, LsqError> {
        let Some(first) = basis.first() else {
            return Err(LsqError::EmptyBasis);
        };
        let n = first.len();

        for b in basis {
            if b.len() != n {
                return Err(LsqError::DimensionMismatch {
                    what: format!("basis vector `{}`", b.name()),
                    expected: n,
                    got: b.len(),
                });
            }
        }

        let k = basis.len();
        let matrix = DMatrix::from_fn(n, k, |i, j| basis[j].values()[i]);
        let names = basis.iter().map(|b| b.name().to_string()).collect();

        Ok(Self { names, matrix })
    }

    /// Number of samples (rows).
    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of basis vectors (columns).
    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    /// Column names, in matrix order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Index of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_column_order_and_names() {
        let basis = vec![
            BasisVector::new("const", vec![1.0, 1.0, 1.0]),
            BasisVector::new("trend", vec![-1.0, 0.0, 1.0]),
        ];
        let design = DesignMatrix::from_basis(&basis).unwrap();

        assert_eq!(design.nrows(), 3);
        assert_eq!(design.ncols(), 2);
        assert_eq!(design.names(), &["const".to_string(), "trend".to_string()]);
        assert_eq!(design.column_index("trend"), Some(1));
        assert_eq!(design.column_index("missing"), None);
        assert_eq!(design.matrix()[(0, 1)], -1.0);
        assert_eq!(design.matrix()[(2, 0)], 1.0);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let basis = vec![
            BasisVector::new("const", vec![1.0, 1.0, 1.0]),
            BasisVector::new("short", vec![1.0, 2.0]),
        ];
        let err = DesignMatrix::from_basis(&basis).unwrap_err();
        match err {
            LsqError::DimensionMismatch { what, expected, got } => {
                assert!(what.contains("short"));
                assert_eq!(expected, 3);
                assert_eq!(got, 2);
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_basis() {
        let err = DesignMatrix::from_basis(&[]).unwrap_err();
        assert_eq!(err, LsqError::EmptyBasis);
    }
}
