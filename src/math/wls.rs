//! Weighted least-squares solver.
//!
//! We solve the normal equations
//!
//! ```text
//! (X^T W X) beta = X^T W y,    W = diag(1 / sigma_i^2)
//! ```
//!
//! which is the closed-form Gauss-Markov estimator for independent Gaussian
//! noise with per-point standard deviation `sigma_i`. The coefficient
//! covariance is `(X^T W X)^{-1}`.
//!
//! Implementation choices:
//! - Rows are scaled by `1 / sigma_i` so `X^T W X` is formed in a single pass
//!   as `Xw^T Xw`, and that `k x k` matrix is factorized exactly once.
//! - The factorization is Cholesky: `X^T W X` is symmetric positive-definite
//!   for a full-rank design, and the same factorization yields both the
//!   coefficient solve and the covariance inverse.
//! - A reciprocal-condition estimate from the Cholesky pivots guards against
//!   near-singular systems; we surface `SingularDesignMatrix` instead of
//!   returning numerically meaningless coefficients.

use nalgebra::{Cholesky, DMatrix, DVector};

use crate::math::design::DesignMatrix;
use crate::math::error::LsqError;

/// Reciprocal-condition threshold below which the normal equations are
/// declared singular.
///
/// Estimated from the Cholesky factor `L` as `(min diag L / max diag L)^2`,
/// a cheap lower-bound proxy for `1 / cond(X^T W X)`.
pub const RCOND_MIN: f64 = 1e-12;

/// Output of a single weighted solve: coefficients and their covariance.
///
/// `coefficients[j]` corresponds to design column `j`; `covariance` is
/// `k x k`, symmetrized against floating-point asymmetry.
#[derive(Debug, Clone)]
pub struct WlsSolution {
    pub coefficients: DVector<f64>,
    pub covariance: DMatrix<f64>,
}

/// Solve the weighted least-squares problem for the given design matrix,
/// observations, and per-point uncertainties.
///
/// Every call is independent and deterministic given its inputs. On failure
/// no partial result is returned.
pub fn solve_weighted(
    design: &DesignMatrix,
    y: &DVector<f64>,
    sigma: &DVector<f64>,
) -> Result<WlsSolution, LsqError> {
    let n = design.nrows();
    let k = design.ncols();

    // Eager shape validation, before any numeric work.
    if y.len() != n {
        return Err(LsqError::DimensionMismatch {
            what: "observation vector".to_string(),
            expected: n,
            got: y.len(),
        });
    }
    if sigma.len() != n {
        return Err(LsqError::DimensionMismatch {
            what: "uncertainty vector".to_string(),
            expected: n,
            got: sigma.len(),
        });
    }
    for (i, &s) in sigma.iter().enumerate() {
        if !s.is_finite() || s <= 0.0 {
            return Err(LsqError::InvalidUncertainty { index: i, value: s });
        }
    }

    // Fewer rows than columns: X^T W X has rank <= n < k.
    if n < k {
        return Err(LsqError::SingularDesignMatrix { n, k, rcond: 0.0 });
    }

    // Row scaling by sqrt(w_i) = 1 / sigma_i.
    let mut xw = design.matrix().clone();
    let mut yw = y.clone();
    for i in 0..n {
        let sw = 1.0 / sigma[i];
        for j in 0..k {
            xw[(i, j)] *= sw;
        }
        yw[i] *= sw;
    }

    let xtwx = xw.transpose() * &xw;
    let xtwy = xw.transpose() * &yw;

    let Some(chol) = Cholesky::new(xtwx) else {
        return Err(LsqError::SingularDesignMatrix { n, k, rcond: 0.0 });
    };

    // Conditioning estimate from the pivots of L.
    let l = chol.l();
    let mut d_min = f64::INFINITY;
    let mut d_max = 0.0_f64;
    for j in 0..k {
        let d = l[(j, j)];
        d_min = d_min.min(d);
        d_max = d_max.max(d);
    }
    let rcond = if d_max > 0.0 {
        (d_min / d_max).powi(2)
    } else {
        0.0
    };
    if !rcond.is_finite() || rcond < RCOND_MIN {
        return Err(LsqError::SingularDesignMatrix { n, k, rcond });
    }

    let coefficients = chol.solve(&xtwy);

    // Covariance is the inverse of the same factorized matrix; symmetrize to
    // remove round-off asymmetry.
    let covariance = chol.inverse();
    let covariance = (&covariance + covariance.transpose()) * 0.5;

    Ok(WlsSolution {
        coefficients,
        covariance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BasisVector;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    fn design_2col(n: usize) -> DesignMatrix {
        let t: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let ones = vec![1.0; n];
        DesignMatrix::from_basis(&[
            BasisVector::new("t", t),
            BasisVector::new("const", ones),
        ])
        .unwrap()
    }

    #[test]
    fn zero_noise_recovery_is_exact() {
        // y = 2t - 1 with no noise: the solver must return [2, -1] exactly
        // (to floating-point tolerance) for any uniform positive sigma.
        let n = 50;
        let design = design_2col(n);
        let beta_true = DVector::from_row_slice(&[2.0, -1.0]);
        let y = design.matrix() * &beta_true;

        for &s in &[0.1, 1.0, 50.0] {
            let sigma = DVector::from_element(n, s);
            let sol = solve_weighted(&design, &y, &sigma).unwrap();
            assert!((sol.coefficients[0] - 2.0).abs() < 1e-8);
            assert!((sol.coefficients[1] + 1.0).abs() < 1e-8);
        }
    }

    #[test]
    fn uniform_sigma_rescale_leaves_coefficients_unchanged() {
        let n = 40;
        let design = design_2col(n);
        let t: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let y = DVector::from_vec(t.iter().map(|&x| 0.5 * x + 3.0 + (x * 0.7).sin()).collect());

        let sigma_a = DVector::from_element(n, 1.0);
        let sigma_b = DVector::from_element(n, 5.0);

        let a = solve_weighted(&design, &y, &sigma_a).unwrap();
        let b = solve_weighted(&design, &y, &sigma_b).unwrap();

        for j in 0..2 {
            assert!((a.coefficients[j] - b.coefficients[j]).abs() < 1e-9);
        }
        // Covariance scales by the square of the sigma ratio.
        for i in 0..2 {
            for j in 0..2 {
                assert!((b.covariance[(i, j)] - 25.0 * a.covariance[(i, j)]).abs() < 1e-9 * 25.0);
            }
        }
    }

    #[test]
    fn covariance_is_symmetric_with_nonnegative_diagonal() {
        let n = 30;
        let t: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
        let design = DesignMatrix::from_basis(&[
            BasisVector::new("t", t.clone()),
            BasisVector::new("t2", t.iter().map(|x| x * x).collect()),
            BasisVector::new("const", vec![1.0; n]),
        ])
        .unwrap();
        let y = DVector::from_vec(t.iter().map(|&x| 1.0 + x - 0.5 * x * x).collect());
        let sigma = DVector::from_element(n, 0.3);

        let sol = solve_weighted(&design, &y, &sigma).unwrap();
        for i in 0..3 {
            assert!(sol.covariance[(i, i)] >= 0.0);
            for j in 0..3 {
                assert!((sol.covariance[(i, j)] - sol.covariance[(j, i)]).abs() < 1e-15);
            }
        }
    }

    #[test]
    fn constant_only_covariance_matches_analytic_value() {
        // For a ones column, Var(beta) = sigma^2 / n exactly.
        let n = 25;
        let design = DesignMatrix::from_basis(&[BasisVector::new("const", vec![1.0; n])]).unwrap();
        let y = DVector::from_element(n, 7.0);
        let sigma = DVector::from_element(n, 2.0);

        let sol = solve_weighted(&design, &y, &sigma).unwrap();
        assert!((sol.coefficients[0] - 7.0).abs() < 1e-10);
        assert!((sol.covariance[(0, 0)] - 4.0 / n as f64).abs() < 1e-10);
    }

    #[test]
    fn duplicate_column_is_rejected_as_singular() {
        let n = 20;
        let t: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let design = DesignMatrix::from_basis(&[
            BasisVector::new("t", t.clone()),
            BasisVector::new("t_scaled", t.iter().map(|x| 3.0 * x).collect()),
        ])
        .unwrap();
        let y = DVector::from_element(n, 1.0);
        let sigma = DVector::from_element(n, 1.0);

        let err = solve_weighted(&design, &y, &sigma).unwrap_err();
        assert!(matches!(err, LsqError::SingularDesignMatrix { .. }));
    }

    #[test]
    fn short_observation_vector_is_rejected() {
        let design = design_2col(10);
        let y = DVector::from_element(9, 1.0);
        let sigma = DVector::from_element(10, 1.0);

        let err = solve_weighted(&design, &y, &sigma).unwrap_err();
        assert!(matches!(err, LsqError::DimensionMismatch { .. }));
    }

    #[test]
    fn nonpositive_sigma_is_rejected() {
        let design = design_2col(5);
        let y = DVector::from_element(5, 1.0);

        let mut sigma = DVector::from_element(5, 1.0);
        sigma[3] = 0.0;
        let err = solve_weighted(&design, &y, &sigma).unwrap_err();
        assert_eq!(
            err,
            LsqError::InvalidUncertainty {
                index: 3,
                value: 0.0
            }
        );

        sigma[3] = -2.0;
        let err = solve_weighted(&design, &y, &sigma).unwrap_err();
        assert!(matches!(err, LsqError::InvalidUncertainty { index: 3, .. }));
    }

    #[test]
    fn more_columns_than_rows_is_singular() {
        let design = DesignMatrix::from_basis(&[
            BasisVector::new("a", vec![1.0, 2.0]),
            BasisVector::new("b", vec![0.5, -1.0]),
            BasisVector::new("c", vec![3.0, 0.0]),
        ])
        .unwrap();
        let y = DVector::from_element(2, 1.0);
        let sigma = DVector::from_element(2, 1.0);

        let err = solve_weighted(&design, &y, &sigma).unwrap_err();
        assert!(matches!(
            err,
            LsqError::SingularDesignMatrix { n: 2, k: 3, .. }
        ));
    }

    #[test]
    fn noisy_line_recovered_within_three_standard_errors() {
        // y = 3t + 7 + N(0, 50) over t = 0..999 with sigma_i = 50. The fitted
        // coefficients must land within 3 standard errors (from the returned
        // covariance) of the truth.
        let n = 1000;
        let design = design_2col(n);
        let mut rng = StdRng::seed_from_u64(42);
        let normal = Normal::new(0.0, 50.0).unwrap();

        let y = DVector::from_vec(
            (0..n)
                .map(|i| 3.0 * i as f64 + 7.0 + normal.sample(&mut rng))
                .collect(),
        );
        let sigma = DVector::from_element(n, 50.0);

        let sol = solve_weighted(&design, &y, &sigma).unwrap();
        let truth = [3.0, 7.0];
        for j in 0..2 {
            let se = sol.covariance[(j, j)].sqrt();
            assert!(se > 0.0);
            assert!(
                (sol.coefficients[j] - truth[j]).abs() < 3.0 * se,
                "coefficient {j}: {} vs {} (se {se})",
                sol.coefficients[j],
                truth[j]
            );
        }
    }
}
