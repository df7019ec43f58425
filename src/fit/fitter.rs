//! Single-light-curve detrending.
//!
//! Given a light curve and an ordered set of basis vectors (nuisance terms
//! plus, optionally, a signal template), we:
//!
//! - build the design matrix `X`
//! - solve the weighted least-squares problem for coefficients + covariance
//! - reconstruct the best-fit model `X beta`, the residual `y - X beta`, and
//!   the recovered signal `y - X_nuisance beta_nuisance` (all columns except
//!   the signal-template column)
//!
//! The recovered signal carries the template coefficient's uncertainty (from
//! the covariance diagonal), not an independent noise source.

use nalgebra::{DMatrix, DVector};

use crate::domain::{BasisVector, CoefficientEstimate, FitQuality, LightCurve};
use crate::error::AppError;
use crate::math::{DesignMatrix, solve_weighted};

/// Everything computed by one detrend run.
#[derive(Debug, Clone)]
pub struct DetrendFit {
    /// One entry per design-matrix column, in column order.
    pub coefficients: Vec<CoefficientEstimate>,
    /// `k x k` coefficient covariance.
    pub covariance: DMatrix<f64>,
    /// Design-matrix column names, in fit order.
    pub basis_names: Vec<String>,
    /// Name of the signal-template column, if one was designated.
    pub signal: Option<String>,

    /// Best-fit model, `X beta`.
    pub model: Vec<f64>,
    /// Observation minus the fitted nuisance terms.
    pub recovered: Vec<f64>,
    /// Observation minus the full model.
    pub residual: Vec<f64>,

    pub quality: FitQuality,
}

impl DetrendFit {
    /// Look up a fitted coefficient by basis name.
    pub fn coefficient(&self, name: &str) -> Option<&CoefficientEstimate> {
        self.coefficients.iter().find(|c| c.name == name)
    }
}

/// Detrend a light curve against the given basis vectors.
///
/// `signal` designates the basis column to *exclude* from the nuisance
/// subtraction; when `None`, the recovered signal equals the residual.
pub fn detrend(
    lc: &LightCurve,
    basis: &[BasisVector],
    signal: Option<&str>,
) -> Result<DetrendFit, AppError> {
    let design = DesignMatrix::from_basis(basis).map_err(AppError::from)?;

    let signal_col = match signal {
        Some(name) => Some(design.column_index(name).ok_or_else(|| {
            AppError::new(2, format!("Signal column `{name}` is not among the basis vectors."))
        })?),
        None => None,
    };

    let y = DVector::from_vec(lc.flux.clone());
    let sigma = DVector::from_vec(lc.flux_err.clone());
    let sol = solve_weighted(&design, &y, &sigma)?;

    let x = design.matrix();
    let model_v = x * &sol.coefficients;

    // Nuisance-only prediction: zero the signal coefficient and reuse X.
    let mut beta_nuisance = sol.coefficients.clone();
    if let Some(j) = signal_col {
        beta_nuisance[j] = 0.0;
    }
    let nuisance_v = x * &beta_nuisance;

    let n = design.nrows();
    let k = design.ncols();
    let mut model = Vec::with_capacity(n);
    let mut recovered = Vec::with_capacity(n);
    let mut residual = Vec::with_capacity(n);
    let mut chi2 = 0.0;
    let mut ss = 0.0;
    for i in 0..n {
        let r = lc.flux[i] - model_v[i];
        model.push(model_v[i]);
        recovered.push(lc.flux[i] - nuisance_v[i]);
        residual.push(r);
        let z = r / lc.flux_err[i];
        chi2 += z * z;
        ss += r * r;
    }

    let coefficients = design
        .names()
        .iter()
        .enumerate()
        .map(|(j, name)| CoefficientEstimate {
            name: name.clone(),
            value: sol.coefficients[j],
            std_error: sol.covariance[(j, j)].max(0.0).sqrt(),
        })
        .collect();

    Ok(DetrendFit {
        coefficients,
        covariance: sol.covariance,
        basis_names: design.names().to_vec(),
        signal: signal.map(str::to_string),
        model,
        recovered,
        residual,
        quality: FitQuality {
            chi2,
            dof: n - k,
            rmse: (ss / n as f64).sqrt(),
            n,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SampleOptions, generate_sample};
    use crate::models::{SIGNAL_NAME, full_basis};

    fn demo_options(noise: f64, seed: u64) -> SampleOptions {
        SampleOptions {
            count: 1200,
            seed,
            noise_sigma: noise,
            cadence_minutes: 1.0,
            roll_period: 0.25,
            transit: Some(crate::domain::TransitSpec {
                t0: 0.2,
                period: 0.45,
                duration: 0.08,
            }),
        }
    }

    #[test]
    fn zero_noise_synthetic_is_recovered_exactly() {
        let opts = demo_options(0.0, 7);
        let sample = generate_sample(&opts).unwrap();
        let basis = full_basis(&sample.lc, opts.roll_period, opts.transit.as_ref());

        let fit = detrend(&sample.lc, &basis, Some(SIGNAL_NAME)).unwrap();

        for (name, truth) in &sample.truth {
            let c = fit.coefficient(name).unwrap();
            assert!(
                (c.value - truth).abs() < 1e-8 * truth.abs().max(1.0),
                "{name}: {} vs {truth}",
                c.value
            );
        }
        for r in &fit.residual {
            assert!(r.abs() < 1e-8);
        }
    }

    #[test]
    fn recovered_minus_residual_is_the_scaled_template() {
        // Algebraic identity: recovered - residual == beta_signal * template.
        let opts = demo_options(4e-4, 11);
        let sample = generate_sample(&opts).unwrap();
        let basis = full_basis(&sample.lc, opts.roll_period, opts.transit.as_ref());
        let template = basis.last().unwrap().clone();
        assert_eq!(template.name(), SIGNAL_NAME);

        let fit = detrend(&sample.lc, &basis, Some(SIGNAL_NAME)).unwrap();
        let depth = fit.coefficient(SIGNAL_NAME).unwrap().value;

        for i in 0..sample.lc.len() {
            let expected = depth * template.values()[i];
            assert!((fit.recovered[i] - fit.residual[i] - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn noisy_transit_depth_within_three_standard_errors() {
        let opts = demo_options(5e-4, 42);
        let sample = generate_sample(&opts).unwrap();
        let basis = full_basis(&sample.lc, opts.roll_period, opts.transit.as_ref());

        let fit = detrend(&sample.lc, &basis, Some(SIGNAL_NAME)).unwrap();
        let c = fit.coefficient(SIGNAL_NAME).unwrap();
        let truth = sample
            .truth
            .iter()
            .find(|(name, _)| name == SIGNAL_NAME)
            .map(|(_, v)| *v)
            .unwrap();

        assert!(c.std_error > 0.0);
        assert!(
            (c.value - truth).abs() < 3.0 * c.std_error,
            "depth {} vs {truth} (se {})",
            c.value,
            c.std_error
        );
        // Unit-variance noise model: reduced chi2 should be near 1.
        let rchi2 = fit.quality.reduced_chi2();
        assert!(rchi2 > 0.7 && rchi2 < 1.3, "reduced chi2 {rchi2}");
    }

    #[test]
    fn without_signal_recovered_equals_residual() {
        let opts = SampleOptions {
            transit: None,
            ..demo_options(3e-4, 5)
        };
        let sample = generate_sample(&opts).unwrap();
        let basis = full_basis(&sample.lc, opts.roll_period, None);

        let fit = detrend(&sample.lc, &basis, None).unwrap();
        for i in 0..sample.lc.len() {
            assert_eq!(fit.recovered[i], fit.residual[i]);
        }
    }

    #[test]
    fn unknown_signal_column_is_an_input_error() {
        let opts = demo_options(1e-4, 3);
        let sample = generate_sample(&opts).unwrap();
        let basis = full_basis(&sample.lc, opts.roll_period, None);

        let err = detrend(&sample.lc, &basis, Some(SIGNAL_NAME)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
