//! Parallel detrending of independent light curves.
//!
//! Each solve is independent and shares no state, so a batch (e.g. many noise
//! realizations, or many targets from the same visit) parallelizes trivially.

use rayon::prelude::*;

use crate::domain::{LightCurve, TransitSpec};
use crate::error::AppError;
use crate::fit::fitter::{DetrendFit, detrend};
use crate::models::{SIGNAL_NAME, full_basis};

/// Detrend each light curve with the standard basis, in parallel.
///
/// Fails if any individual fit fails; results are in input order.
pub fn detrend_ensemble(
    light_curves: &[LightCurve],
    roll_period: f64,
    transit: Option<&TransitSpec>,
) -> Result<Vec<DetrendFit>, AppError> {
    light_curves
        .par_iter()
        .map(|lc| {
            let basis = full_basis(lc, roll_period, transit);
            detrend(lc, &basis, transit.map(|_| SIGNAL_NAME))
        })
        .collect()
}
