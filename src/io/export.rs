//! Result exports: per-cadence CSV and fit JSON.
//!
//! The CSV is meant to be easy to consume in spreadsheets or downstream
//! scripts; the JSON is the portable representation of a fit (basis names,
//! coefficients with standard errors, full covariance, quality).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{FitFile, LightCurve};
use crate::error::AppError;
use crate::fit::DetrendFit;

/// Write per-cadence results to a CSV file.
pub fn write_results_csv(path: &Path, lc: &LightCurve, fit: &DetrendFit) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "time,flux,flux_err,model,recovered,residual")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for i in 0..lc.len() {
        writeln!(
            file,
            "{:.10},{:.8},{:.8},{:.8},{:.8},{:.8}",
            lc.time[i], lc.flux[i], lc.flux_err[i], fit.model[i], fit.recovered[i], fit.residual[i],
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write a fit JSON file.
pub fn write_fit_json(path: &Path, fit: &DetrendFit) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create fit JSON '{}': {e}", path.display()))
    })?;

    serde_json::to_writer_pretty(file, &fit_file(fit))
        .map_err(|e| AppError::new(2, format!("Failed to write fit JSON: {e}")))?;

    Ok(())
}

/// Read a fit JSON file.
pub fn read_fit_json(path: &Path) -> Result<FitFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open fit JSON '{}': {e}", path.display()))
    })?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid fit JSON: {e}")))
}

fn fit_file(fit: &DetrendFit) -> FitFile {
    let k = fit.covariance.nrows();
    let covariance = (0..k)
        .map(|i| (0..k).map(|j| fit.covariance[(i, j)]).collect())
        .collect();

    FitFile {
        tool: "lcd".to_string(),
        n: fit.quality.n,
        basis: fit.basis_names.clone(),
        signal: fit.signal.clone(),
        coefficients: fit.coefficients.clone(),
        covariance,
        quality: fit.quality.clone(),
    }
}
