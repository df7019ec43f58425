//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single light curve: aligned per-cadence columns of equal length.
///
/// Times are in days from the start of the visit. Flux units are arbitrary
/// (typically normalized); `flux_err` is the per-point 1-sigma measurement
/// uncertainty and must be strictly positive.
#[derive(Debug, Clone)]
pub struct LightCurve {
    pub time: Vec<f64>,
    pub flux: Vec<f64>,
    pub flux_err: Vec<f64>,

    /// Detector centroid column/row (pixels), when the pipeline delivers them.
    pub centroid_x: Option<Vec<f64>>,
    pub centroid_y: Option<Vec<f64>>,

    /// Background proxy (e.g. median sky level), when available.
    pub background: Option<Vec<f64>>,
}

impl LightCurve {
    /// Number of cadences.
    pub fn len(&self) -> usize {
        self.flux.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flux.is_empty()
    }
}

/// One named nuisance or signal quantity sampled at every cadence.
///
/// Immutable once constructed: the design matrix builder only reads it.
#[derive(Debug, Clone)]
pub struct BasisVector {
    name: String,
    values: Vec<f64>,
}

impl BasisVector {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Box transit template parameters (all in days).
///
/// The template itself is unit-depth; the fitted coefficient on the template
/// column is the transit depth in flux units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransitSpec {
    /// Mid-transit time of some transit (any epoch works; the template is
    /// phase-folded).
    pub t0: f64,
    /// Orbital period.
    pub period: f64,
    /// Total transit duration.
    pub duration: f64,
}

/// A fitted coefficient with its standard error from the covariance diagonal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoefficientEstimate {
    pub name: String,
    pub value: f64,
    pub std_error: f64,
}

impl CoefficientEstimate {
    /// Signal-to-noise of the estimate (0 when the standard error vanishes).
    pub fn t_stat(&self) -> f64 {
        if self.std_error > 0.0 {
            self.value / self.std_error
        } else {
            0.0
        }
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub chi2: f64,
    /// Degrees of freedom, `n - k`.
    pub dof: usize,
    pub rmse: f64,
    pub n: usize,
}

impl FitQuality {
    /// Reduced chi-square; `chi2` itself when there are no free degrees.
    pub fn reduced_chi2(&self) -> f64 {
        self.chi2 / self.dof.max(1) as f64
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct DetrendConfig {
    /// Input CSV; `None` means synthetic demo data.
    pub csv_path: Option<PathBuf>,

    /// Spacecraft roll/thermal period (days) for the harmonic nuisance pair.
    pub roll_period: f64,

    /// Transit template; `None` fits nuisance terms only.
    pub transit: Option<TransitSpec>,

    // Synthetic-data settings (demo mode).
    pub sample_count: usize,
    pub seed: u64,
    /// Gaussian flux noise sigma, in flux units.
    pub noise_sigma: f64,
    /// Cadence in minutes.
    pub cadence_minutes: f64,
    /// Number of independent noise realizations to fit.
    pub repeats: usize,

    pub export_results: Option<PathBuf>,
    pub export_fit: Option<PathBuf>,
}

/// A saved fit file (JSON): the portable representation of one detrend run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub n: usize,
    /// Design-matrix column names, in fit order.
    pub basis: Vec<String>,
    /// Name of the signal-template column, if one was fitted.
    pub signal: Option<String>,
    pub coefficients: Vec<CoefficientEstimate>,
    /// Row-major `k x k` coefficient covariance.
    pub covariance: Vec<Vec<f64>>,
    pub quality: FitQuality,
}
