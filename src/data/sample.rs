//! Deterministic synthetic light curves with known truth coefficients.
//!
//! The generator injects the same effects the standard nuisance basis models:
//! a linear flux trend, centroid drift at the roll period, a slower thermal
//! background term, a box transit, and Gaussian flux noise. Truth
//! coefficients are returned alongside the data so end-to-end recovery can be
//! checked against the fitted values.

use std::f64::consts::TAU;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::{LightCurve, TransitSpec};
use crate::error::AppError;
use crate::models::full_basis;

/// Centroid jitter sigma (pixels). Keeps the centroid columns linearly
/// independent of the pure harmonic pair.
const CENTROID_JITTER: f64 = 0.05;

/// Background proxy jitter sigma.
const BACKGROUND_JITTER: f64 = 0.02;

/// Settings for one synthetic light curve.
#[derive(Debug, Clone)]
pub struct SampleOptions {
    pub count: usize,
    pub seed: u64,
    /// Gaussian flux noise sigma, in flux units. Zero produces a noiseless
    /// curve (with unit reported uncertainties so the fit stays well posed).
    pub noise_sigma: f64,
    pub cadence_minutes: f64,
    /// Roll period (days) driving centroid drift and the harmonic background.
    pub roll_period: f64,
    pub transit: Option<TransitSpec>,
}

/// Generated light curve plus the true coefficient per basis name, in the
/// order `models::full_basis` produces them.
#[derive(Debug, Clone)]
pub struct SyntheticData {
    pub lc: LightCurve,
    pub truth: Vec<(String, f64)>,
}

pub fn generate_sample(opts: &SampleOptions) -> Result<SyntheticData, AppError> {
    if opts.count < 32 {
        return Err(AppError::new(2, "Sample count must be at least 32."));
    }
    if !(opts.cadence_minutes.is_finite() && opts.cadence_minutes > 0.0) {
        return Err(AppError::new(2, "Cadence must be finite and > 0 minutes."));
    }
    if !(opts.roll_period.is_finite() && opts.roll_period > 0.0) {
        return Err(AppError::new(2, "Roll period must be finite and > 0 days."));
    }
    if !(opts.noise_sigma.is_finite() && opts.noise_sigma >= 0.0) {
        return Err(AppError::new(2, "Noise sigma must be finite and >= 0."));
    }
    if let Some(tr) = &opts.transit {
        if !(tr.period.is_finite() && tr.period > 0.0) {
            return Err(AppError::new(2, "Transit period must be finite and > 0 days."));
        }
        if !(tr.duration.is_finite() && tr.duration > 0.0 && tr.duration < tr.period) {
            return Err(AppError::new(
                2,
                "Transit duration must be positive and shorter than the period.",
            ));
        }
    }

    let n = opts.count;
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let dt = opts.cadence_minutes / (60.0 * 24.0);
    let time: Vec<f64> = (0..n).map(|i| i as f64 * dt).collect();

    // Pointing drift: roll oscillation plus slow linear drift plus jitter.
    let w_roll = TAU / opts.roll_period;
    let centroid_x: Vec<f64> = time
        .iter()
        .map(|t| 0.8 * (w_roll * t).sin() + 0.02 * t + CENTROID_JITTER * normal.sample(&mut rng))
        .collect();
    let centroid_y: Vec<f64> = time
        .iter()
        .map(|t| {
            0.6 * (w_roll * t + 1.3).cos() - 0.015 * t + CENTROID_JITTER * normal.sample(&mut rng)
        })
        .collect();

    // Thermal background varies on a slower cycle than the roll.
    let w_bg = TAU / (3.0 * opts.roll_period);
    let background: Vec<f64> = time
        .iter()
        .map(|t| 1.0 + 0.3 * (w_bg * t + 0.4).sin() + BACKGROUND_JITTER * normal.sample(&mut rng))
        .collect();

    let flux_err = if opts.noise_sigma > 0.0 {
        opts.noise_sigma
    } else {
        1.0
    };
    let mut lc = LightCurve {
        time,
        flux: vec![0.0; n],
        flux_err: vec![flux_err; n],
        centroid_x: Some(centroid_x),
        centroid_y: Some(centroid_y),
        background: Some(background),
    };

    // Combine the exact nuisance/signal basis with the truth coefficients, so
    // the generated flux is a known linear model plus noise.
    let basis = full_basis(&lc, opts.roll_period, opts.transit.as_ref());
    let truth: Vec<(String, f64)> = basis
        .iter()
        .map(|b| (b.name().to_string(), truth_coefficient(b.name())))
        .collect();

    for i in 0..n {
        let mut f = 0.0;
        for (b, (_, c)) in basis.iter().zip(&truth) {
            f += c * b.values()[i];
        }
        if opts.noise_sigma > 0.0 {
            f += opts.noise_sigma * normal.sample(&mut rng);
        }
        lc.flux[i] = f;
    }

    Ok(SyntheticData { lc, truth })
}

/// True coefficient injected for each basis name (normalized-flux units).
fn truth_coefficient(name: &str) -> f64 {
    match name {
        "const" => 1.0,
        "trend" => -3.2e-3,
        "xc" => 1.4e-3,
        "yc" => -9.0e-4,
        "xc_trend" => 6.0e-4,
        "bg_sin" => 5.0e-4,
        "bg_cos" => -3.0e-4,
        "bg" => 2.1e-3,
        "transit" => 5.6e-3,
        _ => 0.0,
    }
}
