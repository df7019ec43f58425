//! Shared fit-pipeline logic for the CLI front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load/generate -> basis construction -> weighted fit -> reconstruction
//!
//! The CLI can then focus on presentation (printing and exports).

use crate::data::{SampleOptions, SyntheticData, generate_sample};
use crate::domain::{DetrendConfig, LightCurve};
use crate::error::AppError;
use crate::fit::{DetrendFit, detrend, detrend_ensemble};
use crate::io::ingest::{DatasetStats, IngestedData, load_light_curve};
use crate::models::{SIGNAL_NAME, full_basis};

/// All computed outputs of a single `lcd fit` run.
#[derive(Debug, Clone)]
pub struct FitRunOutput {
    pub ingest: IngestedData,
    pub fit: DetrendFit,
}

/// All computed outputs of a single `lcd demo` run.
#[derive(Debug, Clone)]
pub struct DemoRunOutput {
    pub sample: SyntheticData,
    pub stats: DatasetStats,
    pub fit: DetrendFit,
    /// Fits over additional noise realizations, when `repeats > 1`.
    pub ensemble: Option<Vec<DetrendFit>>,
}

/// Execute the CSV fitting pipeline.
pub fn run_fit(config: &DetrendConfig) -> Result<FitRunOutput, AppError> {
    let path = config
        .csv_path
        .as_ref()
        .ok_or_else(|| AppError::new(2, "No input CSV configured."))?;

    let ingest = load_light_curve(path)?;
    let fit = fit_light_curve(&ingest.lc, config)?;

    Ok(FitRunOutput { ingest, fit })
}

/// Execute the synthetic demo pipeline.
pub fn run_demo(config: &DetrendConfig) -> Result<DemoRunOutput, AppError> {
    let opts = SampleOptions {
        count: config.sample_count,
        seed: config.seed,
        noise_sigma: config.noise_sigma,
        cadence_minutes: config.cadence_minutes,
        roll_period: config.roll_period,
        transit: config.transit,
    };

    let sample = generate_sample(&opts)?;
    let fit = fit_light_curve(&sample.lc, config)?;
    let stats = stats_for(&sample.lc);

    // Additional realizations only differ by seed; each fit is independent.
    // Seeds start one past the headline fit so no realization repeats it.
    let ensemble = if config.repeats > 1 {
        let lcs: Vec<LightCurve> = (0..config.repeats)
            .map(|i| {
                generate_sample(&SampleOptions {
                    seed: config.seed.wrapping_add(i as u64 + 1),
                    ..opts.clone()
                })
                .map(|s| s.lc)
            })
            .collect::<Result<_, _>>()?;
        Some(detrend_ensemble(
            &lcs,
            config.roll_period,
            config.transit.as_ref(),
        )?)
    } else {
        None
    };

    Ok(DemoRunOutput {
        sample,
        stats,
        fit,
        ensemble,
    })
}

fn fit_light_curve(lc: &LightCurve, config: &DetrendConfig) -> Result<DetrendFit, AppError> {
    let basis = full_basis(lc, config.roll_period, config.transit.as_ref());
    detrend(lc, &basis, config.transit.as_ref().map(|_| SIGNAL_NAME))
}

fn stats_for(lc: &LightCurve) -> DatasetStats {
    let mut time_min = f64::INFINITY;
    let mut time_max = f64::NEG_INFINITY;
    let mut flux_min = f64::INFINITY;
    let mut flux_max = f64::NEG_INFINITY;
    for (&t, &f) in lc.time.iter().zip(&lc.flux) {
        time_min = time_min.min(t);
        time_max = time_max.max(t);
        flux_min = flux_min.min(f);
        flux_max = flux_max.max(f);
    }
    DatasetStats {
        n_points: lc.len(),
        time_min,
        time_max,
        flux_min,
        flux_max,
    }
}
