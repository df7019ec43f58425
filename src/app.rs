//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads a CSV or generates synthetic data
//! - builds the nuisance/signal basis and runs the weighted fit
//! - prints reports
//! - writes optional exports

use clap::Parser;

use crate::cli::{Cli, Command, CommonArgs, DemoArgs, FitArgs};
use crate::domain::{DetrendConfig, LightCurve, TransitSpec};
use crate::error::AppError;
use crate::fit::DetrendFit;
use crate::report;

pub mod pipeline;

/// Entry point for the `lcd` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config(&args);
    let run = pipeline::run_fit(&config)?;

    print!("{}", report::format_ingest_notes(&run.ingest));
    print!(
        "{}",
        report::format_run_summary(&run.ingest.stats, &run.fit, None)
    );

    write_exports(&config, &run.ingest.lc, &run.fit)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = demo_config(&args);
    let run = pipeline::run_demo(&config)?;

    print!(
        "{}",
        report::format_run_summary(&run.stats, &run.fit, Some(&run.sample.truth))
    );
    if let Some(ensemble) = &run.ensemble {
        print!(
            "{}",
            report::format_ensemble_summary(ensemble, Some(&run.sample.truth))
        );
    }

    write_exports(&config, &run.sample.lc, &run.fit)
}

fn write_exports(
    config: &DetrendConfig,
    lc: &LightCurve,
    fit: &DetrendFit,
) -> Result<(), AppError> {
    if let Some(path) = &config.export_results {
        crate::io::write_results_csv(path, lc, fit)?;
        println!("Wrote results CSV to {}", path.display());
    }
    if let Some(path) = &config.export_fit {
        crate::io::write_fit_json(path, fit)?;
        println!("Wrote fit JSON to {}", path.display());
    }
    Ok(())
}

fn transit_spec(common: &CommonArgs) -> Option<TransitSpec> {
    if common.no_transit {
        None
    } else {
        Some(TransitSpec {
            t0: common.t0,
            period: common.transit_period,
            duration: common.duration,
        })
    }
}

fn fit_config(args: &FitArgs) -> DetrendConfig {
    DetrendConfig {
        csv_path: Some(args.input.clone()),
        roll_period: args.common.roll_period,
        transit: transit_spec(&args.common),
        sample_count: 0,
        seed: 0,
        noise_sigma: 0.0,
        cadence_minutes: 0.0,
        repeats: 1,
        export_results: args.common.export.clone(),
        export_fit: args.common.export_fit.clone(),
    }
}

fn demo_config(args: &DemoArgs) -> DetrendConfig {
    DetrendConfig {
        csv_path: None,
        roll_period: args.common.roll_period,
        transit: transit_spec(&args.common),
        sample_count: args.count,
        seed: args.seed,
        noise_sigma: args.noise,
        cadence_minutes: args.cadence,
        repeats: args.repeat.max(1),
        export_results: args.common.export.clone(),
        export_fit: args.common.export_fit.clone(),
    }
}
