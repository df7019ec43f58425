//! Command-line parsing for the light-curve detrender.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "lcd",
    version,
    about = "Light-curve detrending via weighted least squares"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Detrend a light curve loaded from a photometry CSV.
    Fit(FitArgs),
    /// Generate a synthetic light curve with injected systematics, detrend
    /// it, and compare fitted coefficients against the injected truth.
    Demo(DemoArgs),
}

/// Options shared by `fit` and `demo`.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Roll/thermal period in days for the harmonic background pair.
    #[arg(long, default_value_t = 0.25)]
    pub roll_period: f64,

    /// Fit nuisance terms only (no transit template).
    #[arg(long)]
    pub no_transit: bool,

    /// Transit mid-time (days).
    #[arg(long, default_value_t = 0.2)]
    pub t0: f64,

    /// Transit period (days).
    #[arg(long = "transit-period", default_value_t = 0.45)]
    pub transit_period: f64,

    /// Transit duration (days).
    #[arg(long, default_value_t = 0.08)]
    pub duration: f64,

    /// Export per-cadence results (time, flux, model, recovered, residual) to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export fitted coefficients + covariance to JSON.
    #[arg(long = "export-fit")]
    pub export_fit: Option<PathBuf>,
}

/// Options for `lcd fit`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Input photometry CSV (columns: time, flux, flux_err; optional xc, yc, bg).
    pub input: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Options for `lcd demo`.
#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Number of cadences to generate.
    #[arg(short = 'n', long, default_value_t = 2000)]
    pub count: usize,

    /// Random seed for sample generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Gaussian flux noise sigma (normalized-flux units).
    #[arg(long, default_value_t = 5e-4)]
    pub noise: f64,

    /// Cadence in minutes.
    #[arg(long, default_value_t = 1.0)]
    pub cadence: f64,

    /// Number of independent noise realizations to fit (in parallel).
    #[arg(long, default_value_t = 1)]
    pub repeat: usize,

    #[command(flatten)]
    pub common: CommonArgs,
}
