//! `lc-detrend` library crate.
//!
//! The binary (`lcd`) is a thin wrapper around this library so that:
//!
//! - the solver and basis builders are testable without spawning processes
//! - modules are reusable (e.g., batch pipelines over many light curves)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
