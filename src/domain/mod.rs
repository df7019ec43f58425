//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - light-curve observation columns (`LightCurve`)
//! - named basis vectors (`BasisVector`) and the transit template spec
//! - fit outputs (`CoefficientEstimate`, `FitQuality`, `FitFile`)
//! - run configuration (`DetrendConfig`)

pub mod types;

pub use types::*;
