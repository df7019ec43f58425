//! Nuisance and signal basis construction.

pub mod model;

pub use model::*;
