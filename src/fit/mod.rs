//! Detrending over the least-squares core.
//!
//! Responsibilities:
//!
//! - assemble the design matrix from named basis vectors
//! - run the weighted solve
//! - reconstruct model / recovered-signal / residual vectors

pub mod ensemble;
pub mod fitter;

pub use ensemble::*;
pub use fitter::*;
