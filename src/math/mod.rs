//! Numeric core: design matrix assembly and weighted least squares.

pub mod design;
pub mod error;
pub mod wls;

pub use design::*;
pub use error::*;
pub use wls::*;
