//! Empirical porosity model construction.
//!
//! Responsibilities:
//!
//! - partition calibration pairs into equal-width AI bins (`binner`)
//! - drop under-populated bins and derive the boundary/slot structure
//!   queried by the transforms (`distribution`)

pub mod binner;
pub mod distribution;

pub use binner::*;
pub use distribution::*;
