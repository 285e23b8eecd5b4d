//! Mathematical utilities: empirical percentile kernels.

pub mod quantile;

pub use quantile::*;
