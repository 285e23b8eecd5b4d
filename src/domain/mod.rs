//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the run configuration value object (`RunConfig`)
//! - the transform mode selector (`TransformMode`)
//! - binning report rows (`ReportRow`)

pub mod types;

pub use types::*;
