//! Input/output helpers.
//!
//! - calibration CSV ingest + validation (`ingest`)
//! - binning report export (`export`)
//! - model JSON read/write (`model_file`)
//! - SEG-Y trace store (`segy`)

pub mod export;
pub mod ingest;
pub mod model_file;
pub mod segy;

pub use export::*;
pub use ingest::*;
pub use model_file::*;
pub use segy::*;
