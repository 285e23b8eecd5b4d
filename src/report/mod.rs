//! Reporting utilities: terminal summaries of a calibration run.

pub mod format;

pub use format::*;
