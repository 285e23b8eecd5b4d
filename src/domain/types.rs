//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - used in-memory during model construction and volume processing
//! - exported to CSV/JSON
//! - built directly in tests without touching the CLI

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which transform is applied to every volume sample.
///
/// Exactly one mode is active per run: `--patv` selects exceedance,
/// otherwise the percentile lookup is used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformMode {
    /// Replace each AI sample with the given porosity percentile of its slot.
    Quantile { percentile: f64 },
    /// Replace each AI sample with the probability that porosity exceeds
    /// `porval` under its slot's empirical distribution.
    Exceedance { porval: f64 },
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults). Nothing downstream reads
/// ambient state; the binner, exports and the volume processor all take this
/// object (or values pulled from it) explicitly.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Calibration CSV of paired well AI and porosity columns.
    pub wellcsv: PathBuf,
    /// List `(index, column name)` pairs and exit without processing.
    pub list_cols: bool,
    /// 0-based column index holding acoustic impedance.
    pub ai_col: usize,
    /// 0-based column index holding porosity.
    pub por_col: usize,
    /// Number of equal-width AI bins.
    pub bins: usize,
    /// Minimum observations per bin; bins must exceed this to be retained.
    pub min_bin_data: usize,
    /// Percentile for quantile mode.
    pub percentile: f64,
    /// Porosity threshold for exceedance mode.
    pub porval: f64,
    /// Exceedance mode flag (probability at porosity value).
    pub patv: bool,
    /// Optional AI SEG-Y volume to transform.
    pub segy_path: Option<PathBuf>,
    /// Output directory; defaults to the input file's directory.
    pub outdir: Option<PathBuf>,
    /// Suppress interactive display (the SVG is saved regardless).
    pub hide_plot: bool,
    /// Optional path for a JSON snapshot of the fitted model.
    pub export_model: Option<PathBuf>,
}

impl RunConfig {
    pub fn mode(&self) -> TransformMode {
        if self.patv {
            TransformMode::Exceedance {
                porval: self.porval,
            }
        } else {
            TransformMode::Quantile {
                percentile: self.percentile,
            }
        }
    }
}

/// One row of the binning report (`binnum,AIstart,AIend,PORstart,PORend,PORnum`).
///
/// Rows pair consecutive model boundaries; `por_num` is the observation count
/// of the distribution slot sitting at the row's upper boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub binnum: usize,
    pub ai_start: f64,
    pub ai_end: f64,
    pub por_start: f64,
    pub por_end: f64,
    pub por_num: usize,
}
