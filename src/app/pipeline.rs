//! Shared calibration pipeline used by the CLI front-end and tests.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> equal-width binning -> sparse-bin filtering -> model
//!
//! The CLI can then focus on presentation (printing, file outputs) while
//! tests drive the pipeline directly with synthetic files.

use crate::domain::{ReportRow, RunConfig};
use crate::error::AppError;
use crate::io::ingest::{CalibrationData, load_calibration};
use crate::model::binner::{BinSummary, bin_calibration};
use crate::model::distribution::DistributionModel;

/// All computed outputs of one calibration run.
#[derive(Debug, Clone)]
pub struct CalibrationRun {
    pub data: CalibrationData,
    /// Per-bin diagnostic percentiles over all bins (plot input).
    pub summaries: Vec<Option<BinSummary>>,
    pub model: DistributionModel,
    pub rows: Vec<ReportRow>,
}

/// Execute ingest, binning and model construction.
pub fn run_calibration(config: &RunConfig) -> Result<CalibrationRun, AppError> {
    let data = load_calibration(&config.wellcsv, config.ai_col, config.por_col)?;
    let binned = bin_calibration(&data.ai, &data.porosity, config.bins)?;
    let summaries = binned.summaries();
    let model = DistributionModel::build(&binned, config.min_bin_data)?;
    let rows = model.report_rows();

    Ok(CalibrationRun {
        data,
        summaries,
        model,
        rows,
    })
}
