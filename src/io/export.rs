//! Export the binning report to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts; one row per consecutive model boundary pair.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ReportRow;
use crate::error::AppError;

/// Write the binning report to a CSV file.
pub fn write_binning_csv(path: &Path, rows: &[ReportRow]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create report CSV '{}': {e}", path.display()),
        )
    })?;

    writeln!(file, "binnum,AIstart,AIend,PORstart,PORend,PORnum")
        .map_err(|e| AppError::new(2, format!("Failed to write report CSV header: {e}")))?;

    for r in rows {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            r.binnum, r.ai_start, r.ai_end, r.por_start, r.por_end, r.por_num
        )
        .map_err(|e| AppError::new(2, format!("Failed to write report CSV row: {e}")))?;
    }

    Ok(())
}
