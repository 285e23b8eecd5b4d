//! Calibration CSV ingest.
//!
//! Turns a well CSV with arbitrary columns into the two parallel numeric
//! arrays the binner consumes, addressed by 0-based column index.
//!
//! Design goals:
//! - **Early validation** of column indices against the header (clear errors
//!   + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden coercion)

use std::fs::File;
use std::path::Path;

use crate::error::AppError;

/// Summary stats about the observations actually used for modeling.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_points: usize,
    pub ai_min: f64,
    pub ai_max: f64,
    pub por_min: f64,
    pub por_max: f64,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: parallel arrays + stats + row errors.
#[derive(Debug, Clone)]
pub struct CalibrationData {
    pub ai: Vec<f64>,
    pub porosity: Vec<f64>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Read only the header row, for `--listcols`.
pub fn list_columns(path: &Path) -> Result<Vec<String>, AppError> {
    let mut reader = open_reader(path)?;
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?;
    Ok(headers.iter().map(str::to_string).collect())
}

/// Load the AI and porosity columns selected by index.
pub fn load_calibration(
    path: &Path,
    ai_col: usize,
    por_col: usize,
) -> Result<CalibrationData, AppError> {
    let mut reader = open_reader(path)?;
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let n_cols = headers.len();
    for (label, col) in [("AI", ai_col), ("porosity", por_col)] {
        if col >= n_cols {
            return Err(AppError::new(
                2,
                format!(
                    "{label} column index {col} is out of range: '{}' has {n_cols} columns \
                     (use --listcols to inspect them).",
                    path.display()
                ),
            ));
        }
    }

    let mut ai = Vec::new();
    let mut porosity = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because records() starts after the header and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_pair(&record, ai_col, por_col) {
            Ok((a, p)) => {
                ai.push(a);
                porosity.push(p);
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if ai.is_empty() {
        return Err(AppError::new(
            2,
            format!(
                "No usable calibration rows in '{}' ({} rows read, {} skipped).",
                path.display(),
                rows_read,
                row_errors.len()
            ),
        ));
    }

    let stats = DatasetStats {
        n_points: ai.len(),
        ai_min: ai.iter().copied().fold(f64::INFINITY, f64::min),
        ai_max: ai.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        por_min: porosity.iter().copied().fold(f64::INFINITY, f64::min),
        por_max: porosity.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    };

    Ok(CalibrationData {
        ai,
        porosity,
        stats,
        row_errors,
        rows_read,
    })
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn parse_pair(
    record: &csv::StringRecord,
    ai_col: usize,
    por_col: usize,
) -> Result<(f64, f64), String> {
    let ai = parse_cell(record, ai_col, "AI")?;
    let por = parse_cell(record, por_col, "porosity")?;
    Ok((ai, por))
}

fn parse_cell(record: &csv::StringRecord, col: usize, label: &str) -> Result<f64, String> {
    let raw = record
        .get(col)
        .ok_or_else(|| format!("missing {label} cell (column {col})"))?;
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("invalid {label} value '{raw}' (column {col})"))?;
    if !value.is_finite() {
        return Err(format!("non-finite {label} value '{raw}' (column {col})"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn lists_columns_in_order() {
        let file = write_csv("depth,AI,POR\n100,5000,0.2\n");
        let columns = list_columns(file.path()).unwrap();
        assert_eq!(columns, vec!["depth", "AI", "POR"]);
    }

    #[test]
    fn loads_selected_columns() {
        let file = write_csv("depth,AI,POR\n100,5000,0.2\n101,5100,0.25\n");
        let data = load_calibration(file.path(), 1, 2).unwrap();
        assert_eq!(data.ai, vec![5000.0, 5100.0]);
        assert_eq!(data.porosity, vec![0.2, 0.25]);
        assert_eq!(data.stats.n_points, 2);
        assert_eq!(data.stats.ai_min, 5000.0);
        assert_eq!(data.stats.por_max, 0.25);
        assert!(data.row_errors.is_empty());
    }

    #[test]
    fn out_of_range_column_index_is_a_configuration_error() {
        let file = write_csv("AI,POR\n5000,0.2\n");
        let err = load_calibration(file.path(), 0, 5).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn bad_cells_are_skipped_and_reported() {
        let file = write_csv("AI,POR\n5000,0.2\nnot-a-number,0.3\n5200,nan\n5300,0.22\n");
        let data = load_calibration(file.path(), 0, 1).unwrap();
        assert_eq!(data.ai.len(), 2);
        assert_eq!(data.row_errors.len(), 2);
        assert_eq!(data.row_errors[0].line, 3);
        assert_eq!(data.rows_read, 4);
    }

    #[test]
    fn all_bad_rows_is_an_error() {
        let file = write_csv("AI,POR\nx,y\n");
        let err = load_calibration(file.path(), 0, 1).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
