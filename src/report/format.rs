//! Terminal formatting for calibration runs.
//!
//! All functions build plain strings so they can be unit-tested without
//! capturing stdout.

use std::fmt::Write as _;

use crate::domain::{ReportRow, RunConfig, TransformMode};
use crate::io::ingest::{CalibrationData, DatasetStats};
use crate::model::DistributionModel;

/// `(index, column name)` listing for `--listcols`.
pub fn format_column_listing(columns: &[String]) -> String {
    let mut out = String::new();
    for (i, name) in columns.iter().enumerate() {
        let _ = writeln!(out, "{i:>4}  {name}");
    }
    out
}

/// Human-readable summary: ingest stats, retention, mode, and the bin table.
pub fn format_run_summary(
    data: &CalibrationData,
    model: &DistributionModel,
    rows: &[ReportRow],
    config: &RunConfig,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Calibration: {}", config.wellcsv.display());
    let _ = writeln!(out, "{}", format_stats_line(&data.stats));
    if !data.row_errors.is_empty() {
        let _ = writeln!(
            out,
            "  skipped {} of {} rows (first: line {}: {})",
            data.row_errors.len(),
            data.rows_read,
            data.row_errors[0].line,
            data.row_errors[0].message
        );
    }
    let _ = writeln!(
        out,
        "  bins retained: {} of {} (> {} observations each), {} distribution slots",
        model.retained_bins(),
        model.total_bins(),
        config.min_bin_data,
        model.num_slots()
    );
    let _ = writeln!(out, "  mode: {}", format_mode(config.mode()));

    out.push('\n');
    out.push_str(&format_bin_table(rows));
    out
}

fn format_stats_line(stats: &DatasetStats) -> String {
    format!(
        "  {} points, AI {:.2}..{:.2}, porosity {:.4}..{:.4}",
        stats.n_points, stats.ai_min, stats.ai_max, stats.por_min, stats.por_max
    )
}

fn format_mode(mode: TransformMode) -> String {
    match mode {
        TransformMode::Quantile { percentile } => {
            format!("porosity P{percentile:.0} percentile")
        }
        TransformMode::Exceedance { porval } => {
            format!("P(porosity > {porval})")
        }
    }
}

/// The binning report as a fixed-width table.
pub fn format_bin_table(rows: &[ReportRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6} {:>12} {:>12} {:>10} {:>10} {:>8}",
        "binnum", "AIstart", "AIend", "PORstart", "PORend", "PORnum"
    );
    for r in rows {
        let _ = writeln!(
            out,
            "{:>6} {:>12.2} {:>12.2} {:>10.4} {:>10.4} {:>8}",
            r.binnum, r.ai_start, r.ai_end, r.por_start, r.por_end, r.por_num
        );
    }
    out
}
