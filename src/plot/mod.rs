//! Diagnostic scatter plot (SVG).
//!
//! Raw calibration pairs plus per-bin P10/P50/P90 porosity markers at the
//! bin midpoints, over **all** equal-width bins (retention does not apply to
//! diagnostics). The plot is a report sink only; nothing downstream reads it.

use std::path::Path;

use plotters::prelude::*;

use crate::error::AppError;
use crate::model::binner::BinSummary;

const PLOT_SIZE: (u32, u32) = (900, 600);

/// Render the calibration scatter with percentile overlays to an SVG file.
pub fn write_scatter_svg(
    path: &Path,
    ai: &[f64],
    porosity: &[f64],
    summaries: &[Option<BinSummary>],
) -> Result<(), AppError> {
    let (x0, x1) = padded_bounds(ai);
    let (y0, y1) = padded_bounds(porosity);

    let root = SVGBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| plot_error(path, &e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 45)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(|e| plot_error(path, &e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Well Acoustic Impedance")
        .y_desc("Well Porosity")
        .draw()
        .map_err(|e| plot_error(path, &e.to_string()))?;

    chart
        .draw_series(
            ai.iter()
                .zip(porosity)
                .map(|(&x, &y)| Circle::new((x, y), 2, BLUE.mix(0.3).filled())),
        )
        .map_err(|e| plot_error(path, &e.to_string()))?;

    let markers: [(&str, fn(&BinSummary) -> f64, RGBColor); 3] = [
        ("P10", |s| s.p10, RED),
        ("P50", |s| s.p50, BLACK),
        ("P90", |s| s.p90, MAGENTA),
    ];
    for (label, pick, color) in markers {
        chart
            .draw_series(
                summaries
                    .iter()
                    .flatten()
                    .map(|s| Circle::new((s.center, pick(s)), 4, color.filled())),
            )
            .map_err(|e| plot_error(path, &e.to_string()))?
            .label(label)
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(|e| plot_error(path, &e.to_string()))?;

    root.present()
        .map_err(|e| plot_error(path, &e.to_string()))?;
    Ok(())
}

fn plot_error(path: &Path, detail: &str) -> AppError {
    AppError::new(
        2,
        format!("Failed to render plot '{}': {detail}", path.display()),
    )
}

/// Axis bounds with 5% padding; degenerate ranges get a fixed pad so the
/// chart never collapses to zero width.
fn padded_bounds(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(min.is_finite() && max.is_finite()) {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span <= 0.0 {
        return (min - 0.5, max + 0.5);
    }
    (min - span * 0.05, max + span * 0.05)
}
