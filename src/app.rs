//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments into a `RunConfig`
//! - loads + bins the calibration CSV and builds the distribution model
//! - writes the binning report CSV, the diagnostic SVG and optional exports
//! - drives the SEG-Y volume transform when a trace store is supplied

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::Cli;
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `ai2por` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = run_config_from_args(&cli)?;

    if config.list_cols {
        let columns = crate::io::ingest::list_columns(&config.wellcsv)?;
        print!("{}", crate::report::format_column_listing(&columns));
        return Ok(());
    }

    if let Some(outdir) = &config.outdir {
        std::fs::create_dir_all(outdir).map_err(|e| {
            AppError::new(
                2,
                format!("Failed to create output directory '{}': {e}", outdir.display()),
            )
        })?;
    }

    let run = pipeline::run_calibration(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.data, &run.model, &run.rows, &config)
    );

    let csv_path = output_sibling(&config.wellcsv, config.outdir.as_deref(), "_aipor.csv")?;
    crate::io::export::write_binning_csv(&csv_path, &run.rows)?;
    println!("Successfully wrote {}", csv_path.display());

    let svg_path = output_sibling(&config.wellcsv, config.outdir.as_deref(), "_aipor.svg")?;
    crate::plot::write_scatter_svg(&svg_path, &run.data.ai, &run.data.porosity, &run.summaries)?;
    println!("Successfully wrote {}", svg_path.display());

    if let Some(path) = &config.export_model {
        crate::io::model_file::write_model_json(path, &run.model, &config)?;
        println!("Successfully wrote {}", path.display());
    }

    if let Some(segy) = &config.segy_path {
        let outcome = crate::volume::transform_volume(
            segy,
            config.outdir.as_deref(),
            &run.model,
            config.mode(),
        )?;
        println!("Successfully wrote {}", outcome.output_path.display());
        println!(
            "Transformed {} samples across {} traces.",
            outcome.samples, outcome.traces
        );
        if outcome.clamped > 0 {
            println!(
                "{} of {} samples fell outside the calibrated AI range and used the nearest slot.",
                outcome.clamped, outcome.samples
            );
        }
    }

    Ok(())
}

/// Validate CLI arguments and map them onto the run configuration object.
pub fn run_config_from_args(args: &Cli) -> Result<RunConfig, AppError> {
    if args.datacols.len() != 2 {
        return Err(AppError::new(
            2,
            "--datacols needs exactly two column indices (AI, porosity).",
        ));
    }
    if args.bins == 0 {
        return Err(AppError::new(2, "--bins must be at least 1."));
    }
    if !(0.0..=100.0).contains(&args.percentile) {
        return Err(AppError::new(
            2,
            format!("--percentile must be in [0, 100], got {}.", args.percentile),
        ));
    }
    if !args.porval.is_finite() {
        return Err(AppError::new(2, "--porval must be a finite fraction."));
    }

    Ok(RunConfig {
        wellcsv: args.wellcsv.clone(),
        list_cols: args.listcols,
        ai_col: args.datacols[0],
        por_col: args.datacols[1],
        bins: args.bins,
        min_bin_data: args.minbindata,
        percentile: args.percentile,
        porval: args.porval,
        patv: args.patv,
        segy_path: args.segyfname.clone(),
        outdir: args.outdir.clone(),
        hide_plot: args.hideplot,
        export_model: args.export_model.clone(),
    })
}

/// `<outdir or input dir>/<input stem><suffix>`.
fn output_sibling(input: &Path, outdir: Option<&Path>, suffix: &str) -> Result<PathBuf, AppError> {
    let stem = input
        .file_stem()
        .ok_or_else(|| {
            AppError::new(
                2,
                format!("Cannot derive an output name from '{}'.", input.display()),
            )
        })?
        .to_string_lossy();

    let dir = match outdir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().unwrap_or_else(|| Path::new("")).to_path_buf(),
    };
    Ok(dir.join(format!("{stem}{suffix}")))
}
