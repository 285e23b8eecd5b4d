//! Command-line parsing for the AI→porosity transform tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! modeling/transform code: `app` converts the parsed arguments into a
//! `RunConfig` value object and everything downstream reads only that.

use std::path::PathBuf;

use clap::Parser;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "ai2por",
    version,
    about = "Compute porosity percentiles or exceedance probabilities from acoustic impedance"
)]
pub struct Cli {
    /// CSV of well AI & well porosity.
    pub wellcsv: PathBuf,

    /// List columns in the CSV file and exit.
    #[arg(long)]
    pub listcols: bool,

    /// AI and porosity column numbers (0-based).
    #[arg(long, num_args = 2, value_names = ["AI", "POR"], default_values_t = [0, 1])]
    pub datacols: Vec<usize>,

    /// Number of AI bins.
    #[arg(long, default_value_t = 10)]
    pub bins: usize,

    /// Minimum data per bin; bins at or below this count are dropped from the model.
    #[arg(long, default_value_t = 10)]
    pub minbindata: usize,

    /// One percentile (0–100) for percentile output.
    #[arg(long, default_value_t = 50.0)]
    pub percentile: f64,

    /// Output the probability at a porosity value instead of a percentile.
    /// Exceedance is assumed, i.e. 1 - CDF.
    #[arg(long)]
    pub patv: bool,

    /// Porosity value (fraction) for --patv.
    #[arg(long, default_value_t = 0.2)]
    pub porval: f64,

    /// SEG-Y file of AI to convert to porosity.
    #[arg(long, value_name = "SGY")]
    pub segyfname: Option<PathBuf>,

    /// Output directory; default = same dir as input.
    #[arg(long, value_name = "DIR")]
    pub outdir: Option<PathBuf>,

    /// Suppress interactive display (the plot file is saved regardless).
    #[arg(long)]
    pub hideplot: bool,

    /// Export the fitted distribution model (boundaries + slots) to JSON.
    #[arg(long = "export-model", value_name = "JSON")]
    pub export_model: Option<PathBuf>,
}
