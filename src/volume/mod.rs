//! Volume processor: apply one transform to every sample of a SEG-Y store.
//!
//! Workflow, mirroring the calibration→volume pipeline:
//!
//! 1. duplicate the input volume to a temporary path next to the final name
//! 2. open it read-write and walk traces in store order
//! 3. replace every sample with its porosity-space value, one whole trace at
//!    a time, durably flushing each trace before moving on
//! 4. atomically rename the temporary file to the final name
//!
//! Samples within one trace are independent given the immutable model, so
//! they are mapped in parallel; the map preserves order and all writes stay
//! sequential on the caller's thread, so per-trace write atomicity holds. A
//! failed run never publishes a partially transformed file: the rename only
//! happens after the last trace has been flushed.

use std::path::{Path, PathBuf};

use chrono::Local;
use rayon::prelude::*;

use crate::domain::TransformMode;
use crate::error::AppError;
use crate::io::segy::TraceStore;
use crate::model::DistributionModel;

/// What a volume run did, for the final summary.
#[derive(Debug, Clone)]
pub struct VolumeOutcome {
    pub output_path: PathBuf,
    pub traces: usize,
    pub samples: usize,
    /// Samples whose AI fell outside the calibrated range; they were still
    /// transformed via the clamped slot lookup.
    pub clamped: usize,
}

/// Final output path: `<stem>_pprob<100*porval>.sgy` for exceedance runs,
/// `<stem>_porp<percentile>.sgy` for percentile runs.
pub fn output_path(
    input: &Path,
    outdir: Option<&Path>,
    mode: TransformMode,
) -> Result<PathBuf, AppError> {
    let stem = input
        .file_stem()
        .ok_or_else(|| {
            AppError::new(
                2,
                format!("Cannot derive an output name from '{}'.", input.display()),
            )
        })?
        .to_string_lossy();

    let name = match mode {
        TransformMode::Exceedance { porval } => {
            format!("{stem}_pprob{:.0}.sgy", porval * 100.0)
        }
        TransformMode::Quantile { percentile } => {
            format!("{stem}_porp{percentile:.0}.sgy")
        }
    };

    let dir = match outdir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().unwrap_or_else(|| Path::new("")).to_path_buf(),
    };
    Ok(dir.join(name))
}

/// Duplicate the input store and transform it trace by trace.
pub fn transform_volume(
    input: &Path,
    outdir: Option<&Path>,
    model: &DistributionModel,
    mode: TransformMode,
) -> Result<VolumeOutcome, AppError> {
    let final_path = output_path(input, outdir, mode)?;
    let tmp_path = temp_path(&final_path);

    println!("Copying file, please wait ........");
    let copy_start = Local::now();
    std::fs::copy(input, &tmp_path).map_err(|e| {
        AppError::new(
            4,
            format!(
                "Failed to copy '{}' to '{}': {e}",
                input.display(),
                tmp_path.display()
            ),
        )
    })?;
    println!("Duration of copying: {:.2}s", seconds_since(copy_start));

    let process_start = Local::now();
    let result = process_store(&tmp_path, model, mode);
    let (traces, samples, clamped) = match result {
        Ok(counts) => counts,
        Err(err) => {
            // Leave the final path untouched; the temporary is best-effort
            // cleaned up.
            let _ = std::fs::remove_file(&tmp_path);
            return Err(err);
        }
    };
    println!("Duration of processing: {:.2}s", seconds_since(process_start));

    std::fs::rename(&tmp_path, &final_path).map_err(|e| {
        AppError::new(
            4,
            format!("Failed to publish '{}': {e}", final_path.display()),
        )
    })?;

    Ok(VolumeOutcome {
        output_path: final_path,
        traces,
        samples,
        clamped,
    })
}

fn process_store(
    path: &Path,
    model: &DistributionModel,
    mode: TransformMode,
) -> Result<(usize, usize, usize), AppError> {
    let mut store = TraceStore::open_read_write(path)?;
    let trace_count = store.trace_count();
    let mut samples_total = 0usize;
    let mut clamped = 0usize;

    for trace_index in 0..trace_count {
        if trace_index % 100 == 0 {
            println!("Trace #: {trace_index}");
        }

        let samples = store.read_trace(trace_index)?;
        samples_total += samples.len();
        clamped += samples.iter().filter(|&&s| model.is_out_of_range(s)).count();

        let transformed: Vec<f64> = samples
            .par_iter()
            .map(|&sample| apply(model, mode, sample))
            .collect();

        store.write_trace(trace_index, &transformed)?;
        store.flush()?;
    }

    Ok((trace_count, samples_total, clamped))
}

fn apply(model: &DistributionModel, mode: TransformMode, sample: f64) -> f64 {
    match mode {
        TransformMode::Quantile { percentile } => model.quantile(sample, percentile),
        TransformMode::Exceedance { porval } => model.exceedance_probability(sample, porval),
    }
}

fn temp_path(final_path: &Path) -> PathBuf {
    let mut name = final_path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn seconds_since(start: chrono::DateTime<Local>) -> f64 {
    (Local::now() - start).num_milliseconds() as f64 / 1000.0
}
