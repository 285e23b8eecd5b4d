//! Read/write model JSON files.
//!
//! Model JSON is the "portable" representation of a fitted distribution
//! model: the boundary sequences, the per-slot porosity samples, and the
//! binning settings that produced them. It can be reloaded for inspection or
//! compared across calibration runs.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::RunConfig;
use crate::error::AppError;
use crate::model::DistributionModel;

/// A saved model file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub bins: usize,
    pub min_bin_data: usize,
    pub model: DistributionModel,
}

/// Write a model JSON file.
pub fn write_model_json(
    path: &Path,
    model: &DistributionModel,
    config: &RunConfig,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create model JSON '{}': {e}", path.display()),
        )
    })?;

    let snapshot = ModelFile {
        tool: "ai2por".to_string(),
        bins: config.bins,
        min_bin_data: config.min_bin_data,
        model: model.clone(),
    };

    serde_json::to_writer_pretty(file, &snapshot)
        .map_err(|e| AppError::new(2, format!("Failed to write model JSON: {e}")))?;

    Ok(())
}

/// Read a model JSON file.
pub fn read_model_json(path: &Path) -> Result<ModelFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open model JSON '{}': {e}", path.display()),
        )
    })?;
    let snapshot: ModelFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid model JSON: {e}")))?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::binner::bin_calibration;
    use std::path::PathBuf;

    fn test_config() -> RunConfig {
        RunConfig {
            wellcsv: PathBuf::from("well.csv"),
            list_cols: false,
            ai_col: 0,
            por_col: 1,
            bins: 5,
            min_bin_data: 4,
            percentile: 50.0,
            porval: 0.2,
            patv: false,
            segy_path: None,
            outdir: None,
            hide_plot: false,
            export_model: None,
        }
    }

    #[test]
    fn snapshot_round_trips() {
        let mut ai = Vec::new();
        let mut por = Vec::new();
        for cluster in 0..5 {
            for k in 0..5 {
                ai.push(cluster as f64 * 10.0 + k as f64);
                por.push(0.1 + k as f64 * 0.1);
            }
        }
        let binned = bin_calibration(&ai, &por, 5).unwrap();
        let model = DistributionModel::build(&binned, 4).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        write_model_json(&path, &model, &test_config()).unwrap();

        let reloaded = read_model_json(&path).unwrap();
        assert_eq!(reloaded.tool, "ai2por");
        assert_eq!(reloaded.bins, 5);
        assert_eq!(reloaded.model.num_slots(), model.num_slots());
        assert_eq!(
            reloaded.model.quantile(20.0, 50.0),
            model.quantile(20.0, 50.0)
        );
        assert_eq!(
            reloaded.model.exceedance_probability(20.0, 0.3),
            model.exceedance_probability(20.0, 0.3)
        );
    }
}
