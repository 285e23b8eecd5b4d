//! Equal-width binning of calibration pairs.
//!
//! This module is responsible for turning the parallel `(AI, porosity)`
//! arrays from the well CSV into AI-ordered groups that are safe to model:
//!
//! - **Coverage**: every observation lands in exactly one bin
//! - **Deterministic assignment**: half-open `[low, high)` intervals, ties on
//!   an interior edge go to the higher-indexed bin, and the final bin is
//!   closed so the maximum AI value is not lost
//! - **Separation of concerns**: retention filtering and boundary extraction
//!   live in `distribution`, not here

use crate::error::AppError;
use crate::math::percentile_sorted;

/// The observations owned by one equal-width AI bin.
#[derive(Debug, Clone, Default)]
pub struct BinGroup {
    pub ai: Vec<f64>,
    pub porosity: Vec<f64>,
}

impl BinGroup {
    pub fn len(&self) -> usize {
        self.porosity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.porosity.is_empty()
    }
}

/// Calibration pairs partitioned into `bins` equal-width AI intervals.
#[derive(Debug, Clone)]
pub struct BinnedCalibration {
    /// `bins + 1` ascending edges spanning `[min(AI), max(AI)]`.
    pub edges: Vec<f64>,
    /// One group per bin, in AI order. Groups may be empty.
    pub groups: Vec<BinGroup>,
}

/// Diagnostic porosity percentiles for one non-empty bin, positioned at the
/// bin's AI midpoint. Consumed by the scatter plot only; retention plays no
/// role here.
#[derive(Debug, Clone, Copy)]
pub struct BinSummary {
    pub center: f64,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

/// Partition `(ai, porosity)` pairs into `bins` equal-width AI intervals.
pub fn bin_calibration(
    ai: &[f64],
    porosity: &[f64],
    bins: usize,
) -> Result<BinnedCalibration, AppError> {
    if ai.len() != porosity.len() {
        return Err(AppError::new(
            2,
            format!(
                "Calibration column lengths differ: {} AI values vs {} porosity values.",
                ai.len(),
                porosity.len()
            ),
        ));
    }
    if ai.is_empty() {
        return Err(AppError::new(2, "No calibration observations to bin."));
    }
    if bins == 0 {
        return Err(AppError::new(2, "--bins must be at least 1."));
    }

    let ai_min = ai.iter().copied().fold(f64::INFINITY, f64::min);
    let ai_max = ai.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(ai_min.is_finite() && ai_max.is_finite()) {
        return Err(AppError::new(2, "Calibration AI range is not finite."));
    }

    let width = (ai_max - ai_min) / bins as f64;
    let mut edges = Vec::with_capacity(bins + 1);
    for i in 0..bins {
        edges.push(ai_min + width * i as f64);
    }
    // The top edge is exact, not accumulated, so the closed final bin really
    // ends at max(AI).
    edges.push(ai_max);

    let mut groups = vec![BinGroup::default(); bins];
    let interior = &edges[1..bins];
    for (&a, &p) in ai.iter().zip(porosity) {
        let idx = interior.partition_point(|&e| e <= a);
        groups[idx].ai.push(a);
        groups[idx].porosity.push(p);
    }

    Ok(BinnedCalibration { edges, groups })
}

impl BinnedCalibration {
    /// Per-bin P10/P50/P90 porosity summaries over **all** bins, `None` for
    /// empty ones. Uses the same continuous percentile definition as the
    /// quantile transform.
    pub fn summaries(&self) -> Vec<Option<BinSummary>> {
        self.groups
            .iter()
            .enumerate()
            .map(|(i, group)| {
                if group.is_empty() {
                    return None;
                }
                let mut sorted = group.porosity.clone();
                sorted.sort_by(f64::total_cmp);
                Some(BinSummary {
                    center: (self.edges[i] + self.edges[i + 1]) / 2.0,
                    p10: percentile_sorted(&sorted, 10.0),
                    p50: percentile_sorted(&sorted, 50.0),
                    p90: percentile_sorted(&sorted, 90.0),
                })
            })
            .collect()
    }

    /// Total number of observations across all bins.
    pub fn total_observations(&self) -> usize {
        self.groups.iter().map(BinGroup::len).sum()
    }

    /// The full observed AI range `[min, max]`.
    pub fn ai_range(&self) -> (f64, f64) {
        (self.edges[0], self.edges[self.edges.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_observation_lands_in_exactly_one_bin() {
        let ai: Vec<f64> = (0..100).map(|i| i as f64 * 0.37).collect();
        let por: Vec<f64> = (0..100).map(|i| 0.1 + i as f64 * 0.001).collect();

        let binned = bin_calibration(&ai, &por, 7).unwrap();
        assert_eq!(binned.groups.len(), 7);
        assert_eq!(binned.edges.len(), 8);
        assert_eq!(binned.total_observations(), 100);
    }

    #[test]
    fn interior_edge_ties_go_to_the_higher_bin() {
        // Range [0, 10] with 2 bins puts the interior edge at exactly 5.0.
        let ai = vec![0.0, 5.0, 10.0];
        let por = vec![0.1, 0.2, 0.3];

        let binned = bin_calibration(&ai, &por, 2).unwrap();
        assert_eq!(binned.groups[0].len(), 1);
        assert_eq!(binned.groups[1].len(), 2);
    }

    #[test]
    fn maximum_value_stays_in_the_final_bin() {
        let ai = vec![1.0, 2.0, 3.0, 4.0];
        let por = vec![0.1, 0.2, 0.3, 0.4];

        let binned = bin_calibration(&ai, &por, 3).unwrap();
        assert_eq!(binned.groups[2].ai, vec![3.0, 4.0]);
    }

    #[test]
    fn summaries_skip_empty_bins() {
        // Two clusters with a gap in the middle third.
        let ai = vec![0.0, 1.0, 2.0, 28.0, 29.0, 30.0];
        let por = vec![0.1, 0.1, 0.1, 0.3, 0.3, 0.3];

        let binned = bin_calibration(&ai, &por, 3).unwrap();
        let summaries = binned.summaries();
        assert!(summaries[0].is_some());
        assert!(summaries[1].is_none());
        let last = summaries[2].unwrap();
        assert!((last.p50 - 0.3).abs() < 1e-12);
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = bin_calibration(&[], &[], 10).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
