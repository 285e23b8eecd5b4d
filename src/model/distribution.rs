//! The empirical conditional-distribution model of porosity given AI.
//!
//! Construction filters the equal-width bins down to those with enough
//! support (`count > min_bin_data`), then takes the per-group maximum AI and
//! porosity of the *interior* retained groups (first and last excluded) as
//! the boundary sequences. The porosity arrays of all retained groups but
//! the last become the addressable distribution slots: slot 0 sits below the
//! first boundary, slot `i` between boundaries `i-1` and `i`, and the final
//! slot at or above the last boundary.
//!
//! Dropped bins are dropped, not merged: their observations are excluded
//! from the model entirely, and the calibrated AI range shrinks accordingly.
//! The run summary reports how many bins survived so the exclusion is
//! visible.

use serde::{Deserialize, Serialize};

use crate::domain::ReportRow;
use crate::error::AppError;
use crate::math::{percentile_of_score_sorted, percentile_sorted};
use crate::model::binner::BinnedCalibration;

/// Immutable empirical model shared read-only by every transform invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionModel {
    /// Ascending AI boundary values (max AI of each interior retained group).
    ai_boundaries: Vec<f64>,
    /// Porosity boundary values mirroring `ai_boundaries` (max porosity of
    /// each interior retained group). Report-only.
    por_boundaries: Vec<f64>,
    /// Ascending-sorted porosity observations per slot;
    /// `slots.len() == ai_boundaries.len() + 1`, every slot non-empty.
    slots: Vec<Vec<f64>>,
    /// Full observed AI range of the calibration set, for out-of-domain
    /// sample accounting.
    ai_range: (f64, f64),
    /// Bins retained out of the bins requested (for reporting).
    retained: usize,
    total_bins: usize,
}

impl DistributionModel {
    /// Filter sparse bins and assemble the boundary/slot structure.
    ///
    /// Fails with an insufficient-calibration-data error when fewer than 3
    /// bins survive the retention test: with fewer survivors there are no
    /// interior groups, hence no boundaries and no usable slots.
    pub fn build(binned: &BinnedCalibration, min_bin_data: usize) -> Result<Self, AppError> {
        let retained: Vec<_> = binned
            .groups
            .iter()
            .filter(|g| g.len() > min_bin_data)
            .collect();

        let r = retained.len();
        if r < 3 {
            return Err(AppError::new(
                3,
                format!(
                    "Insufficient calibration data: only {r} of {} AI bins hold more than \
                     {min_bin_data} observations; at least 3 are needed to build the model. \
                     Try fewer bins (--bins) or a lower threshold (--minbindata).",
                    binned.groups.len()
                ),
            ));
        }

        let mut ai_boundaries = Vec::with_capacity(r - 2);
        let mut por_boundaries = Vec::with_capacity(r - 2);
        for group in &retained[1..r - 1] {
            let ai_max = group.ai.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let por_max = group
                .porosity
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            ai_boundaries.push(ai_max);
            por_boundaries.push(por_max);
        }
        debug_assert!(ai_boundaries.windows(2).all(|w| w[0] <= w[1]));

        // Groups in AI order keep their slots addressable by boundary search;
        // the last retained group only contributes to boundary extraction.
        let slots: Vec<Vec<f64>> = retained[..r - 1]
            .iter()
            .map(|g| {
                let mut sorted = g.porosity.clone();
                sorted.sort_by(f64::total_cmp);
                sorted
            })
            .collect();

        Ok(Self {
            ai_boundaries,
            por_boundaries,
            slots,
            ai_range: binned.ai_range(),
            retained: r,
            total_bins: binned.groups.len(),
        })
    }

    /// Slot index for an AI value: the count of boundaries `<= ai`, clamped
    /// so extreme values resolve to the first or last slot instead of
    /// falling off the end.
    pub fn locate(&self, ai: f64) -> usize {
        let idx = self.ai_boundaries.partition_point(|&b| b <= ai);
        idx.min(self.slots.len() - 1)
    }

    /// Porosity percentile of the slot matching `ai`.
    pub fn quantile(&self, ai: f64, percentile: f64) -> f64 {
        percentile_sorted(&self.slots[self.locate(ai)], percentile)
    }

    /// Probability that porosity exceeds `threshold` in the slot matching
    /// `ai`, i.e. one minus the empirical percentile-of-score.
    pub fn exceedance_probability(&self, ai: f64, threshold: f64) -> f64 {
        1.0 - percentile_of_score_sorted(&self.slots[self.locate(ai)], threshold) / 100.0
    }

    /// Whether an AI value falls outside the calibrated range. Such samples
    /// still transform (the lookup clamps), but the caller counts them.
    pub fn is_out_of_range(&self, ai: f64) -> bool {
        !(self.ai_range.0..=self.ai_range.1).contains(&ai)
    }

    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn retained_bins(&self) -> usize {
        self.retained
    }

    pub fn total_bins(&self) -> usize {
        self.total_bins
    }

    pub fn ai_boundaries(&self) -> &[f64] {
        &self.ai_boundaries
    }

    /// Binning report rows: one per consecutive boundary pair, with the slot
    /// observation count at the row's upper boundary.
    pub fn report_rows(&self) -> Vec<ReportRow> {
        (1..self.ai_boundaries.len())
            .map(|i| ReportRow {
                binnum: i,
                ai_start: self.ai_boundaries[i - 1],
                ai_end: self.ai_boundaries[i],
                por_start: self.por_boundaries[i - 1],
                por_end: self.por_boundaries[i],
                por_num: self.slots[i].len(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::binner::bin_calibration;

    /// Five clusters of five points each, one per bin, every bin holding the
    /// same porosity distribution [0.10, 0.20, 0.30, 0.40, 0.50].
    fn clustered_calibration() -> (Vec<f64>, Vec<f64>) {
        let mut ai = Vec::new();
        let mut por = Vec::new();
        for cluster in 0..5 {
            for (k, p) in [0.10, 0.20, 0.30, 0.40, 0.50].iter().enumerate() {
                ai.push(cluster as f64 * 10.0 + k as f64);
                por.push(*p);
            }
        }
        (ai, por)
    }

    fn fixture_model() -> DistributionModel {
        let (ai, por) = clustered_calibration();
        let binned = bin_calibration(&ai, &por, 5).unwrap();
        DistributionModel::build(&binned, 4).unwrap()
    }

    #[test]
    fn boundaries_come_from_interior_groups_and_ascend() {
        let model = fixture_model();
        // Interior clusters top out at AI 14, 24, 34.
        assert_eq!(model.ai_boundaries(), &[14.0, 24.0, 34.0]);
        assert_eq!(model.num_slots(), 4);
        assert!(model.ai_boundaries().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn sparse_bins_contribute_nothing() {
        let (mut ai, mut por) = clustered_calibration();
        // Shrink the middle cluster to 2 points (<= threshold of 4).
        let keep: Vec<usize> = (0..ai.len()).filter(|&i| !(12..15).contains(&i)).collect();
        ai = keep.iter().map(|&i| ai[i]).collect();
        por = keep.iter().map(|&i| por[i]).collect();

        let binned = bin_calibration(&ai, &por, 5).unwrap();
        let model = DistributionModel::build(&binned, 4).unwrap();

        // 4 retained groups -> 2 boundaries, 3 slots, all of size 5.
        assert_eq!(model.retained_bins(), 4);
        assert_eq!(model.ai_boundaries().len(), 2);
        assert_eq!(model.num_slots(), 3);
        let modeled: usize = model.slots.iter().map(Vec::len).sum();
        assert_eq!(modeled, 15);
    }

    #[test]
    fn fewer_than_three_retained_groups_is_an_error() {
        let (ai, por) = clustered_calibration();
        let binned = bin_calibration(&ai, &por, 5).unwrap();
        let err = DistributionModel::build(&binned, 10).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn median_lookup_matches_slot_distribution() {
        let model = fixture_model();
        for ai in [0.0, 12.0, 25.0, 33.9, 34.0] {
            assert!((model.quantile(ai, 50.0) - 0.30).abs() < 1e-12);
        }
    }

    #[test]
    fn exceedance_of_the_median_is_one_half() {
        let model = fixture_model();
        assert!((model.exceedance_probability(20.0, 0.30) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn extreme_values_clamp_to_valid_slots() {
        let model = fixture_model();
        assert_eq!(model.locate(-1000.0), 0);
        assert_eq!(model.locate(1000.0), model.num_slots() - 1);
        assert!(model.quantile(-1000.0, 50.0).is_finite());
        assert!(model.quantile(1000.0, 50.0).is_finite());
        assert!(model.is_out_of_range(-1000.0));
        assert!(model.is_out_of_range(1000.0));
        assert!(!model.is_out_of_range(20.0));
    }

    #[test]
    fn boundary_value_belongs_to_the_slot_above() {
        let model = fixture_model();
        // AI exactly on the first boundary (14.0) resolves one slot up.
        assert_eq!(model.locate(13.999), 0);
        assert_eq!(model.locate(14.0), 1);
    }

    #[test]
    fn lookups_are_deterministic() {
        let model = fixture_model();
        let a = model.quantile(17.3, 42.0);
        let b = model.quantile(17.3, 42.0);
        assert_eq!(a, b);
        let p = model.exceedance_probability(17.3, 0.25);
        let q = model.exceedance_probability(17.3, 0.25);
        assert_eq!(p, q);
    }

    #[test]
    fn report_rows_pair_consecutive_boundaries() {
        let model = fixture_model();
        let rows = model.report_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].binnum, 1);
        assert_eq!(rows[0].ai_start, 14.0);
        assert_eq!(rows[0].ai_end, 24.0);
        assert_eq!(rows[0].por_num, 5);
        assert!(rows.iter().all(|r| r.ai_end >= r.ai_start));
    }
}
