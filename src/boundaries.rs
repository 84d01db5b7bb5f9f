//! Intensity boundary derivation
//!
//! Boundaries split the observed minute range into quartile-like buckets.
//! A handful of extreme days are excluded from the quartile math so that a
//! single marathon does not flatten every other day into the lowest levels;
//! the true maximum still caps the top bucket.

use serde::{Deserialize, Serialize};

use crate::types::MinuteValue;

/// z-score above which a distinct minute value counts as an outlier.
/// Matches the heuristic used by established contribution-chart tooling.
pub const OUTLIER_Z_SCORE: f64 = 3.77972616981;

/// Outlier detection needs at least this many distinct values.
const MIN_DISTINCT_FOR_OUTLIERS: usize = 5;

/// Ordered bucket thresholds; a minute count `m` lands in the bucket equal to
/// the number of thresholds strictly below `m`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundaries(pub [u64; 5]);

impl Boundaries {
    pub const ZERO: Boundaries = Boundaries([0; 5]);

    pub fn as_array(&self) -> &[u64; 5] {
        &self.0
    }

    /// The top boundary, equal to the largest minute value observed.
    pub fn top(&self) -> u64 {
        self.0[4]
    }
}

/// Derive bucket boundaries from a set of per-day minute values.
///
/// Duplicates count toward the mean and standard deviation but outliers are
/// judged per distinct value.
pub fn derive_intensity_boundaries<M: MinuteValue>(minutes: &[M]) -> Boundaries {
    let sanitized: Vec<u64> = minutes.iter().map(|m| m.sanitized_minutes()).collect();
    let max_score = sanitized.iter().copied().max().unwrap_or(0);
    if max_score == 0 {
        return Boundaries::ZERO;
    }

    let outliers = find_outliers(&sanitized, max_score);
    let non_outlier_top = sanitized
        .iter()
        .copied()
        .filter(|score| !outliers.contains(score))
        .max()
        .unwrap_or(0);

    let mut bounds: Vec<u64> = vec![
        quartile_midpoint(non_outlier_top, 1),
        quartile_midpoint(non_outlier_top, 2),
        quartile_midpoint(non_outlier_top, 3),
        max_score,
    ];
    bounds.sort_unstable();
    bounds.dedup();

    let mut padded = [0_u64; 5];
    let offset = padded.len() - bounds.len();
    padded[offset..].copy_from_slice(&bounds);
    Boundaries(padded)
}

/// Distinct values whose z-score exceeds [`OUTLIER_Z_SCORE`], in order of
/// first appearance, capped at 1 (or 3 when the maximum sits well clear of
/// the mean).
fn find_outliers(values: &[u64], max_score: u64) -> Vec<u64> {
    let uniques = unique_in_order(values);
    if uniques.len() < MIN_DISTINCT_FOR_OUTLIERS {
        return Vec::new();
    }

    let values_mean = mean(values);
    let std_dev = standard_deviation(values, values_mean);
    if !std_dev.is_finite() || std_dev == 0.0 {
        return Vec::new();
    }

    let max = max_score as f64;
    let max_outlier_count = if max - values_mean < 6.0 || max < 15.0 {
        1
    } else {
        3
    };

    uniques
        .into_iter()
        .filter(|&score| ((values_mean - score as f64) / std_dev).abs() > OUTLIER_Z_SCORE)
        .take(max_outlier_count)
        .collect()
}

/// Map quartile `q` (1..=3) onto the range `1..=range_top`.
fn quartile_midpoint(range_top: u64, quartile: u64) -> u64 {
    if range_top == 0 {
        return 0;
    }

    // 1-based position of the quartile; widened so `quartile * range_top`
    // cannot overflow for any minute count
    let position = u128::from(quartile) * u128::from(range_top) / 4;
    if position == 0 || position > u128::from(range_top) {
        return range_top;
    }
    u64::try_from(position).unwrap_or(range_top)
}

fn unique_in_order(values: &[u64]) -> Vec<u64> {
    let mut seen = std::collections::HashSet::new();
    values.iter().copied().filter(|v| seen.insert(*v)).collect()
}

fn mean(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    sum / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
fn standard_deviation(values: &[u64], values_mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let squared_delta_sum: f64 = values
        .iter()
        .map(|&v| (v as f64 - values_mean).powi(2))
        .sum();
    (squared_delta_sum / (values.len() - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_and_all_zero_inputs() {
        let empty: [u64; 0] = [];
        assert_eq!(derive_intensity_boundaries(&empty), Boundaries::ZERO);
        assert_eq!(derive_intensity_boundaries(&[0_u64, 0, 0]), Boundaries::ZERO);
        assert_eq!(
            derive_intensity_boundaries(&[-4.0_f64, f64::NAN]),
            Boundaries::ZERO
        );
    }

    #[test]
    fn test_small_range_without_outliers() {
        let boundaries = derive_intensity_boundaries(&[0_u64, 1, 2, 3, 4, 8]);
        assert_eq!(boundaries, Boundaries([0, 2, 4, 6, 8]));
    }

    #[test]
    fn test_extreme_day_excluded_from_quartiles() {
        let mut minutes = vec![0_u64; 300];
        minutes.extend([1, 2, 3, 4, 1000]);

        let boundaries = derive_intensity_boundaries(&minutes);
        assert_eq!(boundaries, Boundaries([0, 1, 2, 3, 1000]));
        assert_eq!(boundaries.top(), 1000);
    }

    #[test]
    fn test_fewer_than_five_distinct_values_keeps_extremes() {
        // 1000 would be an outlier, but only four distinct values exist
        let mut minutes = vec![0_u64; 300];
        minutes.extend([1, 2, 1000]);

        let boundaries = derive_intensity_boundaries(&minutes);
        assert_eq!(boundaries, Boundaries([0, 250, 500, 750, 1000]));
    }

    #[test]
    fn test_outlier_cap_of_one_when_max_is_small() {
        // max < 15 allows a single outlier at most
        let mut values = vec![0_u64; 400];
        values.extend([1, 2, 3, 13, 14]);
        let outliers = find_outliers(&values, 14);
        assert_eq!(outliers, vec![13]);
    }

    #[test]
    fn test_outlier_cap_of_three() {
        let mut values = vec![0_u64; 1000];
        values.extend([1, 2, 500, 600, 700, 800]);
        let outliers = find_outliers(&values, 800);
        assert_eq!(outliers, vec![500, 600, 700]);

        // 800 was beyond the cap and drives the quartiles
        let boundaries = derive_intensity_boundaries(&values);
        assert_eq!(boundaries, Boundaries([0, 200, 400, 600, 800]));
    }

    #[test]
    fn test_outlier_cap_edge_at_max_of_15() {
        // max == 15 with a wide gap to the mean allows three outliers
        let mut values = vec![0_u64; 1000];
        values.extend([1, 2, 13, 14, 15]);
        assert_eq!(find_outliers(&values, 15), vec![13, 14, 15]);

        // max == 14 allows one
        let mut values = vec![0_u64; 1000];
        values.extend([1, 2, 12, 13, 14]);
        assert_eq!(find_outliers(&values, 14), vec![12]);
    }

    #[test]
    fn test_outlier_cap_edge_at_gap_of_6() {
        // 0, 1 and 2 sit far below a mean of exactly 23; max - mean == 6
        let mut values = vec![0_u64, 1, 2, 29];
        values.extend(vec![24_u64; 60]);
        assert_eq!(mean(&values), 23.0);
        assert_eq!(find_outliers(&values, 29), vec![0, 1, 2]);

        // max - mean just under 6 allows one
        let mut values = vec![0_u64, 1, 2, 28];
        values.extend(vec![24_u64; 60]);
        assert!(28.0 - mean(&values) < 6.0);
        assert_eq!(find_outliers(&values, 28), vec![0]);
    }

    #[test]
    fn test_huge_minute_values_do_not_overflow() {
        let boundaries = derive_intensity_boundaries(&[0_u64, u64::MAX]);
        assert_eq!(
            boundaries,
            Boundaries([0, u64::MAX / 4, u64::MAX / 2, u64::MAX / 4 * 3 + 2, u64::MAX])
        );
        assert_eq!(quartile_midpoint(u64::MAX, 3), (u128::from(u64::MAX) * 3 / 4) as u64);

        let boundaries = derive_intensity_boundaries(&[1e30_f64, 5.0]);
        assert_eq!(boundaries.top(), u64::MAX);
    }

    #[test]
    fn test_boundaries_are_non_decreasing() {
        let samples: Vec<Vec<u64>> = vec![
            vec![1],
            vec![5, 5, 5],
            vec![0, 1, 2],
            vec![3, 90, 14, 14, 0, 61, 7],
            vec![1, 1000],
        ];
        for sample in samples {
            let boundaries = derive_intensity_boundaries(&sample);
            let values = boundaries.as_array();
            assert!(values.windows(2).all(|w| w[0] <= w[1]), "{values:?}");
            assert_eq!(boundaries.top(), *sample.iter().max().unwrap());
        }
    }

    #[test]
    fn test_quartile_midpoint() {
        assert_eq!(quartile_midpoint(0, 1), 0);
        assert_eq!(quartile_midpoint(1, 1), 1);
        assert_eq!(quartile_midpoint(1, 3), 1);
        assert_eq!(quartile_midpoint(8, 2), 4);
        assert_eq!(quartile_midpoint(3, 1), 3);
    }

    #[test]
    fn test_sample_standard_deviation() {
        let values = [2_u64, 4, 4, 4, 5, 5, 7, 9];
        let m = mean(&values);
        assert!((m - 5.0).abs() < 1e-9);
        assert!((standard_deviation(&values, m) - 2.138089935).abs() < 1e-6);
        assert_eq!(standard_deviation(&[3], 3.0), 0.0);
    }
}
