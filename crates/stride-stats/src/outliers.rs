use crate::descriptive;

/// Default z-score threshold above which a value is treated as an outlier.
pub const DEFAULT_THRESHOLD_SIGMA: f64 = 3.0;

/// Minimum number of values required before outlier detection runs.
pub const MIN_SAMPLES: usize = 3;

/// Result of splitting a dataset into outliers and retained values.
///
/// Both vectors preserve the input order of their members.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutlierSplit {
    /// Values whose z-score exceeded the threshold.
    pub outliers: Vec<f64>,
    /// Values kept for further analysis.
    pub cleaned: Vec<f64>,
}

/// Splits `values` into outliers and cleaned values by z-score.
///
/// For each value `z = |value - mean| / std_dev` (population deviation).
/// Values with `z > threshold_sigma` are outliers.
///
/// Fewer than [`MIN_SAMPLES`] values, or a zero standard deviation, return
/// the input unchanged with no outliers.
///
/// # Masking
///
/// A single extreme value inflates the standard deviation it is measured
/// against. With small samples this can hide the value from detection; that is
/// inherent to the z-score method. Pre-filter with a median-based rule when
/// robust rejection on small samples is needed.
///
/// # Examples
///
/// ```
/// use stride_stats::outliers::{detect_outliers, DEFAULT_THRESHOLD_SIGMA};
///
/// let mut values = vec![10.0; 19];
/// values.push(500.0);
/// let split = detect_outliers(&values, DEFAULT_THRESHOLD_SIGMA);
/// assert_eq!(split.outliers, vec![500.0]);
/// assert_eq!(split.cleaned.len(), 19);
/// ```
#[must_use]
pub fn detect_outliers(values: &[f64], threshold_sigma: f64) -> OutlierSplit {
    if values.len() < MIN_SAMPLES {
        return OutlierSplit {
            outliers: vec![],
            cleaned: values.to_vec(),
        };
    }

    let mean = descriptive::mean(values);
    let std_dev = descriptive::std_dev(values);
    if std_dev <= 0.0 {
        return OutlierSplit {
            outliers: vec![],
            cleaned: values.to_vec(),
        };
    }

    let (outliers, cleaned) = values
        .iter()
        .copied()
        .partition(|&value| (value - mean).abs() / std_dev > threshold_sigma);
    OutlierSplit { outliers, cleaned }
}

/// Z-score of `value` against `mean` and `std_dev`; `0.0` when the deviation is zero.
#[must_use]
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    (value - mean) / std_dev
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_extreme_value_flagged() {
        let mut values = vec![10.0; 19];
        values.push(500.0);

        assert!((descriptive::mean(&values) - 34.5).abs() < 1e-9);
        assert!((descriptive::std_dev(&values) - 106.79).abs() < 0.01);
        let z = z_score(500.0, 34.5, descriptive::std_dev(&values));
        assert!((z - 4.36).abs() < 0.01);

        let split = detect_outliers(&values, DEFAULT_THRESHOLD_SIGMA);
        assert_eq!(split.outliers, vec![500.0]);
        assert_eq!(split.cleaned, vec![10.0; 19]);
    }

    #[test]
    fn test_insufficient_samples_unchanged() {
        let split = detect_outliers(&[1.0, 1000.0], DEFAULT_THRESHOLD_SIGMA);
        assert!(split.outliers.is_empty());
        assert_eq!(split.cleaned, vec![1.0, 1000.0]);
    }

    #[test]
    fn test_small_sample_masking() {
        // The extreme value inflates its own deviation: z stays below 3.
        let split = detect_outliers(&[10.0, 10.0, 10.0, 500.0], DEFAULT_THRESHOLD_SIGMA);
        assert!(split.outliers.is_empty());
        assert_eq!(split.cleaned.len(), 4);
    }

    #[test]
    fn test_constant_values() {
        let split = detect_outliers(&[5.0; 6], DEFAULT_THRESHOLD_SIGMA);
        assert!(split.outliers.is_empty());
        assert_eq!(split.cleaned.len(), 6);
    }

    #[test]
    fn test_lower_threshold_flags_more() {
        let values = [1.0, 2.0, 3.0, 4.0, 100.0];
        let split = detect_outliers(&values, 1.5);
        assert_eq!(split.outliers, vec![100.0]);
        assert_eq!(split.cleaned, vec![1.0, 2.0, 3.0, 4.0]);
    }
}
