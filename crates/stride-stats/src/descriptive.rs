use crate::percentiles;

/// Descriptive statistics summarizing a dataset.
///
/// This structure holds the five-number summary (min, quartiles, max) together
/// with the mean and population standard deviation of a dataset of `f64` values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptiveStats {
    /// The number of values in the dataset.
    pub count: usize,
    /// The minimum value in the dataset.
    pub min: f64,
    /// The 25th percentile (first quartile).
    pub p25: f64,
    /// The median value of the dataset.
    pub median: f64,
    /// The 75th percentile (third quartile).
    pub p75: f64,
    /// The maximum value in the dataset.
    pub max: f64,
    /// The arithmetic mean (average) of the dataset.
    pub mean: f64,
    /// The population standard deviation of the dataset.
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// This method will sort the values internally before computing statistics.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use stride_stats::descriptive::DescriptiveStats;
    /// let values = [50.0, 20.0, 40.0, 10.0, 30.0];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.min, 10.0);
    /// assert_eq!(stats.max, 50.0);
    /// assert_eq!(stats.mean, 30.0);
    /// assert_eq!(stats.median, 30.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// Quartiles use the same linear interpolation as
    /// [`compute_percentile`](crate::percentiles::compute_percentile).
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stride_stats::descriptive::DescriptiveStats;
    /// let values = [1.0, 2.0, 3.0, 4.0];
    /// let stats = DescriptiveStats::from_sorted(&values).unwrap();
    /// assert_eq!(stats.median, 2.5);
    /// assert_eq!(stats.p25, 1.75);
    /// ```
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;

        Some(Self {
            count: sorted_values.len(),
            min,
            p25: percentiles::compute_percentile(sorted_values, 25.0),
            median: percentiles::compute_percentile(sorted_values, 50.0),
            p75: percentiles::compute_percentile(sorted_values, 75.0),
            max,
            mean: mean(sorted_values),
            std_dev: std_dev(sorted_values),
        })
    }
}

/// Arithmetic mean of `values`. Returns `0.0` for empty input.
///
/// # Examples
///
/// ```
/// # use stride_stats::descriptive::mean;
/// assert_eq!(mean(&[10.0, 20.0, 30.0]), 20.0);
/// assert_eq!(mean(&[]), 0.0);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation: the square root of the mean squared
/// deviation from the mean. Returns `0.0` for empty input.
///
/// # Examples
///
/// ```
/// # use stride_stats::descriptive::std_dev;
/// let sd = std_dev(&[10.0, 20.0, 30.0, 40.0, 50.0]);
/// assert!((sd - 200.0_f64.sqrt()).abs() < 1e-12);
/// assert_eq!(std_dev(&[]), 0.0);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Sample variance with Bessel's correction (`n - 1` denominator). Returns
/// `0.0` for fewer than two values.
///
/// ```
/// # use stride_stats::descriptive::sample_variance;
/// assert_eq!(sample_variance(&[1.0, 3.0]), 2.0);
/// assert_eq!(sample_variance(&[4.0]), 0.0);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean(values);
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(DescriptiveStats::new(Vec::<f64>::new()).is_none());
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
    }

    #[test]
    fn test_single_value() {
        let stats = DescriptiveStats::new([42.0]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.min, 42.0);
        assert_eq!(stats.p25, 42.0);
        assert_eq!(stats.median, 42.0);
        assert_eq!(stats.p75, 42.0);
        assert_eq!(stats.max, 42.0);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_five_number_summary() {
        let stats = DescriptiveStats::new([10.0, 20.0, 30.0, 40.0, 50.0]).unwrap();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.p25, 20.0);
        assert_eq!(stats.median, 30.0);
        assert_eq!(stats.p75, 40.0);
        assert!((stats.std_dev - 14.142_135_623_730_951).abs() < 1e-9);
    }

    #[test]
    fn test_population_not_sample_deviation() {
        // Sample deviation would be sqrt(2) here; population deviation is 1.
        let sd = std_dev(&[1.0, 3.0]);
        assert!((sd - 1.0).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "values must be sorted")]
    fn test_unsorted_input_panics() {
        let _ = DescriptiveStats::from_sorted(&[3.0, 1.0, 2.0]);
    }
}
