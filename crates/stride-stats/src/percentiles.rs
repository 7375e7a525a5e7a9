/// Computes a single percentile value from sorted data.
///
/// Uses linear interpolation between closest ranks: the fractional index
/// `i = p / 100 * (n - 1)` is split into `floor(i)` and `ceil(i)` and the two
/// neighbouring values are blended by the fractional part. `percentile` is
/// clamped to `[0, 100]`.
///
/// The input must already be sorted ascending; this function does not sort.
/// A singleton returns its only value and an empty slice returns `0.0`.
///
/// # Examples
///
/// ```
/// use stride_stats::percentiles::compute_percentile;
///
/// let values = [10.0, 20.0, 30.0, 40.0];
/// assert_eq!(compute_percentile(&values, 50.0), 25.0);
/// assert_eq!(compute_percentile(&values, 0.0), 10.0);
/// assert_eq!(compute_percentile(&values, 100.0), 40.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    match sorted_values {
        [] => 0.0,
        [only] => *only,
        _ => {
            let percentile = percentile.clamp(0.0, 100.0);
            let index = percentile / 100.0 * (sorted_values.len() - 1) as f64;
            let lower = index.floor() as usize;
            let upper = index.ceil() as usize;
            if lower == upper {
                return sorted_values[lower];
            }
            let weight = index - index.floor();
            sorted_values[lower] * (1.0 - weight) + sorted_values[upper] * weight
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_length() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(compute_percentile(&values, 50.0), 30.0);
    }

    #[test]
    fn test_median_even_length() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(compute_percentile(&values, 50.0), 3.5);
    }

    #[test]
    fn test_interpolated_quartiles() {
        let values = [0.0, 10.0];
        assert_eq!(compute_percentile(&values, 25.0), 2.5);
        assert_eq!(compute_percentile(&values, 75.0), 7.5);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(compute_percentile(&[], 50.0), 0.0);
        assert_eq!(compute_percentile(&[7.0], 90.0), 7.0);
    }

    #[test]
    fn test_out_of_range_percentile_is_clamped() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(compute_percentile(&values, -10.0), 1.0);
        assert_eq!(compute_percentile(&values, 250.0), 3.0);
    }

    #[test]
    fn test_median_matches_conventional_median() {
        use rand::{Rng as _, SeedableRng as _};

        let mut rng = rand_pcg::Pcg64::seed_from_u64(0x5eed);
        for len in 1..40 {
            let mut values = (0..len)
                .map(|_| rng.random_range(-500.0..500.0))
                .collect::<Vec<f64>>();
            values.sort_by(f64::total_cmp);

            let mid = values.len() / 2;
            let expected = if values.len() % 2 == 0 {
                f64::midpoint(values[mid - 1], values[mid])
            } else {
                values[mid]
            };
            let median = compute_percentile(&values, 50.0);
            assert!(
                (median - expected).abs() < 1e-9,
                "len={len}: {median} != {expected}"
            );
        }
    }
}
