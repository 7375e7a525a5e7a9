//! Two-sample significance testing.
//!
//! [`WelchTTest`] compares the means of two independent samples without
//! assuming equal variances; [`EffectSize`] measures how large the difference
//! is regardless of sample size.
//!
//! The t distribution is approximated: above 30 degrees of freedom by the
//! standard normal, below by a closed-form tail `(1 + t²/df)^(-(df+1)/2)`.
//! This is adequate to flag clear differences, not for publication-grade
//! p-values.

use crate::{
    confidence::{ConfidenceInterval, Z_95},
    descriptive,
};

/// Degrees of freedom above which the t distribution is treated as normal.
const NORMAL_APPROXIMATION_DF: f64 = 30.0;

/// Welch's unequal-variance t-test of `mean(a) - mean(b)`.
///
/// # Examples
///
/// ```
/// use stride_stats::significance::WelchTTest;
///
/// let a = [12.0, 14.0, 13.0, 15.0, 14.0, 13.0];
/// let b = [8.0, 9.0, 10.0, 9.0, 8.0, 10.0];
/// let test = WelchTTest::new(&a, &b).unwrap();
/// assert!(test.mean_difference > 0.0);
/// assert!(test.p_value < 0.05);
/// assert!(test.confidence_interval.contains(test.mean_difference));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WelchTTest {
    pub t_statistic: f64,
    /// Welch-Satterthwaite degrees of freedom.
    pub degrees_of_freedom: f64,
    pub mean_difference: f64,
    pub standard_error: f64,
    /// Two-sided p-value in `[0, 1]`.
    pub p_value: f64,
    /// 95% interval of the mean difference.
    pub confidence_interval: ConfidenceInterval,
}

impl WelchTTest {
    /// Runs the test.
    ///
    /// Returns `None` when either sample has fewer than two values or both
    /// samples are constant, since the standard error is then zero.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(a: &[f64], b: &[f64]) -> Option<Self> {
        if a.len() < 2 || b.len() < 2 {
            return None;
        }
        let (n1, n2) = (a.len() as f64, b.len() as f64);
        let (share1, share2) = (
            descriptive::sample_variance(a) / n1,
            descriptive::sample_variance(b) / n2,
        );
        let standard_error = (share1 + share2).sqrt();
        if standard_error <= f64::EPSILON {
            return None;
        }

        let mean_difference = descriptive::mean(a) - descriptive::mean(b);
        let t_statistic = mean_difference / standard_error;
        let degrees_of_freedom = (share1 + share2).powi(2)
            / (share1.powi(2) / (n1 - 1.0) + share2.powi(2) / (n2 - 1.0));

        let margin = t_critical_95(degrees_of_freedom) * standard_error;
        Some(Self {
            t_statistic,
            degrees_of_freedom,
            mean_difference,
            standard_error,
            p_value: two_sided_p_value(t_statistic, degrees_of_freedom),
            confidence_interval: ConfidenceInterval::around(mean_difference, margin),
        })
    }

    /// Returns `true` if the p-value falls below `alpha`.
    #[must_use]
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

fn two_sided_p_value(t: f64, df: f64) -> f64 {
    let t = t.abs();
    let p = if df > NORMAL_APPROXIMATION_DF {
        2.0 * (1.0 - standard_normal_cdf(t))
    } else {
        (1.0 + t * t / df).powf(-(df + 1.0) / 2.0)
    };
    p.clamp(0.0, 1.0)
}

/// Approximate two-sided 95% critical value of the t distribution.
fn t_critical_95(df: f64) -> f64 {
    if df > NORMAL_APPROXIMATION_DF {
        Z_95
    } else {
        Z_95 * (1.0 + (Z_95 * Z_95 + 1.0) / (4.0 * df))
    }
}

/// Cumulative distribution function of the standard normal distribution.
///
/// ```
/// use stride_stats::significance::standard_normal_cdf;
///
/// assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-7);
/// assert!((standard_normal_cdf(1.96) - 0.975).abs() < 1e-3);
/// ```
#[must_use]
pub fn standard_normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Abramowitz and Stegun 7.1.26; absolute error below `1.5e-7`.
fn erf(x: f64) -> f64 {
    const A: [f64; 5] = [
        0.254_829_592,
        -0.284_496_736,
        1.421_413_741,
        -1.453_152_027,
        1.061_405_429,
    ];
    const P: f64 = 0.327_591_1;

    let sign = x.signum();
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = A.iter().rev().fold(0.0, |acc, a| acc * t + a) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Conventional bands for the absolute value of Cohen's d.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EffectMagnitude {
    /// `|d| < 0.2`
    Negligible,
    /// `0.2 <= |d| < 0.5`
    Small,
    /// `0.5 <= |d| < 0.8`
    Medium,
    /// `0.8 <= |d| < 1.2`
    Large,
    /// `|d| >= 1.2`
    VeryLarge,
}

impl EffectMagnitude {
    #[must_use]
    pub fn from_cohens_d(d: f64) -> Self {
        match d.abs() {
            d if d < 0.2 => Self::Negligible,
            d if d < 0.5 => Self::Small,
            d if d < 0.8 => Self::Medium,
            d if d < 1.2 => Self::Large,
            _ => Self::VeryLarge,
        }
    }
}

/// Standardized difference between two sample means.
///
/// # Examples
///
/// ```
/// use stride_stats::significance::{EffectMagnitude, EffectSize};
///
/// let effect = EffectSize::new(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
/// assert_eq!(effect.cohens_d, 0.0);
/// assert_eq!(effect.magnitude, EffectMagnitude::Negligible);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSize {
    /// Mean difference over the pooled sample standard deviation; `0.0` when
    /// the pooled deviation is zero.
    pub cohens_d: f64,
    /// Cohen's d with the small-sample bias correction `1 - 3 / (4·df - 1)`.
    pub hedges_g: f64,
    pub magnitude: EffectMagnitude,
}

impl EffectSize {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(a: &[f64], b: &[f64]) -> Self {
        let (n1, n2) = (a.len(), b.len());
        let pooled_variance = if n1 <= 1 || n2 <= 1 {
            0.0
        } else {
            ((n1 - 1) as f64 * descriptive::sample_variance(a)
                + (n2 - 1) as f64 * descriptive::sample_variance(b))
                / (n1 + n2 - 2) as f64
        };
        let pooled_sd = pooled_variance.sqrt();
        let cohens_d = if pooled_sd > 0.0 {
            (descriptive::mean(a) - descriptive::mean(b)) / pooled_sd
        } else {
            0.0
        };

        let df = (n1 + n2).saturating_sub(2) as f64;
        let hedges_g = if df > 0.0 {
            cohens_d * (1.0 - 3.0 / (4.0 * df - 1.0))
        } else {
            cohens_d
        };

        Self {
            cohens_d,
            hedges_g,
            magnitude: EffectMagnitude::from_cohens_d(cohens_d),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};
    use rand_pcg::Pcg64;

    use super::*;

    fn normal_sample(rng: &mut Pcg64, mean: f64, sd: f64, n: usize) -> Vec<f64> {
        let normal = Normal::new(mean, sd).unwrap();
        (0..n).map(|_| normal.sample(rng)).collect()
    }

    #[test]
    fn test_welch_known_values() {
        // Means 3 and 6, sample variances 2.5 each, n = 5.
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [4.0, 5.0, 6.0, 7.0, 8.0];
        let test = WelchTTest::new(&a, &b).unwrap();
        assert_eq!(test.mean_difference, -3.0);
        assert!((test.standard_error - 1.0).abs() < 1e-12);
        assert!((test.t_statistic + 3.0).abs() < 1e-12);
        assert!((test.degrees_of_freedom - 8.0).abs() < 1e-12);
        let expected_p = (1.0_f64 + 9.0 / 8.0).powf(-4.5);
        assert!((test.p_value - expected_p).abs() < 1e-12);
        assert!(test.is_significant(0.05));
        assert!(test.confidence_interval.upper < 0.0);
    }

    #[test]
    fn test_identical_samples_are_not_significant() {
        let a = [10.0, 12.0, 11.0, 13.0, 9.0];
        let test = WelchTTest::new(&a, &a).unwrap();
        assert_eq!(test.t_statistic, 0.0);
        assert_eq!(test.p_value, 1.0);
        assert!(!test.is_significant(0.05));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(WelchTTest::new(&[1.0], &[1.0, 2.0]).is_none());
        assert!(WelchTTest::new(&[5.0, 5.0, 5.0], &[7.0, 7.0]).is_none());
    }

    #[test]
    fn test_large_samples_use_normal_tail() {
        let mut rng = Pcg64::seed_from_u64(0x5eed_7e57);
        let a = normal_sample(&mut rng, 100.0, 10.0, 200);
        let b = normal_sample(&mut rng, 100.0, 10.0, 200);
        let c = normal_sample(&mut rng, 110.0, 10.0, 200);

        let same = WelchTTest::new(&a, &b).unwrap();
        assert!(same.degrees_of_freedom > NORMAL_APPROXIMATION_DF);
        assert!(!same.is_significant(0.001));

        let shifted = WelchTTest::new(&a, &c).unwrap();
        assert!(shifted.is_significant(0.001));
        assert!((shifted.mean_difference + 10.0).abs() < 4.0);
    }

    #[test]
    fn test_erf_is_odd_and_bounded() {
        for x in [0.1, 0.5, 1.0, 2.0, 4.0] {
            assert!((erf(x) + erf(-x)).abs() < 1e-12);
            assert!(erf(x) <= 1.0);
        }
        assert!((erf(1.0) - 0.842_700_79).abs() < 1e-6);
    }

    #[test]
    fn test_effect_size() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [4.0, 5.0, 6.0, 7.0, 8.0];
        let effect = EffectSize::new(&a, &b);
        let d = -3.0 / 2.5_f64.sqrt();
        assert!((effect.cohens_d - d).abs() < 1e-12);
        assert!((effect.hedges_g - d * (1.0 - 3.0 / 31.0)).abs() < 1e-12);
        assert_eq!(effect.magnitude, EffectMagnitude::VeryLarge);

        let flat = EffectSize::new(&[2.0, 2.0], &[3.0, 3.0]);
        assert_eq!(flat.cohens_d, 0.0);
    }

    #[test]
    fn test_effect_magnitude_bands() {
        assert_eq!(EffectMagnitude::from_cohens_d(0.1), EffectMagnitude::Negligible);
        assert_eq!(EffectMagnitude::from_cohens_d(-0.3), EffectMagnitude::Small);
        assert_eq!(EffectMagnitude::from_cohens_d(0.5), EffectMagnitude::Medium);
        assert_eq!(EffectMagnitude::from_cohens_d(0.8), EffectMagnitude::Large);
        assert_eq!(EffectMagnitude::from_cohens_d(-1.5), EffectMagnitude::VeryLarge);
    }
}
