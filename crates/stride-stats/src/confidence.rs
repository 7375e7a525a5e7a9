/// Two-sided z critical value for a 95% confidence level.
pub const Z_95: f64 = 1.96;

/// A symmetric confidence interval around a mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    /// Lower bound (`mean - margin`).
    pub lower: f64,
    /// Upper bound (`mean + margin`).
    pub upper: f64,
    /// Half-width of the interval.
    pub margin: f64,
}

impl ConfidenceInterval {
    /// 95% normal-approximation interval: `margin = 1.96 * std_dev / sqrt(n)`.
    ///
    /// A sample size of zero yields a zero-width interval at `mean`.
    ///
    /// # Examples
    ///
    /// ```
    /// use stride_stats::confidence::ConfidenceInterval;
    ///
    /// let ci = ConfidenceInterval::normal_95(100.0, 10.0, 4);
    /// assert!((ci.margin - 9.8).abs() < 1e-12);
    /// assert!((ci.lower - 90.2).abs() < 1e-12);
    /// assert!((ci.upper - 109.8).abs() < 1e-12);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn normal_95(mean: f64, std_dev: f64, n: usize) -> Self {
        let margin = if n == 0 {
            0.0
        } else {
            Z_95 * std_dev / (n as f64).sqrt()
        };
        Self::around(mean, margin)
    }

    /// Interval `center ± margin`.
    #[must_use]
    pub fn around(center: f64, margin: f64) -> Self {
        Self {
            lower: center - margin,
            upper: center + margin,
            margin,
        }
    }

    /// Returns `true` if `value` lies inside the closed interval.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}
