/// Ordinary least-squares fit of a series against its index.
///
/// The series `values[i]` is regressed on `x = i` for `i in 0..n`. The
/// correlation is the signed square root of the coefficient of determination:
/// `sign(slope) * sqrt(1 - ss_residual / ss_total)`.
///
/// # Numeric domain
///
/// With noisy, non-monotonic data floating-point error can push
/// `ss_residual` slightly above `ss_total`, which would make the radicand
/// negative. The radicand is clamped to `[0, 1]` before the square root so
/// the correlation is always defined and lies in `[-1, 1]`.
///
/// # Examples
///
/// ```
/// use stride_stats::trend::LinearTrend;
///
/// let trend = LinearTrend::fit(&[1.0, 2.0, 3.0, 4.0, 5.0]);
/// assert_eq!(trend.slope, 1.0);
/// assert_eq!(trend.intercept, 1.0);
/// assert!((trend.correlation - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinearTrend {
    /// Change in value per index step.
    pub slope: f64,
    /// Fitted value at index 0.
    pub intercept: f64,
    /// Signed goodness of fit in `[-1, 1]`. `0.0` when the series is flat.
    pub correlation: f64,
}

impl LinearTrend {
    /// Fits a trend line to `values`.
    ///
    /// Fewer than two values yield an all-zero trend. A constant series has
    /// zero total variance and reports a correlation of `0.0`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fit(values: &[f64]) -> Self {
        let n = values.len();
        if n < 2 {
            return Self::default();
        }

        let x_mean = (n - 1) as f64 / 2.0;
        let y_mean = values.iter().sum::<f64>() / n as f64;

        let (sxy, sxx) = values
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(sxy, sxx), (i, y)| {
                let dx = i as f64 - x_mean;
                (sxy + dx * (y - y_mean), sxx + dx * dx)
            });
        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;

        let ss_total = values.iter().map(|y| (y - y_mean).powi(2)).sum::<f64>();
        if ss_total <= f64::EPSILON {
            return Self {
                slope,
                intercept,
                correlation: 0.0,
            };
        }
        let ss_residual = values
            .iter()
            .enumerate()
            .map(|(i, y)| (y - (intercept + slope * i as f64)).powi(2))
            .sum::<f64>();

        let radicand = (1.0 - ss_residual / ss_total).clamp(0.0, 1.0);
        let magnitude = radicand.sqrt();
        let correlation = if slope < 0.0 { -magnitude } else { magnitude };

        Self {
            slope,
            intercept,
            correlation,
        }
    }
}
