//! The three comparison algorithms.
//!
//! A [`Comparator`] classifies each requested metric of a player's current
//! [`AggregateMetrics`] against a reference:
//!
//! - [`Comparator::compare_to_past`]: the player's own earlier window; each
//!   metric is [`Trend::Improved`], [`Trend::Declined`] or [`Trend::Unchanged`].
//! - [`Comparator::compare_to_benchmark`]: a population [`BenchmarkStatistics`];
//!   each metric gets a percentile rank and a [`Performance`] band.
//! - [`Comparator::compare_stage`]: the past comparison restricted to one stage,
//!   plus an estimated [`Difficulty`].
//!
//! A metric with no catalog definition, or whose value is missing on either
//! side, is skipped and recorded in `skipped`; the remaining metrics are still
//! compared. Every call is a pure function of its arguments.
//!
//! # Examples
//!
//! ```
//! use stride_analysis::{
//!     comparison::{Comparator, OverallTrend, Trend},
//!     config::ComparisonThresholds,
//!     metric::{MetricCatalog, MetricKey},
//!     session::AggregateMetrics,
//! };
//!
//! let catalog = MetricCatalog::standard();
//! let thresholds = ComparisonThresholds::default();
//! let comparator = Comparator::new(&catalog, &thresholds);
//!
//! let current = AggregateMetrics { session_count: 5, score: Some(1100.0), ..Default::default() };
//! let past = AggregateMetrics { session_count: 5, score: Some(1000.0), ..Default::default() };
//! let result = comparator.compare_to_past(&current, &past, &[MetricKey::Score]);
//!
//! let score = &result.metrics[&MetricKey::Score];
//! assert_eq!(score.trend, Trend::Improved);
//! assert_eq!(score.display, "+100pts (+10.0%)");
//! assert_eq!(result.overall_trend, OverallTrend::Improving);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stride_stats::outliers;
use tracing::debug;

use crate::{
    benchmark::{BenchmarkStatistics, DataQuality, percentile_rank},
    config::ComparisonThresholds,
    metric::{MetricCatalog, MetricKey, format_change},
    session::AggregateMetrics,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improved,
    Declined,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallTrend {
    Improving,
    Declining,
    Stable,
}

impl OverallTrend {
    fn from_tally(improvements: usize, declines: usize) -> Self {
        match improvements.cmp(&declines) {
            std::cmp::Ordering::Greater => Self::Improving,
            std::cmp::Ordering::Less => Self::Declining,
            std::cmp::Ordering::Equal => Self::Stable,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum Performance {
    AboveAverage,
    Average,
    BelowAverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallPerformance {
    Excellent,
    Average,
    NeedsImprovement,
}

impl OverallPerformance {
    fn from_tally(above: usize, below: usize) -> Self {
        match above.cmp(&below) {
            std::cmp::Ordering::Greater => Self::Excellent,
            std::cmp::Ordering::Less => Self::NeedsImprovement,
            std::cmp::Ordering::Equal => Self::Average,
        }
    }
}

/// One metric compared against the player's own past.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastMetricComparison {
    pub current: f64,
    pub past: f64,
    pub change: f64,
    /// `change / past * 100`, or `0.0` when `past` is zero.
    pub change_percent: f64,
    pub trend: Trend,
    /// Human-readable change, e.g. `"+100pts (+10.0%)"`.
    pub display: String,
}

/// Result of comparing a window of sessions with an earlier one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastComparison {
    /// `false` when no metric could be compared.
    pub available: bool,
    pub improvements: usize,
    pub declines: usize,
    pub unchanged: usize,
    pub overall_trend: OverallTrend,
    pub metrics: BTreeMap<MetricKey, PastMetricComparison>,
    /// Requested metrics that were skipped.
    pub skipped: Vec<MetricKey>,
}

/// One metric placed within a population benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkMetricComparison {
    pub current: f64,
    pub benchmark_mean: f64,
    pub benchmark_median: f64,
    /// `current - benchmark_mean`.
    pub difference: f64,
    /// `difference / benchmark_mean * 100`, or `0.0` when the mean is zero.
    pub difference_percent: f64,
    /// Interpolated position in `0..=100`.
    pub percentile_rank: f64,
    pub z_score: f64,
    pub performance: Performance,
    pub display: String,
}

/// Result of comparing a player with a population benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    pub available: bool,
    pub above_average: usize,
    pub average: usize,
    pub below_average: usize,
    pub overall_performance: OverallPerformance,
    pub metrics: BTreeMap<MetricKey, BenchmarkMetricComparison>,
    pub skipped: Vec<MetricKey>,
    /// Quality of the benchmark the player was compared against.
    pub quality: DataQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
pub enum DifficultyLabel {
    #[display("easy")]
    Easy,
    #[display("normal")]
    Normal,
    #[display("hard")]
    Hard,
    #[display("very-hard")]
    VeryHard,
}

/// Estimated stage difficulty on a `1..=10` scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Difficulty {
    pub score: u8,
    pub label: DifficultyLabel,
}

impl Difficulty {
    /// `clamp(round(10 - completion_rate * 5 - accuracy * 3), 1, 10)`.
    ///
    /// Returns `None` unless both completion rate and accuracy are present.
    ///
    /// # Examples
    ///
    /// ```
    /// use stride_analysis::{
    ///     comparison::{Difficulty, DifficultyLabel},
    ///     session::AggregateMetrics,
    /// };
    ///
    /// let metrics = AggregateMetrics {
    ///     completion_rate: Some(0.2),
    ///     accuracy: Some(0.5),
    ///     ..Default::default()
    /// };
    /// let difficulty = Difficulty::estimate(&metrics).unwrap();
    /// assert_eq!(difficulty.score, 8);
    /// assert_eq!(difficulty.label, DifficultyLabel::Hard);
    /// ```
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn estimate(metrics: &AggregateMetrics) -> Option<Self> {
        let completion_rate = metrics.completion_rate?;
        let accuracy = metrics.accuracy?;
        let score = (10.0 - completion_rate * 5.0 - accuracy * 3.0)
            .round()
            .clamp(1.0, 10.0) as u8;
        let label = match score {
            0..=2 => DifficultyLabel::Easy,
            3..=5 => DifficultyLabel::Normal,
            6..=8 => DifficultyLabel::Hard,
            _ => DifficultyLabel::VeryHard,
        };
        Some(Self { score, label })
    }
}

/// Past comparison of one stage, with its estimated difficulty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageComparison {
    #[serde(flatten)]
    pub comparison: PastComparison,
    pub difficulty: Option<Difficulty>,
}

/// Applies [`ComparisonThresholds`] to pairs of metric sets.
#[derive(Debug, Clone, Copy)]
pub struct Comparator<'a> {
    catalog: &'a MetricCatalog,
    thresholds: &'a ComparisonThresholds,
}

impl<'a> Comparator<'a> {
    #[must_use]
    pub fn new(catalog: &'a MetricCatalog, thresholds: &'a ComparisonThresholds) -> Self {
        Self {
            catalog,
            thresholds,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &'a MetricCatalog {
        self.catalog
    }

    /// Classifies a change: beyond the threshold percentage in either
    /// direction is a trend, anything else is unchanged.
    #[must_use]
    pub fn classify_change(&self, change: f64, change_percent: f64) -> Trend {
        if change_percent.abs() > self.thresholds.change_percent {
            if change > 0.0 {
                Trend::Improved
            } else {
                Trend::Declined
            }
        } else {
            Trend::Unchanged
        }
    }

    #[must_use]
    pub fn classify_rank(&self, rank: f64) -> Performance {
        if rank >= self.thresholds.above_average_rank {
            Performance::AboveAverage
        } else if rank <= self.thresholds.below_average_rank {
            Performance::BelowAverage
        } else {
            Performance::Average
        }
    }

    #[must_use]
    pub fn compare_to_past(
        &self,
        current: &AggregateMetrics,
        past: &AggregateMetrics,
        keys: &[MetricKey],
    ) -> PastComparison {
        let mut metrics = BTreeMap::new();
        let mut skipped = vec![];

        for &key in keys {
            let Some(definition) = self.catalog.get(key) else {
                debug!(metric = %key, "skipping metric without definition");
                skipped.push(key);
                continue;
            };
            let (Some(current_value), Some(past_value)) = (current.get(key), past.get(key))
            else {
                debug!(metric = %key, "skipping metric missing from one window");
                skipped.push(key);
                continue;
            };

            let change = current_value - past_value;
            let change_percent = ratio_percent(change, past_value);
            metrics.insert(
                key,
                PastMetricComparison {
                    current: current_value,
                    past: past_value,
                    change,
                    change_percent,
                    trend: self.classify_change(change, change_percent),
                    display: format_change(change, change_percent, definition),
                },
            );
        }

        let improvements = metrics.values().filter(|m| m.trend.is_improved()).count();
        let declines = metrics.values().filter(|m| m.trend.is_declined()).count();
        let unchanged = metrics.len() - improvements - declines;
        PastComparison {
            available: !metrics.is_empty(),
            improvements,
            declines,
            unchanged,
            overall_trend: OverallTrend::from_tally(improvements, declines),
            metrics,
            skipped,
        }
    }

    #[must_use]
    pub fn compare_to_benchmark(
        &self,
        current: &AggregateMetrics,
        benchmark: &BenchmarkStatistics,
        keys: &[MetricKey],
    ) -> BenchmarkComparison {
        let mut metrics = BTreeMap::new();
        let mut skipped = vec![];

        for &key in keys {
            let Some(definition) = self.catalog.get(key) else {
                debug!(metric = %key, "skipping metric without definition");
                skipped.push(key);
                continue;
            };
            let (Some(current_value), Some(distribution)) =
                (current.get(key), benchmark.metrics.get(&key))
            else {
                debug!(metric = %key, "skipping metric missing from player or benchmark");
                skipped.push(key);
                continue;
            };

            let difference = current_value - distribution.mean;
            let difference_percent = ratio_percent(difference, distribution.mean);
            let rank = percentile_rank(current_value, distribution);
            metrics.insert(
                key,
                BenchmarkMetricComparison {
                    current: current_value,
                    benchmark_mean: distribution.mean,
                    benchmark_median: distribution.median,
                    difference,
                    difference_percent,
                    percentile_rank: rank,
                    z_score: outliers::z_score(
                        current_value,
                        distribution.mean,
                        distribution.std_dev,
                    ),
                    performance: self.classify_rank(rank),
                    display: format_change(difference, difference_percent, definition),
                },
            );
        }

        let above_average = metrics
            .values()
            .filter(|m| m.performance.is_above_average())
            .count();
        let below_average = metrics
            .values()
            .filter(|m| m.performance.is_below_average())
            .count();
        BenchmarkComparison {
            available: !metrics.is_empty(),
            above_average,
            average: metrics.len() - above_average - below_average,
            below_average,
            overall_performance: OverallPerformance::from_tally(above_average, below_average),
            metrics,
            skipped,
            quality: benchmark.quality,
        }
    }

    /// Past comparison for one stage. The difficulty is estimated from the
    /// current window.
    #[must_use]
    pub fn compare_stage(
        &self,
        current: &AggregateMetrics,
        past: &AggregateMetrics,
        keys: &[MetricKey],
    ) -> StageComparison {
        StageComparison {
            comparison: self.compare_to_past(current, past, keys),
            difficulty: Difficulty::estimate(current),
        }
    }
}

/// `numerator / denominator * 100`, or `0.0` for a zero denominator.
fn ratio_percent(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::BenchmarkBuilder;
    use crate::config::BenchmarkConfig;

    fn metrics(score: f64, accuracy: f64, play_time: f64) -> AggregateMetrics {
        AggregateMetrics {
            session_count: 10,
            score: Some(score),
            accuracy: Some(accuracy),
            play_time: Some(play_time),
            completion_rate: Some(0.8),
            max_combo: Some(20.0),
        }
    }

    fn with_comparator<R>(f: impl FnOnce(Comparator<'_>) -> R) -> R {
        let catalog = MetricCatalog::standard();
        let thresholds = ComparisonThresholds::default();
        f(Comparator::new(&catalog, &thresholds))
    }

    #[test]
    fn test_past_comparison_classifies_each_metric() {
        let current = metrics(1200.0, 0.85, 300.0);
        let past = metrics(1000.0, 0.80, 320.0);
        let result = with_comparator(|c| {
            c.compare_to_past(
                &current,
                &past,
                &[MetricKey::Score, MetricKey::Accuracy, MetricKey::PlayTime],
            )
        });

        assert!(result.available);
        assert_eq!(result.metrics[&MetricKey::Score].trend, Trend::Improved);
        assert!((result.metrics[&MetricKey::Score].change_percent - 20.0).abs() < 1e-9);
        assert_eq!(result.metrics[&MetricKey::Accuracy].trend, Trend::Improved);
        assert_eq!(result.metrics[&MetricKey::PlayTime].trend, Trend::Declined);
        assert_eq!(result.improvements, 2);
        assert_eq!(result.declines, 1);
        assert_eq!(result.unchanged, 0);
        assert_eq!(result.overall_trend, OverallTrend::Improving);
    }

    #[test]
    fn test_small_change_is_unchanged() {
        let current = metrics(1040.0, 0.8, 300.0);
        let past = metrics(1000.0, 0.8, 300.0);
        let result = with_comparator(|c| c.compare_to_past(&current, &past, &MetricKey::ALL));
        assert_eq!(result.metrics[&MetricKey::Score].trend, Trend::Unchanged);
        assert_eq!(result.unchanged, 5);
        assert_eq!(result.overall_trend, OverallTrend::Stable);
    }

    #[test]
    fn test_zero_past_value_has_zero_percent() {
        let mut current = metrics(1000.0, 0.8, 300.0);
        let mut past = metrics(1000.0, 0.8, 300.0);
        current.max_combo = Some(10.0);
        past.max_combo = Some(0.0);
        let result = with_comparator(|c| c.compare_to_past(&current, &past, &[MetricKey::MaxCombo]));
        let combo = &result.metrics[&MetricKey::MaxCombo];
        assert_eq!(combo.change, 10.0);
        assert_eq!(combo.change_percent, 0.0);
        assert_eq!(combo.trend, Trend::Unchanged);
    }

    #[test]
    fn test_missing_metric_skipped_not_aborted() {
        let current = metrics(1200.0, 0.85, 300.0);
        let mut past = metrics(1000.0, 0.80, 320.0);
        past.accuracy = None;

        let catalog = MetricCatalog::standard().without(MetricKey::PlayTime);
        let thresholds = ComparisonThresholds::default();
        let comparator = Comparator::new(&catalog, &thresholds);
        let result = comparator.compare_to_past(
            &current,
            &past,
            &[MetricKey::Accuracy, MetricKey::PlayTime, MetricKey::Score],
        );

        assert_eq!(result.skipped, vec![MetricKey::Accuracy, MetricKey::PlayTime]);
        assert_eq!(result.metrics.len(), 1);
        assert_eq!(result.metrics[&MetricKey::Score].trend, Trend::Improved);
    }

    #[test]
    fn test_empty_past_is_unavailable() {
        let current = metrics(1200.0, 0.85, 300.0);
        let result = with_comparator(|c| {
            c.compare_to_past(&current, &AggregateMetrics::default(), &MetricKey::ALL)
        });
        assert!(!result.available);
        assert_eq!(result.skipped.len(), 5);
        assert_eq!(result.overall_trend, OverallTrend::Stable);
    }

    #[test]
    fn test_compare_to_past_is_idempotent() {
        let current = metrics(1234.5, 0.77, 301.0);
        let past = metrics(1111.1, 0.81, 299.0);
        let (first, second) = with_comparator(|c| {
            (
                c.compare_to_past(&current, &past, &MetricKey::ALL),
                c.compare_to_past(&current, &past, &MetricKey::ALL),
            )
        });
        assert_eq!(first, second);
        for key in first.metrics.keys() {
            assert_eq!(
                first.metrics[key].change_percent.to_bits(),
                second.metrics[key].change_percent.to_bits()
            );
        }
    }

    #[test]
    fn test_benchmark_comparison() {
        let population = (0..=100)
            .map(|i| {
                let i = f64::from(i);
                metrics(i * 10.0, i / 100.0, 300.0)
            })
            .collect::<Vec<_>>();
        let config = BenchmarkConfig::default();
        let benchmark = BenchmarkBuilder::new(&config).build(&population, &MetricKey::ALL);

        let player = metrics(900.0, 0.1, 300.0);
        let result = with_comparator(|c| {
            c.compare_to_benchmark(
                &player,
                &benchmark,
                &[MetricKey::Score, MetricKey::Accuracy, MetricKey::PlayTime],
            )
        });

        let score = &result.metrics[&MetricKey::Score];
        assert_eq!(score.performance, Performance::AboveAverage);
        assert!((score.percentile_rank - 90.0).abs() < 1e-9);
        assert!((score.difference - 400.0).abs() < 1e-9);
        assert!(score.z_score > 0.0);

        let accuracy = &result.metrics[&MetricKey::Accuracy];
        assert_eq!(accuracy.performance, Performance::BelowAverage);

        // Every player has the same play time: rank 0 at the minimum.
        let play_time = &result.metrics[&MetricKey::PlayTime];
        assert_eq!(play_time.percentile_rank, 0.0);
        assert_eq!(play_time.z_score, 0.0);

        assert_eq!(result.above_average, 1);
        assert_eq!(result.below_average, 2);
        assert_eq!(result.overall_performance, OverallPerformance::NeedsImprovement);
    }

    #[test]
    fn test_stage_difficulty_bands() {
        let estimate = |completion_rate, accuracy| {
            Difficulty::estimate(&AggregateMetrics {
                completion_rate: Some(completion_rate),
                accuracy: Some(accuracy),
                ..AggregateMetrics::default()
            })
            .unwrap()
        };
        assert_eq!(estimate(1.0, 1.0).score, 2);
        assert_eq!(estimate(1.0, 1.0).label, DifficultyLabel::Easy);
        assert_eq!(estimate(0.6, 0.8).score, 5);
        assert_eq!(estimate(0.6, 0.8).label, DifficultyLabel::Normal);
        assert_eq!(estimate(0.0, 0.0).score, 10);
        assert_eq!(estimate(0.0, 0.0).label, DifficultyLabel::VeryHard);
        assert_eq!(
            Difficulty::estimate(&AggregateMetrics {
                completion_rate: Some(0.5),
                ..AggregateMetrics::default()
            }),
            None
        );
    }

    #[test]
    fn test_compare_stage_carries_difficulty() {
        let current = metrics(1000.0, 0.5, 300.0);
        let past = metrics(800.0, 0.5, 300.0);
        let result = with_comparator(|c| c.compare_stage(&current, &past, &MetricKey::ALL));
        assert_eq!(result.comparison.improvements, 1);
        // 10 - 0.8 * 5 - 0.5 * 3 = 4.5, rounded away from zero.
        assert_eq!(result.difficulty.unwrap().score, 5);
    }
}
