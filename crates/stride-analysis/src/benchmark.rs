//! Population benchmarks.
//!
//! A benchmark summarizes one [`AggregateMetrics`] per player into per-metric
//! distributions ([`MetricDistribution`]) and rates how far the result can be
//! trusted ([`DataQuality`]).
//!
//! # Pipeline
//!
//! 1. **Population** ([`PlayerPopulation`]): group sessions by anonymized player
//!    and aggregate each player, leaving out the subject being compared
//! 2. **Build** ([`BenchmarkBuilder`]): collect the defined values of each
//!    metric, optionally reject z-score outliers, and compute quartiles, mean,
//!    deviation and a 95% interval for the mean
//! 3. **Rank** ([`percentile_rank`]): place a single value within a
//!    distribution's quartiles
//!
//! The engine never rebuilds a benchmark on its own. Callers that want to reuse
//! one across requests can keep it in a [`BenchmarkCache`].
//!
//! # Examples
//!
//! ```
//! use stride_analysis::{
//!     benchmark::{BenchmarkBuilder, QualityRating, percentile_rank},
//!     config::BenchmarkConfig,
//!     metric::MetricKey,
//!     session::AggregateMetrics,
//! };
//!
//! let population = (1..=50)
//!     .map(|i| AggregateMetrics {
//!         session_count: 4,
//!         score: Some(f64::from(i) * 100.0),
//!         ..Default::default()
//!     })
//!     .collect::<Vec<_>>();
//!
//! let config = BenchmarkConfig::default();
//! let benchmark = BenchmarkBuilder::new(&config).build(&population, &[MetricKey::Score]);
//! assert_eq!(benchmark.quality.rating, QualityRating::Good);
//! assert_eq!(benchmark.total_sessions, 200);
//!
//! let score = &benchmark.metrics[&MetricKey::Score];
//! assert_eq!(percentile_rank(score.median, score), 50.0);
//! ```

use std::{
    collections::BTreeMap,
    hash::{Hash, Hasher},
    sync::Arc,
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use stride_stats::{
    confidence::ConfidenceInterval, descriptive::DescriptiveStats, outliers::detect_outliers,
};
use tracing::debug;

use crate::{
    config::BenchmarkConfig,
    metric::MetricKey,
    session::{AggregateMetrics, SessionRecord, group_by_player},
};

/// Descriptive statistics of one metric across a population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDistribution {
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub count: usize,
    /// 95% confidence interval of the mean.
    pub mean_interval: MeanInterval,
    /// Values dropped by outlier rejection.
    #[serde(default)]
    pub outliers_removed: usize,
}

impl MetricDistribution {
    fn from_stats(stats: &DescriptiveStats, outliers_removed: usize) -> Self {
        Self {
            min: stats.min,
            p25: stats.p25,
            median: stats.median,
            p75: stats.p75,
            max: stats.max,
            mean: stats.mean,
            std_dev: stats.std_dev,
            count: stats.count,
            mean_interval: ConfidenceInterval::normal_95(stats.mean, stats.std_dev, stats.count)
                .into(),
            outliers_removed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeanInterval {
    pub lower: f64,
    pub upper: f64,
    pub margin: f64,
}

impl From<ConfidenceInterval> for MeanInterval {
    fn from(ci: ConfidenceInterval) -> Self {
        Self {
            lower: ci.lower,
            upper: ci.upper,
            margin: ci.margin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityRating {
    Poor,
    Fair,
    Good,
    Excellent,
}

/// How much a benchmark built from a given sample size can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    pub rating: QualityRating,
    pub confidence: f64,
    /// `true` once the sample reaches the configured minimum size.
    pub reliable: bool,
    pub sample_size: usize,
}

/// A population benchmark for a set of metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkStatistics {
    /// Only metrics with at least one defined value appear here.
    pub metrics: BTreeMap<MetricKey, MetricDistribution>,
    pub quality: DataQuality,
    pub player_count: usize,
    pub total_sessions: usize,
    pub average_sessions_per_player: f64,
}

/// Builds [`BenchmarkStatistics`] from per-player aggregates.
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkBuilder<'a> {
    config: &'a BenchmarkConfig,
    reject_outliers: bool,
}

impl<'a> BenchmarkBuilder<'a> {
    #[must_use]
    pub fn new(config: &'a BenchmarkConfig) -> Self {
        Self {
            config,
            reject_outliers: false,
        }
    }

    /// Drops values whose z-score exceeds the configured sigma before the
    /// quartiles are computed.
    #[must_use]
    pub fn with_outlier_rejection(mut self, enabled: bool) -> Self {
        self.reject_outliers = enabled;
        self
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn build(
        &self,
        population: &[AggregateMetrics],
        keys: &[MetricKey],
    ) -> BenchmarkStatistics {
        let mut metrics = BTreeMap::new();
        for &key in keys {
            let values = population.iter().filter_map(|m| m.get(key)).collect::<Vec<_>>();
            if values.is_empty() {
                debug!(metric = %key, "no population values, metric left out of benchmark");
                continue;
            }

            let (values, outliers_removed) = if self.reject_outliers {
                let split = detect_outliers(&values, self.config.outlier_sigma);
                if !split.outliers.is_empty() {
                    debug!(
                        metric = %key,
                        removed = split.outliers.len(),
                        "rejected benchmark outliers"
                    );
                }
                (split.cleaned, split.outliers.len())
            } else {
                (values, 0)
            };

            if let Some(stats) = DescriptiveStats::new(values) {
                metrics.insert(key, MetricDistribution::from_stats(&stats, outliers_removed));
            }
        }

        let player_count = population.len();
        let total_sessions = population.iter().map(|m| m.session_count).sum::<usize>();
        let average_sessions_per_player = if player_count == 0 {
            0.0
        } else {
            total_sessions as f64 / player_count as f64
        };

        BenchmarkStatistics {
            metrics,
            quality: self.assess_quality(player_count),
            player_count,
            total_sessions,
            average_sessions_per_player,
        }
    }

    /// Maps a sample size to a quality rating.
    ///
    /// | Sample size | Rating | Confidence |
    /// |---|---|---|
    /// | `< 10` | poor | 0.5 |
    /// | `< 30` | fair | 0.75 |
    /// | `< 100` | good | 0.9 |
    /// | otherwise | excellent | 0.95 |
    #[must_use]
    pub fn assess_quality(&self, sample_size: usize) -> DataQuality {
        let (rating, confidence) = match sample_size {
            0..10 => (QualityRating::Poor, 0.5),
            10..30 => (QualityRating::Fair, 0.75),
            30..100 => (QualityRating::Good, 0.9),
            _ => (QualityRating::Excellent, 0.95),
        };
        DataQuality {
            rating,
            confidence,
            reliable: sample_size >= self.config.min_sample_size,
            sample_size,
        }
    }
}

/// Position of `value` within a distribution, in `0..=100`.
///
/// The quartiles are joined piecewise-linearly, except below the first
/// quartile: any value above the minimum but not above `p25` ranks exactly 25.
/// The rules apply in table order, so when the upper quartiles collapse onto
/// the maximum a value equal to them still ranks 25.
///
/// | Value | Rank |
/// |---|---|
/// | `<= min` | 0 |
/// | `<= p25` | 25 |
/// | `p25..=median` | 25 to 50 |
/// | `median..=p75` | 50 to 75 |
/// | `>= max` | 100 |
/// | `p75..max` | 75 to 100 |
///
/// # Examples
///
/// ```
/// # use stride_analysis::benchmark::{MetricDistribution, MeanInterval, percentile_rank};
/// let dist = MetricDistribution {
///     min: 0.0, p25: 25.0, median: 50.0, p75: 75.0, max: 100.0,
///     mean: 50.0, std_dev: 25.0, count: 5,
///     mean_interval: MeanInterval { lower: 50.0, upper: 50.0, margin: 0.0 },
///     outliers_removed: 0,
/// };
/// assert_eq!(percentile_rank(60.0, &dist), 60.0);
/// assert_eq!(percentile_rank(0.0, &dist), 0.0);
/// assert_eq!(percentile_rank(100.0, &dist), 100.0);
/// assert_eq!(percentile_rank(50.0, &dist), 50.0);
/// assert_eq!(percentile_rank(10.0, &dist), 25.0);
/// ```
#[must_use]
pub fn percentile_rank(value: f64, dist: &MetricDistribution) -> f64 {
    let rank = if value <= dist.min {
        0.0
    } else if value <= dist.p25 {
        25.0
    } else if value <= dist.median {
        interpolate(value, dist.p25, dist.median, 25.0)
    } else if value <= dist.p75 {
        interpolate(value, dist.median, dist.p75, 50.0)
    } else if value >= dist.max {
        100.0
    } else {
        interpolate(value, dist.p75, dist.max, 75.0)
    };
    rank.clamp(0.0, 100.0)
}

/// Linear position of `value` in `(lower, upper]`, mapped onto
/// `base..=base + 25`.
fn interpolate(value: f64, lower: f64, upper: f64, base: f64) -> f64 {
    let width = upper - lower;
    if width <= 0.0 {
        return base + 25.0;
    }
    base + (value - lower) / width * 25.0
}

/// Maps a player id to a stable pseudonym of the form `player_<digits>`.
///
/// Uses 64-bit FNV-1a, so the mapping is identical across runs and platforms.
///
/// ```
/// use stride_analysis::benchmark::anonymize_player_id;
///
/// let a = anonymize_player_id("alice");
/// assert_eq!(a, anonymize_player_id("alice"));
/// assert_ne!(a, anonymize_player_id("bob"));
/// assert!(a.starts_with("player_"));
/// ```
#[must_use]
pub fn anonymize_player_id(player_id: &str) -> String {
    let mut hasher = Fnv1a::default();
    hasher.write(player_id.as_bytes());
    format!("player_{}", hasher.finish())
}

/// 64-bit FNV-1a.
struct Fnv1a(u64);

impl Default for Fnv1a {
    fn default() -> Self {
        Self(0xcbf2_9ce4_8422_2325)
    }
}

impl Hasher for Fnv1a {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 ^= u64::from(byte);
            self.0 = self.0.wrapping_mul(0x0100_0000_01b3);
        }
    }
}

/// Per-player aggregates keyed by anonymized player id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPopulation {
    pub players: BTreeMap<String, AggregateMetrics>,
}

impl PlayerPopulation {
    /// Groups `sessions` by player and aggregates each player.
    ///
    /// Sessions of `exclude_player` and sessions without a player id are left
    /// out.
    #[must_use]
    pub fn from_sessions(sessions: &[SessionRecord], exclude_player: Option<&str>) -> Self {
        let players = group_by_player(sessions)
            .into_iter()
            .filter(|(player_id, _)| Some(*player_id) != exclude_player)
            .map(|(player_id, sessions)| {
                (
                    anonymize_player_id(player_id),
                    AggregateMetrics::from_sessions(sessions),
                )
            })
            .collect();
        Self { players }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Aggregates in anonymized-id order.
    #[must_use]
    pub fn metrics(&self) -> Vec<AggregateMetrics> {
        self.players.values().copied().collect()
    }
}

/// A shareable, read-mostly slot holding the last benchmark built.
///
/// The snapshot is keyed by a fingerprint of the population and metric keys
/// it was built from. A lookup with a different fingerprint rebuilds and
/// swaps the snapshot; readers holding the previous `Arc` keep it unchanged.
#[derive(Debug, Default)]
pub struct BenchmarkCache {
    slot: RwLock<Option<CachedBenchmark>>,
}

#[derive(Debug)]
struct CachedBenchmark {
    fingerprint: u64,
    statistics: Arc<BenchmarkStatistics>,
}

impl BenchmarkCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached benchmark for this population, building it with
    /// `build` when the population changed or nothing is cached.
    pub fn get_or_build<F>(
        &self,
        population: &[AggregateMetrics],
        keys: &[MetricKey],
        build: F,
    ) -> Arc<BenchmarkStatistics>
    where
        F: FnOnce() -> BenchmarkStatistics,
    {
        let fingerprint = fingerprint(population, keys);
        if let Some(cached) = self.slot.read().as_ref()
            && cached.fingerprint == fingerprint
        {
            return Arc::clone(&cached.statistics);
        }

        debug!(fingerprint, "benchmark cache miss, rebuilding");
        let statistics = Arc::new(build());
        *self.slot.write() = Some(CachedBenchmark {
            fingerprint,
            statistics: Arc::clone(&statistics),
        });
        statistics
    }

    /// The current snapshot, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<BenchmarkStatistics>> {
        self.slot
            .read()
            .as_ref()
            .map(|cached| Arc::clone(&cached.statistics))
    }

    /// Drops the snapshot so the next lookup rebuilds.
    pub fn invalidate(&self) {
        *self.slot.write() = None;
    }
}

/// FNV-1a over the metric keys and the bit patterns of every aggregate.
fn fingerprint(population: &[AggregateMetrics], keys: &[MetricKey]) -> u64 {
    let mut hasher = Fnv1a::default();
    keys.hash(&mut hasher);
    for metrics in population {
        metrics.session_count.hash(&mut hasher);
        for key in MetricKey::ALL {
            metrics.get(key).map(f64::to_bits).hash(&mut hasher);
        }
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};
    use rand_pcg::Pcg64;

    use super::*;

    fn population_of_scores(scores: &[f64]) -> Vec<AggregateMetrics> {
        scores
            .iter()
            .map(|&score| AggregateMetrics {
                session_count: 2,
                score: Some(score),
                ..AggregateMetrics::default()
            })
            .collect()
    }

    fn distribution(min: f64, p25: f64, median: f64, p75: f64, max: f64) -> MetricDistribution {
        MetricDistribution {
            min,
            p25,
            median,
            p75,
            max,
            mean: median,
            std_dev: 0.0,
            count: 5,
            mean_interval: MeanInterval {
                lower: median,
                upper: median,
                margin: 0.0,
            },
            outliers_removed: 0,
        }
    }

    #[test]
    fn test_build_quartiles() {
        let config = BenchmarkConfig::default();
        let population = population_of_scores(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let benchmark = BenchmarkBuilder::new(&config).build(&population, &[MetricKey::Score]);

        let score = &benchmark.metrics[&MetricKey::Score];
        assert_eq!(score.min, 10.0);
        assert_eq!(score.p25, 20.0);
        assert_eq!(score.median, 30.0);
        assert_eq!(score.p75, 40.0);
        assert_eq!(score.max, 50.0);
        assert_eq!(score.mean, 30.0);
        assert!((score.std_dev - 200.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(score.count, 5);
        let margin = 1.96 * score.std_dev / 5.0_f64.sqrt();
        assert!((score.mean_interval.margin - margin).abs() < 1e-12);
        assert!(score.mean_interval.lower < 30.0 && 30.0 < score.mean_interval.upper);

        assert_eq!(benchmark.player_count, 5);
        assert_eq!(benchmark.total_sessions, 10);
        assert_eq!(benchmark.average_sessions_per_player, 2.0);
    }

    #[test]
    fn test_metric_without_values_is_skipped() {
        let config = BenchmarkConfig::default();
        let population = population_of_scores(&[10.0, 20.0]);
        let benchmark = BenchmarkBuilder::new(&config)
            .build(&population, &[MetricKey::Score, MetricKey::Accuracy]);
        assert!(benchmark.metrics.contains_key(&MetricKey::Score));
        assert!(!benchmark.metrics.contains_key(&MetricKey::Accuracy));
    }

    #[test]
    fn test_empty_population() {
        let config = BenchmarkConfig::default();
        let benchmark = BenchmarkBuilder::new(&config).build(&[], &MetricKey::ALL);
        assert!(benchmark.metrics.is_empty());
        assert_eq!(benchmark.average_sessions_per_player, 0.0);
        assert_eq!(benchmark.quality.rating, QualityRating::Poor);
        assert!(!benchmark.quality.reliable);
    }

    #[test]
    fn test_quality_bands() {
        let config = BenchmarkConfig::default();
        let builder = BenchmarkBuilder::new(&config);
        let check = |n, rating, confidence, reliable| {
            let quality = builder.assess_quality(n);
            assert_eq!(quality.rating, rating, "n = {n}");
            assert_eq!(quality.confidence, confidence, "n = {n}");
            assert_eq!(quality.reliable, reliable, "n = {n}");
        };
        check(2, QualityRating::Poor, 0.5, false);
        check(3, QualityRating::Poor, 0.5, true);
        check(9, QualityRating::Poor, 0.5, true);
        check(10, QualityRating::Fair, 0.75, true);
        check(29, QualityRating::Fair, 0.75, true);
        check(30, QualityRating::Good, 0.9, true);
        check(99, QualityRating::Good, 0.9, true);
        check(100, QualityRating::Excellent, 0.95, true);
    }

    #[test]
    fn test_percentile_rank_segments() {
        let dist = distribution(500.0, 800.0, 1000.0, 1200.0, 1500.0);
        assert_eq!(percentile_rank(400.0, &dist), 0.0);
        assert_eq!(percentile_rank(700.0, &dist), 25.0);
        assert_eq!(percentile_rank(900.0, &dist), 37.5);
        assert_eq!(percentile_rank(1100.0, &dist), 62.5);
        assert_eq!(percentile_rank(1200.0, &dist), 75.0);
        assert_eq!(percentile_rank(1350.0, &dist), 87.5);
        assert_eq!(percentile_rank(2000.0, &dist), 100.0);
    }

    #[test]
    fn test_percentile_rank_degenerate_segments() {
        // Collapsed quartiles must not divide by zero.
        let dist = distribution(0.0, 10.0, 10.0, 10.0, 20.0);
        assert_eq!(percentile_rank(10.0, &dist), 25.0);
        assert_eq!(percentile_rank(15.0, &dist), 87.5);

        let flat = distribution(5.0, 5.0, 5.0, 5.0, 5.0);
        assert_eq!(percentile_rank(5.0, &flat), 0.0);
        assert_eq!(percentile_rank(6.0, &flat), 100.0);

        // Upper quartiles tied with the maximum: the `p25` clamp wins.
        let capped = distribution(0.5, 1.0, 1.0, 1.0, 1.0);
        assert_eq!(percentile_rank(1.0, &capped), 25.0);
        assert_eq!(percentile_rank(1.5, &capped), 100.0);
    }

    #[test]
    fn test_rank_at_tied_upper_quartiles() {
        let config = BenchmarkConfig::default();
        let population = [0.5, 1.0, 1.0, 1.0, 1.0]
            .map(|rate| AggregateMetrics {
                session_count: 4,
                completion_rate: Some(rate),
                ..AggregateMetrics::default()
            })
            .to_vec();
        let benchmark =
            BenchmarkBuilder::new(&config).build(&population, &[MetricKey::CompletionRate]);
        let rate = &benchmark.metrics[&MetricKey::CompletionRate];
        assert_eq!((rate.min, rate.p25, rate.max), (0.5, 1.0, 1.0));

        assert_eq!(percentile_rank(1.0, rate), 25.0);
        assert_eq!(percentile_rank(0.75, rate), 25.0);
        assert_eq!(percentile_rank(0.5, rate), 0.0);
    }

    #[test]
    fn test_median_of_symmetric_population_ranks_fifty() {
        let mut rng = Pcg64::seed_from_u64(0x0bad_5eed);
        let normal = Normal::new(1000.0, 150.0).unwrap();
        let scores = (0..501).map(|_| normal.sample(&mut rng)).collect::<Vec<_>>();

        let config = BenchmarkConfig::default();
        let benchmark =
            BenchmarkBuilder::new(&config).build(&population_of_scores(&scores), &[MetricKey::Score]);
        let score = &benchmark.metrics[&MetricKey::Score];

        assert!((percentile_rank(score.median, score) - 50.0).abs() < 1e-9);
        // The mean of a symmetric sample sits next to its median.
        assert!((percentile_rank(score.mean, score) - 50.0).abs() < 5.0);
    }

    #[test]
    fn test_outlier_rejection() {
        let mut scores = vec![1000.0; 19];
        scores.push(50_000.0);
        let population = population_of_scores(&scores);
        let config = BenchmarkConfig::default();

        let raw = BenchmarkBuilder::new(&config).build(&population, &[MetricKey::Score]);
        assert_eq!(raw.metrics[&MetricKey::Score].max, 50_000.0);

        let cleaned = BenchmarkBuilder::new(&config)
            .with_outlier_rejection(true)
            .build(&population, &[MetricKey::Score]);
        let score = &cleaned.metrics[&MetricKey::Score];
        assert_eq!(score.max, 1000.0);
        assert_eq!(score.count, 19);
        assert_eq!(score.outliers_removed, 1);
        // Quality reflects the population, not the cleaned sample.
        assert_eq!(cleaned.player_count, 20);
    }

    #[test]
    fn test_population_excludes_subject() {
        let session = |player: &str, score| {
            let mut record = SessionRecord::new(0, score);
            record.player_id = Some(player.to_owned());
            record
        };
        let sessions = vec![
            session("alice", 100.0),
            session("alice", 300.0),
            session("bob", 500.0),
            session("carol", 700.0),
            SessionRecord::new(0, 900.0),
        ];

        let population = PlayerPopulation::from_sessions(&sessions, Some("carol"));
        assert_eq!(population.len(), 2);
        assert!(population.players.contains_key(&anonymize_player_id("alice")));
        assert!(!population.players.contains_key(&anonymize_player_id("carol")));
        assert_eq!(
            population.players[&anonymize_player_id("alice")].score,
            Some(200.0)
        );
        assert!(population.players.keys().all(|id| !id.contains("alice")));
    }

    #[test]
    fn test_fnv1a_known_vector() {
        let mut hasher = Fnv1a::default();
        hasher.write(b"a");
        assert_eq!(hasher.finish(), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_cache_reuses_until_population_changes() {
        let config = BenchmarkConfig::default();
        let builder = BenchmarkBuilder::new(&config);
        let cache = BenchmarkCache::new();
        let builds = AtomicUsize::new(0);
        let keys = [MetricKey::Score];

        let population = population_of_scores(&[1.0, 2.0, 3.0]);
        let build = |population: &[AggregateMetrics]| {
            builds.fetch_add(1, Ordering::Relaxed);
            builder.build(population, &keys)
        };

        let first = cache.get_or_build(&population, &keys, || build(&population));
        let second = cache.get_or_build(&population, &keys, || build(&population));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::Relaxed), 1);

        let grown = population_of_scores(&[1.0, 2.0, 3.0, 4.0]);
        let third = cache.get_or_build(&grown, &keys, || build(&grown));
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.player_count, 4);
        // The earlier snapshot is untouched.
        assert_eq!(first.player_count, 3);

        cache.invalidate();
        assert!(cache.current().is_none());
        cache.get_or_build(&grown, &keys, || build(&grown));
        assert_eq!(builds.load(Ordering::Relaxed), 3);
    }
}
