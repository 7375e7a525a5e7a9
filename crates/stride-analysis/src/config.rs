//! Tunable thresholds for the analysis engine.
//!
//! [`EngineConfig`] gathers every constant the comparator, benchmark builder,
//! grader and insight engine consult. It is constructed once (usually
//! [`EngineConfig::default`] or deserialized from JSON) and handed to each
//! component by reference.
//!
//! Every field has a default, so a partial JSON document only overrides the
//! keys it names:
//!
//! ```
//! use stride_analysis::config::EngineConfig;
//!
//! let config: EngineConfig =
//!     serde_json::from_str(r#"{ "comparison": { "changePercent": 8.0 } }"#).unwrap();
//! assert_eq!(config.comparison.change_percent, 8.0);
//! assert_eq!(config.comparison.above_average_rank, 75.0);
//! config.validate().unwrap();
//! ```
//!
//! Grade boundaries (60/70/80/90) are fixed and live in
//! [`grading`](crate::grading).

use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    insight::{DifficultyPreference, Priority},
    metric::MetricKey,
};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub comparison: ComparisonThresholds,
    pub benchmark: BenchmarkConfig,
    pub insight: InsightConfig,
}

impl EngineConfig {
    /// Checks that thresholds are finite, non-negative and correctly ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.comparison.validate()?;
        self.benchmark.validate()?;
        self.insight.validate()?;
        Ok(())
    }
}

/// Classification thresholds shared by all comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComparisonThresholds {
    /// A change larger than this percentage (in absolute value) is a trend.
    pub change_percent: f64,
    /// Percentile rank at or below which a metric is below average.
    pub below_average_rank: f64,
    /// Percentile rank at or above which a metric is above average.
    pub above_average_rank: f64,
}

impl Default for ComparisonThresholds {
    fn default() -> Self {
        Self {
            change_percent: 5.0,
            below_average_rank: 25.0,
            above_average_rank: 75.0,
        }
    }
}

impl ComparisonThresholds {
    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("comparison.changePercent", self.change_percent)?;
        rank("comparison.belowAverageRank", self.below_average_rank)?;
        rank("comparison.aboveAverageRank", self.above_average_rank)?;
        ordered(
            "comparison.belowAverageRank/aboveAverageRank",
            self.below_average_rank,
            self.above_average_rank,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BenchmarkConfig {
    /// Sample size at which a benchmark is considered reliable.
    pub min_sample_size: usize,
    /// Z-score threshold used when outlier rejection is enabled.
    pub outlier_sigma: f64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            min_sample_size: 3,
            outlier_sigma: stride_stats::outliers::DEFAULT_THRESHOLD_SIGMA,
        }
    }
}

impl BenchmarkConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("benchmark.outlierSigma", self.outlier_sigma)
    }
}

/// Thresholds and tables used to derive weak/strong areas and the action plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InsightConfig {
    /// A past decline steeper than this percentage is a weak area.
    pub weak_change_percent: f64,
    /// A past improvement larger than this percentage is a strong area.
    pub strong_change_percent: f64,
    /// Benchmark ranks below this value are weak areas.
    pub weak_rank: f64,
    /// Benchmark ranks above this value are strong areas.
    pub strong_rank: f64,
    pub priority_weights: PriorityWeights,
    pub priority_bands: PriorityBands,
    pub stage_thresholds: StageThresholds,
    pub effort: EffortConfig,
    pub projection: ProjectionConfig,
    /// Target improvement, as a percentage of the current value, when no
    /// benchmark gap or past decline is available.
    pub default_target_percent: f64,
    /// Share of the benchmark gap an action aims to close.
    pub benchmark_gap_share: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            weak_change_percent: 10.0,
            strong_change_percent: 10.0,
            weak_rank: 25.0,
            strong_rank: 75.0,
            priority_weights: PriorityWeights::default(),
            priority_bands: PriorityBands::default(),
            stage_thresholds: StageThresholds::default(),
            effort: EffortConfig::default(),
            projection: ProjectionConfig::default(),
            default_target_percent: 10.0,
            benchmark_gap_share: 0.5,
        }
    }
}

impl InsightConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("insight.weakChangePercent", self.weak_change_percent)?;
        non_negative("insight.strongChangePercent", self.strong_change_percent)?;
        rank("insight.weakRank", self.weak_rank)?;
        rank("insight.strongRank", self.strong_rank)?;
        ordered("insight.weakRank/strongRank", self.weak_rank, self.strong_rank)?;
        for key in MetricKey::ALL {
            non_negative("insight.priorityWeights", self.priority_weights.weight(key))?;
        }
        non_negative("insight.priorityBands.medium", self.priority_bands.medium)?;
        ordered(
            "insight.priorityBands",
            self.priority_bands.medium,
            self.priority_bands.high,
        )?;
        self.stage_thresholds.validate()?;
        self.effort.validate()?;
        self.projection.validate()?;
        non_negative("insight.defaultTargetPercent", self.default_target_percent)?;
        non_negative("insight.benchmarkGapShare", self.benchmark_gap_share)
    }
}

/// Per-metric multipliers applied to a change percentage to obtain a
/// priority score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PriorityWeights {
    pub score: f64,
    pub accuracy: f64,
    pub play_time: f64,
    pub completion_rate: f64,
    pub max_combo: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            score: 3.0,
            accuracy: 2.0,
            play_time: 1.0,
            completion_rate: 2.0,
            max_combo: 1.0,
        }
    }
}

impl PriorityWeights {
    #[must_use]
    pub fn weight(&self, key: MetricKey) -> f64 {
        match key {
            MetricKey::Score => self.score,
            MetricKey::Accuracy => self.accuracy,
            MetricKey::PlayTime => self.play_time,
            MetricKey::CompletionRate => self.completion_rate,
            MetricKey::MaxCombo => self.max_combo,
        }
    }
}

/// Priority score cut-offs: `>= high` is high, `>= medium` is medium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PriorityBands {
    pub high: f64,
    pub medium: f64,
}

impl Default for PriorityBands {
    fn default() -> Self {
        Self {
            high: 30.0,
            medium: 15.0,
        }
    }
}

impl PriorityBands {
    #[must_use]
    pub fn classify(&self, priority_score: f64) -> Priority {
        if priority_score >= self.high {
            Priority::High
        } else if priority_score >= self.medium {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

/// Reference values a struggling stage is measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StageThresholds {
    pub completion_rate: f64,
    pub accuracy: f64,
    pub score: f64,
}

impl Default for StageThresholds {
    fn default() -> Self {
        Self {
            completion_rate: 0.5,
            accuracy: 0.7,
            score: 1000.0,
        }
    }
}

impl StageThresholds {
    /// The metrics with a stage threshold, paired with that threshold.
    #[must_use]
    pub fn entries(&self) -> [(MetricKey, f64); 3] {
        [
            (MetricKey::CompletionRate, self.completion_rate),
            (MetricKey::Accuracy, self.accuracy),
            (MetricKey::Score, self.score),
        ]
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, threshold) in self.entries() {
            non_negative(stage_threshold_name(key), threshold)?;
        }
        Ok(())
    }
}

fn stage_threshold_name(key: MetricKey) -> &'static str {
    match key {
        MetricKey::CompletionRate => "insight.stageThresholds.completionRate",
        MetricKey::Accuracy => "insight.stageThresholds.accuracy",
        _ => "insight.stageThresholds.score",
    }
}

/// Effort estimation: `priority level * multiplier`, banded into low, medium
/// and high.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EffortConfig {
    pub low_multiplier: f64,
    pub medium_multiplier: f64,
    pub high_multiplier: f64,
    /// Efforts below this value are low.
    pub low_band: f64,
    /// Efforts below this value (and not low) are medium.
    pub medium_band: f64,
    /// Practice sessions per week, per difficulty preference.
    pub sessions_per_week: SessionsPerWeek,
}

impl Default for EffortConfig {
    fn default() -> Self {
        Self {
            low_multiplier: 0.7,
            medium_multiplier: 1.0,
            high_multiplier: 1.5,
            low_band: 1.5,
            medium_band: 3.0,
            sessions_per_week: SessionsPerWeek::default(),
        }
    }
}

impl EffortConfig {
    #[must_use]
    pub fn multiplier(&self, preference: DifficultyPreference) -> f64 {
        match preference {
            DifficultyPreference::Low => self.low_multiplier,
            DifficultyPreference::Medium => self.medium_multiplier,
            DifficultyPreference::High => self.high_multiplier,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("insight.effort.lowMultiplier", self.low_multiplier)?;
        non_negative("insight.effort.mediumMultiplier", self.medium_multiplier)?;
        non_negative("insight.effort.highMultiplier", self.high_multiplier)?;
        non_negative("insight.effort.lowBand", self.low_band)?;
        ordered("insight.effort.lowBand/mediumBand", self.low_band, self.medium_band)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionsPerWeek {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
}

impl Default for SessionsPerWeek {
    fn default() -> Self {
        Self {
            low: 3,
            medium: 5,
            high: 7,
        }
    }
}

impl SessionsPerWeek {
    #[must_use]
    pub fn for_preference(&self, preference: DifficultyPreference) -> u32 {
        match preference {
            DifficultyPreference::Low => self.low,
            DifficultyPreference::Medium => self.medium,
            DifficultyPreference::High => self.high,
        }
    }
}

/// Expected improvement percentages per priority over a one-week horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectionConfig {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    /// Upper bound on the horizon scaling factor `days / 7`.
    pub max_horizon_factor: f64,
    pub base_confidence: f64,
    pub max_confidence: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            high: 20.0,
            medium: 15.0,
            low: 10.0,
            max_horizon_factor: 2.0,
            base_confidence: 0.7,
            max_confidence: 0.95,
        }
    }
}

impl ProjectionConfig {
    #[must_use]
    pub fn base_improvement(&self, priority: Priority) -> f64 {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("insight.projection.high", self.high)?;
        non_negative("insight.projection.medium", self.medium)?;
        non_negative("insight.projection.low", self.low)?;
        non_negative("insight.projection.maxHorizonFactor", self.max_horizon_factor)?;
        non_negative("insight.projection.baseConfidence", self.base_confidence)?;
        if self.max_confidence > 1.0 {
            return Err(ConfigError::InvalidValue {
                name: "insight.projection.maxConfidence",
                value: self.max_confidence,
            });
        }
        ordered(
            "insight.projection.baseConfidence/maxConfidence",
            self.base_confidence,
            self.max_confidence,
        )
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { name, value })
    }
}

fn rank(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::RankOutOfRange { name, value })
    }
}

fn ordered(name: &'static str, lower: f64, upper: f64) -> Result<(), ConfigError> {
    if lower < upper {
        Ok(())
    } else {
        Err(ConfigError::InvertedBand { name, lower, upper })
    }
}
