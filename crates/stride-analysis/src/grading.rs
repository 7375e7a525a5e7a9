//! Letter grading of per-stage performance.
//!
//! A stage block is scored as a weighted sum of its completion rate (40),
//! accuracy (30) and score consistency (30). Only the terms whose inputs are
//! present contribute, and the result is normalized to `0..=100` against the
//! weights that did contribute:
//!
//! ```text
//! score = 100 * Σ weight_i * value_i / Σ weight_i     (present terms only)
//! ```
//!
//! The grade boundaries are fixed: `>= 90` A, `>= 80` B, `>= 70` C, `>= 60` D,
//! otherwise F.
//!
//! # Examples
//!
//! ```
//! use stride_analysis::grading::{Grade, PerformanceGrader};
//!
//! let score = PerformanceGrader::normalized_score(Some(0.9), Some(0.85), Some(0.8));
//! assert!((score - 85.5).abs() < 1e-9);
//! assert_eq!(Grade::from_score(score), Grade::B);
//! ```

use serde::{Deserialize, Serialize};
use stride_stats::descriptive;

use crate::{session::SessionRecord, stage::StageAggregate};

const COMPLETION_WEIGHT: f64 = 40.0;
const ACCURACY_WEIGHT: f64 = 30.0;
const CONSISTENCY_WEIGHT: f64 = 30.0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => Self::A,
            s if s >= 80.0 => Self::B,
            s if s >= 70.0 => Self::C,
            s if s >= 60.0 => Self::D,
            _ => Self::F,
        }
    }

    /// D and F.
    #[must_use]
    pub fn is_struggling(self) -> bool {
        matches!(self, Self::D | Self::F)
    }

    /// A and B.
    #[must_use]
    pub fn is_excelling(self) -> bool {
        matches!(self, Self::A | Self::B)
    }
}

/// Qualitative observation about a stage block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum StageTrait {
    #[display("high completion rate")]
    HighCompletion,
    #[display("low completion rate")]
    LowCompletion,
    #[display("high accuracy")]
    HighAccuracy,
    #[display("low accuracy")]
    LowAccuracy,
    #[display("consistent scores")]
    Consistent,
    #[display("inconsistent scores")]
    Inconsistent,
    #[display("quick mastery")]
    QuickMastery,
    #[display("many attempts needed")]
    ManyAttempts,
}

/// Grade and observations for one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageGrade {
    /// Normalized weighted score in `0..=100`.
    pub score: f64,
    pub grade: Grade,
    pub strengths: Vec<StageTrait>,
    pub weaknesses: Vec<StageTrait>,
}

/// Cut-offs for the qualitative strength and weakness rules.
///
/// A value at or beyond the `high_*` bound is a strength; a value beyond the
/// `low_*` bound is a weakness. For attempts, fewer is better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraitThresholds {
    pub high_completion: f64,
    pub low_completion: f64,
    pub high_accuracy: f64,
    pub low_accuracy: f64,
    pub high_consistency: f64,
    pub low_consistency: f64,
    pub few_attempts: f64,
    pub many_attempts: f64,
}

impl Default for TraitThresholds {
    fn default() -> Self {
        Self {
            high_completion: 0.8,
            low_completion: 0.5,
            high_accuracy: 0.85,
            low_accuracy: 0.7,
            high_consistency: 0.7,
            low_consistency: 0.4,
            few_attempts: 3.0,
            many_attempts: 10.0,
        }
    }
}

/// Scores stage blocks into letter grades.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceGrader {
    thresholds: TraitThresholds,
}

impl PerformanceGrader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_thresholds(thresholds: TraitThresholds) -> Self {
        Self { thresholds }
    }

    #[must_use]
    pub fn grade_stage(&self, stage: &StageAggregate) -> StageGrade {
        let score = Self::normalized_score(
            stage.metrics.completion_rate,
            stage.metrics.accuracy,
            stage.consistency,
        );
        StageGrade {
            score,
            grade: Grade::from_score(score),
            strengths: self.identify_strengths(stage),
            weaknesses: self.identify_weaknesses(stage),
        }
    }

    /// Weighted score over the present terms; `0.0` when none is present.
    #[must_use]
    pub fn normalized_score(
        completion_rate: Option<f64>,
        accuracy: Option<f64>,
        consistency: Option<f64>,
    ) -> f64 {
        let terms = [
            (completion_rate, COMPLETION_WEIGHT),
            (accuracy, ACCURACY_WEIGHT),
            (consistency, CONSISTENCY_WEIGHT),
        ];
        let (score, max_score) = terms
            .into_iter()
            .filter_map(|(value, weight)| value.map(|v| (v * weight, weight)))
            .fold((0.0, 0.0), |(score, max), (s, w)| (score + s, max + w));
        if max_score <= 0.0 {
            return 0.0;
        }
        (score / max_score * 100.0).clamp(0.0, 100.0)
    }

    #[must_use]
    pub fn identify_strengths(&self, stage: &StageAggregate) -> Vec<StageTrait> {
        let t = &self.thresholds;
        let mut strengths = vec![];
        if stage.metrics.completion_rate.is_some_and(|v| v >= t.high_completion) {
            strengths.push(StageTrait::HighCompletion);
        }
        if stage.metrics.accuracy.is_some_and(|v| v >= t.high_accuracy) {
            strengths.push(StageTrait::HighAccuracy);
        }
        if stage.consistency.is_some_and(|v| v >= t.high_consistency) {
            strengths.push(StageTrait::Consistent);
        }
        if stage.attempts_to_complete.is_some_and(|v| v <= t.few_attempts) {
            strengths.push(StageTrait::QuickMastery);
        }
        strengths
    }

    #[must_use]
    pub fn identify_weaknesses(&self, stage: &StageAggregate) -> Vec<StageTrait> {
        let t = &self.thresholds;
        let mut weaknesses = vec![];
        if stage.metrics.completion_rate.is_some_and(|v| v < t.low_completion) {
            weaknesses.push(StageTrait::LowCompletion);
        }
        if stage.metrics.accuracy.is_some_and(|v| v < t.low_accuracy) {
            weaknesses.push(StageTrait::LowAccuracy);
        }
        if stage.consistency.is_some_and(|v| v < t.low_consistency) {
            weaknesses.push(StageTrait::Inconsistent);
        }
        if stage.attempts_to_complete.is_some_and(|v| v > t.many_attempts) {
            weaknesses.push(StageTrait::ManyAttempts);
        }
        weaknesses
    }
}

/// `1 - std_dev / mean` of the scores, clamped to `[0, 1]`.
///
/// Fewer than two scores, or a zero mean, yield `0.0`.
///
/// # Examples
///
/// ```
/// use stride_analysis::grading::consistency_score;
///
/// assert_eq!(consistency_score(&[500.0, 500.0, 500.0]), 1.0);
/// assert_eq!(consistency_score(&[500.0]), 0.0);
/// assert!((consistency_score(&[90.0, 110.0]) - 0.9).abs() < 1e-12);
/// ```
#[must_use]
pub fn consistency_score(scores: &[f64]) -> f64 {
    if scores.len() < 2 {
        return 0.0;
    }
    let mean = descriptive::mean(scores);
    if mean == 0.0 {
        return 0.0;
    }
    (1.0 - descriptive::std_dev(scores) / mean).clamp(0.0, 1.0)
}

/// Average number of attempts it took to complete, over completed sessions.
///
/// Sessions are ordered by start time. Each completed session counts every
/// earlier non-completed session as a failed attempt, plus one for itself.
/// With no completed session the total number of sessions is returned.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn average_attempts_to_complete(sessions: &[&SessionRecord]) -> f64 {
    let mut ordered = sessions.to_vec();
    ordered.sort_by_key(|session| session.start_time);

    let mut failed_so_far = 0_usize;
    let mut attempts = vec![];
    for session in ordered {
        if session.completed {
            attempts.push(failed_so_far + 1);
        } else {
            failed_so_far += 1;
        }
    }

    if attempts.is_empty() {
        return sessions.len() as f64;
    }
    attempts.iter().sum::<usize>() as f64 / attempts.len() as f64
}
