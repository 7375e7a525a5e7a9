//! Per-stage aggregation, grading and ranking.
//!
//! Sessions tagged with a stage id are grouped per stage. Each stage gets a
//! [`StageAggregate`] (metrics, consistency, attempts to complete and the
//! [`StageLearning`] curve), a [`StageGrade`], and a [`StageComparison`] of
//! its current window against the preceding one. [`rank_stages`] orders the
//! resulting [`StageReport`]s.

use serde::{Deserialize, Serialize};
use stride_stats::{descriptive, trend::LinearTrend};

use crate::{
    comparison::{Comparator, StageComparison},
    grading::{
        Grade, PerformanceGrader, StageGrade, average_attempts_to_complete, consistency_score,
    },
    metric::MetricKey,
    session::{
        AggregateMetrics, ComparisonPeriod, SessionRecord, group_by_stage, split_by_period,
    },
};

/// The input block the grader scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageAggregate {
    pub stage_id: String,
    pub metrics: AggregateMetrics,
    /// Score consistency; present once the stage has two or more sessions.
    pub consistency: Option<f64>,
    /// Present once the stage has at least one session.
    pub attempts_to_complete: Option<f64>,
    #[serde(default)]
    pub learning: StageLearning,
}

impl StageAggregate {
    #[must_use]
    pub fn from_sessions(stage_id: &str, sessions: &[&SessionRecord]) -> Self {
        let scores = sessions.iter().map(|s| s.score).collect::<Vec<_>>();
        Self {
            stage_id: stage_id.to_owned(),
            metrics: AggregateMetrics::from_sessions(sessions.iter().copied()),
            consistency: (scores.len() >= 2).then(|| consistency_score(&scores)),
            attempts_to_complete: (!sessions.is_empty())
                .then(|| average_attempts_to_complete(sessions)),
            learning: StageLearning::from_sessions(sessions),
        }
    }
}

/// Plays at the end of the history the improvement trend is fitted over.
const TREND_WINDOW: usize = 10;
/// Fewest plays that have a trend.
const TREND_MIN_PLAYS: usize = 3;
/// Points per play a fitted slope must exceed to count as a trend.
const TREND_SLOPE: f64 = 50.0;
const MASTERY_WINDOW: usize = 5;
const PLATEAU_WINDOW: usize = 10;
/// Coefficient of variation below which recent scores count as flat.
const PLATEAU_VARIATION: f64 = 0.1;
const PLATEAU_CONFIDENT: f64 = 0.8;
const PLATEAU_UNSURE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementTrend {
    Improving,
    Declining,
    Stable,
    #[default]
    InsufficientData,
}

impl ImprovementTrend {
    /// Classifies the least-squares slope of the last [`TREND_WINDOW`] scores.
    ///
    /// Returns the slope alongside, or `None` below [`TREND_MIN_PLAYS`] plays.
    fn fit(scores: &[f64]) -> (Self, Option<f64>) {
        if scores.len() < TREND_MIN_PLAYS {
            return (Self::InsufficientData, None);
        }
        let slope = LinearTrend::fit(recent(scores, TREND_WINDOW)).slope;
        let trend = if slope > TREND_SLOPE {
            Self::Improving
        } else if slope < -TREND_SLOPE {
            Self::Declining
        } else {
            Self::Stable
        };
        (trend, Some(slope))
    }
}

/// Whether recent scores have stopped moving.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plateau {
    /// Low variation and no trend over the last ten plays.
    pub on_plateau: bool,
    pub confidence: f64,
    /// Standard deviation over mean of the recent scores.
    pub variation_coefficient: Option<f64>,
    pub trend: ImprovementTrend,
}

impl Plateau {
    fn detect(scores: &[f64]) -> Self {
        if scores.len() < PLATEAU_WINDOW {
            return Self::default();
        }
        let window = recent(scores, PLATEAU_WINDOW);
        let mean = descriptive::mean(window);
        let variation = if mean > 0.0 {
            descriptive::std_dev(window) / mean
        } else {
            0.0
        };
        let flat = variation < PLATEAU_VARIATION;
        let (trend, _) = ImprovementTrend::fit(window);
        Self {
            on_plateau: flat && trend == ImprovementTrend::Stable,
            confidence: if flat { PLATEAU_CONFIDENT } else { PLATEAU_UNSURE },
            variation_coefficient: Some(variation),
            trend,
        }
    }
}

/// How a player's results on one stage develop over successive plays.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageLearning {
    pub improvement_trend: ImprovementTrend,
    /// Fitted score change per play.
    pub trend_slope: Option<f64>,
    /// Mean score change from one play to the next; `0.0` below three plays.
    pub learning_rate: f64,
    /// Mean of recent accuracy and recent consistency, in `[0, 1]`.
    pub mastery_level: f64,
    pub plateau: Plateau,
}

impl StageLearning {
    /// Sessions may come in any order; they are replayed by start time.
    ///
    /// Mastery covers the last five plays. Plays without an accuracy are left
    /// out of its accuracy half; with none reporting one, mastery is the
    /// consistency alone.
    #[must_use]
    pub fn from_sessions(sessions: &[&SessionRecord]) -> Self {
        let mut ordered = sessions.to_vec();
        ordered.sort_by_key(|session| session.start_time);
        let scores = ordered.iter().map(|s| s.score).collect::<Vec<_>>();

        let (improvement_trend, trend_slope) = ImprovementTrend::fit(&scores);
        let learning_rate = if scores.len() < TREND_MIN_PLAYS {
            0.0
        } else {
            let steps = scores.windows(2).map(|w| w[1] - w[0]).collect::<Vec<_>>();
            descriptive::mean(&steps)
        };

        let last = &ordered[ordered.len().saturating_sub(MASTERY_WINDOW)..];
        let mastery_level = if last.is_empty() {
            0.0
        } else {
            let consistency = consistency_score(recent(&scores, MASTERY_WINDOW));
            let accuracies = last.iter().filter_map(|s| s.accuracy).collect::<Vec<_>>();
            if accuracies.is_empty() {
                consistency
            } else {
                (descriptive::mean(&accuracies) + consistency) / 2.0
            }
        };

        Self {
            improvement_trend,
            trend_slope,
            learning_rate,
            mastery_level,
            plateau: Plateau::detect(&scores),
        }
    }
}

fn recent(values: &[f64], window: usize) -> &[f64] {
    &values[values.len().saturating_sub(window)..]
}

/// Everything known about one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageReport {
    pub stage: StageAggregate,
    pub grade: StageGrade,
    pub comparison: StageComparison,
}

impl StageReport {
    #[must_use]
    pub fn stage_id(&self) -> &str {
        &self.stage.stage_id
    }
}

/// Builds a report for every stage played up to `now`.
///
/// The grade covers all of a stage's sessions up to `now`; the comparison
/// covers the current window of `period` against the preceding one.
#[must_use]
pub fn analyze_stages<'a, I>(
    sessions: I,
    now: i64,
    period: ComparisonPeriod,
    keys: &[MetricKey],
    comparator: &Comparator<'_>,
    grader: &PerformanceGrader,
) -> Vec<StageReport>
where
    I: IntoIterator<Item = &'a SessionRecord>,
{
    let played = sessions.into_iter().filter(|s| s.start_time <= now);
    group_by_stage(played)
        .into_iter()
        .map(|(stage_id, stage_sessions)| {
            let stage = StageAggregate::from_sessions(stage_id, &stage_sessions);
            let windows = split_by_period(stage_sessions.iter().copied(), now, period);
            StageReport {
                grade: grader.grade_stage(&stage),
                comparison: comparator.compare_stage(
                    &windows.current_metrics(),
                    &windows.past_metrics(),
                    keys,
                ),
                stage,
            }
        })
        .collect()
}

/// One row of a [`StageRanking`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedStage {
    pub stage_id: String,
    pub score: f64,
    pub grade: Grade,
    pub difficulty: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRanking {
    /// Stages by descending grade score; ties keep stage-id order.
    pub stages: Vec<RankedStage>,
    pub best_performing_stage: Option<String>,
    /// Stage with the highest estimated difficulty.
    pub most_difficult_stage: Option<String>,
}

/// Orders stages by grade score and picks out the best and the hardest.
#[must_use]
pub fn rank_stages(reports: &[StageReport]) -> StageRanking {
    let mut stages = reports
        .iter()
        .map(|report| RankedStage {
            stage_id: report.stage_id().to_owned(),
            score: report.grade.score,
            grade: report.grade.grade,
            difficulty: report.comparison.difficulty.map(|d| d.score),
        })
        .collect::<Vec<_>>();
    stages.sort_by(|a, b| b.score.total_cmp(&a.score));

    let best_performing_stage = stages.first().map(|s| s.stage_id.clone());
    // `max_by_key` keeps the last maximum; reversing makes ties go to the
    // better-scoring stage.
    let most_difficult_stage = stages
        .iter()
        .rev()
        .filter(|s| s.difficulty.is_some())
        .max_by_key(|s| s.difficulty)
        .map(|s| s.stage_id.clone());

    StageRanking {
        stages,
        best_performing_stage,
        most_difficult_stage,
    }
}
