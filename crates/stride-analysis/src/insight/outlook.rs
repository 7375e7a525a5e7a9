use serde::{Deserialize, Serialize};

use super::{AreaSource, InsightEngine, PerformanceArea, Priority};
use crate::metric::MetricKey;

const DAYS_PER_WEEK: u32 = 7;
const CONFIDENCE_STEP: f64 = 0.1;
/// Horizons this long earn extra confidence.
const LONG_HORIZON_DAYS: u32 = 14;
/// Declines larger than this leave more room to recover.
const LARGE_DELTA_PERCENT: f64 = 20.0;

/// Projected result of working on one weak area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedOutcome {
    pub metric: MetricKey,
    pub source: AreaSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_id: Option<String>,
    pub current_value: f64,
    pub expected_improvement_percent: f64,
    pub projected_value: f64,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub timeframe_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    /// 1-based.
    pub week: u32,
    /// Day offset from the start of the plan, capped at the horizon.
    pub day: u32,
    pub tracked_metrics: Vec<MetricKey>,
    pub review_actions: Vec<String>,
}

/// When to change course, and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentRule {
    pub condition: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpSchedule {
    pub checkpoints: Vec<Checkpoint>,
    pub adjustment_rules: Vec<AdjustmentRule>,
}

impl InsightEngine<'_> {
    /// One outcome per weak area.
    ///
    /// The expected improvement is the priority's base percentage scaled by
    /// the horizon in weeks, capped at `max_horizon_factor` weeks and rounded
    /// to a whole percent.
    #[must_use]
    pub fn project_outcomes(
        &self,
        weak_areas: &[PerformanceArea],
        time_horizon: u32,
    ) -> Vec<ExpectedOutcome> {
        let projection = &self.config.projection;
        let factor =
            (f64::from(time_horizon) / f64::from(DAYS_PER_WEEK)).min(projection.max_horizon_factor);

        weak_areas
            .iter()
            .map(|area| {
                let expected = (projection.base_improvement(area.priority) * factor).round();
                ExpectedOutcome {
                    metric: area.metric,
                    source: area.source,
                    stage_id: area.stage_id.clone(),
                    current_value: area.current_value,
                    expected_improvement_percent: expected,
                    projected_value: area.current_value * (1.0 + expected / 100.0),
                    confidence: self.confidence(area, time_horizon),
                    timeframe_days: time_horizon,
                }
            })
            .collect()
    }

    /// Weekly checkpoints over the horizon plus fixed adjustment rules.
    ///
    /// Each stage in `plateaued_stages` gets a review action in the first
    /// checkpoint.
    #[must_use]
    pub fn schedule_follow_up(
        &self,
        weak_areas: &[PerformanceArea],
        plateaued_stages: &[&str],
        time_horizon: u32,
    ) -> FollowUpSchedule {
        let mut tracked_metrics = weak_areas.iter().map(|a| a.metric).collect::<Vec<_>>();
        tracked_metrics.sort_unstable();
        tracked_metrics.dedup();

        let count = time_horizon.div_ceil(DAYS_PER_WEEK);
        let checkpoints = (1..=count)
            .map(|week| {
                let mut review_actions = vec![
                    "Compare this week's sessions with the previous week".to_owned(),
                ];
                review_actions.extend(tracked_metrics.iter().map(|&metric| {
                    format!(
                        "Check progress on {}",
                        self.catalog.display_name(metric).to_lowercase()
                    )
                }));
                if week == 1 {
                    review_actions.extend(plateaued_stages.iter().map(|stage| {
                        format!("Scores on {stage} have plateaued; vary how you practice it")
                    }));
                }
                if week == count {
                    review_actions
                        .push("Run a full comparison and generate a new plan".to_owned());
                }
                Checkpoint {
                    week,
                    day: (week * DAYS_PER_WEEK).min(time_horizon),
                    tracked_metrics: tracked_metrics.clone(),
                    review_actions,
                }
            })
            .collect();

        FollowUpSchedule {
            checkpoints,
            adjustment_rules: adjustment_rules(),
        }
    }

    fn confidence(&self, area: &PerformanceArea, time_horizon: u32) -> f64 {
        let projection = &self.config.projection;
        let mut confidence = projection.base_confidence;
        if area.priority == Priority::High {
            confidence += CONFIDENCE_STEP;
        }
        if time_horizon >= LONG_HORIZON_DAYS {
            confidence += CONFIDENCE_STEP;
        }
        if area.delta_percent.abs() > LARGE_DELTA_PERCENT {
            confidence += CONFIDENCE_STEP;
        }
        confidence.min(projection.max_confidence)
    }
}

fn adjustment_rules() -> Vec<AdjustmentRule> {
    [
        (
            "No measurable improvement after two weeks",
            "Lower the difficulty and focus on a single metric",
        ),
        (
            "Improvement is ahead of the projection",
            "Raise the targets or move on to the next weak area",
        ),
        (
            "Progress has plateaued for a week",
            "Vary the stages you practice on",
        ),
    ]
    .into_iter()
    .map(|(condition, action)| AdjustmentRule {
        condition: condition.to_owned(),
        action: action.to_owned(),
    })
    .collect()
}
