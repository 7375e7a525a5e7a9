use serde::{Deserialize, Serialize};

use super::{AreaSource, DifficultyPreference, InsightEngine, PerformanceArea, Priority};
use crate::metric::MetricKey;

/// Number of weak areas turned into actions.
const MAX_ACTIONS: usize = 3;
/// Number of strong areas turned into leverage actions.
const MAX_LEVERAGE: usize = 3;
/// Horizons up to this many days put follow-up actions in the short term.
const SHORT_TERM_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffortLevel {
    Low,
    Medium,
    High,
}

/// A practice action addressing one weak area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub metric: MetricKey,
    pub source: AreaSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_id: Option<String>,
    pub title: String,
    pub priority: Priority,
    /// Amount to add to the current value.
    pub target_improvement: f64,
    pub target_value: f64,
    /// `target_value` rendered with the metric's unit.
    pub target_display: String,
    pub effort: EffortLevel,
    pub sessions_per_week: u32,
    pub practices: Vec<String>,
}

/// An action that carries a strength over to other areas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverageAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<MetricKey>,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlan {
    pub immediate: Vec<Action>,
    pub short_term: Vec<Action>,
    pub long_term: Vec<Action>,
    pub leverage: Vec<LeverageAction>,
}

impl ActionPlan {
    /// All weak-area actions, most urgent first.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.immediate
            .iter()
            .chain(&self.short_term)
            .chain(&self.long_term)
    }
}

impl InsightEngine<'_> {
    /// Spreads the top three weak areas over the plan and derives leverage
    /// actions from the strong ones.
    ///
    /// The first weak area is immediate. The others are short term when the
    /// horizon is at most a week, long term otherwise.
    #[must_use]
    pub fn build_action_plan(
        &self,
        weak_areas: &[PerformanceArea],
        strong_areas: &[PerformanceArea],
        preference: DifficultyPreference,
        time_horizon: u32,
    ) -> ActionPlan {
        let mut plan = ActionPlan::default();
        for (index, area) in weak_areas.iter().take(MAX_ACTIONS).enumerate() {
            let action = self.action(area, preference);
            match index {
                0 => plan.immediate.push(action),
                _ if time_horizon <= SHORT_TERM_DAYS => plan.short_term.push(action),
                _ => plan.long_term.push(action),
            }
        }

        plan.leverage = strong_areas
            .iter()
            .take(MAX_LEVERAGE)
            .map(|area| self.leverage_action(area))
            .collect();
        if plan.leverage.is_empty() {
            plan.leverage.push(LeverageAction {
                metric: None,
                title: "Maintain consistency".to_owned(),
                description: "Keep a regular practice schedule to hold your current level"
                    .to_owned(),
            });
        }
        plan
    }

    /// Amount an action aims to add to the current value.
    ///
    /// - benchmark: a share of the gap to the population mean
    /// - past: the full decline
    /// - stage: a flat percentage of the current value
    #[must_use]
    pub fn target_improvement(&self, area: &PerformanceArea) -> f64 {
        match area.source {
            AreaSource::Benchmark => {
                self.config.benchmark_gap_share * (area.reference_value - area.current_value).max(0.0)
            }
            AreaSource::Past => (area.reference_value - area.current_value).max(0.0),
            AreaSource::Stage => area.current_value.abs() * self.config.default_target_percent / 100.0,
        }
    }

    /// `priority level * preference multiplier`, banded into an effort level.
    #[must_use]
    pub fn estimate_effort(&self, priority: Priority, preference: DifficultyPreference) -> EffortLevel {
        let effort = priority.level() * self.config.effort.multiplier(preference);
        if effort < self.config.effort.low_band {
            EffortLevel::Low
        } else if effort < self.config.effort.medium_band {
            EffortLevel::Medium
        } else {
            EffortLevel::High
        }
    }

    fn action(&self, area: &PerformanceArea, preference: DifficultyPreference) -> Action {
        let name = self.catalog.display_name(area.metric);
        let title = match (area.source, area.stage_id.as_deref()) {
            (AreaSource::Past, _) => format!("Recover your {}", name.to_lowercase()),
            (AreaSource::Benchmark, _) => {
                format!("Close the {} gap to other players", name.to_lowercase())
            }
            (AreaSource::Stage, Some(stage)) => format!("Improve {} on {stage}", name.to_lowercase()),
            (AreaSource::Stage, None) => format!("Improve {}", name.to_lowercase()),
        };

        let target_improvement = self.target_improvement(area);
        let target_value = area.current_value + target_improvement;
        let target_display = self
            .catalog
            .get(area.metric)
            .map_or_else(|| format!("{target_value:.2}"), |def| def.format(target_value));

        Action {
            metric: area.metric,
            source: area.source,
            stage_id: area.stage_id.clone(),
            title,
            priority: area.priority,
            target_improvement,
            target_value,
            target_display,
            effort: self.estimate_effort(area.priority, preference),
            sessions_per_week: self.config.effort.sessions_per_week.for_preference(preference),
            practices: self
                .templates
                .get(area.metric)
                .practices
                .iter()
                .map(|&p| p.to_owned())
                .collect(),
        }
    }

    fn leverage_action(&self, area: &PerformanceArea) -> LeverageAction {
        let name = self.catalog.display_name(area.metric);
        LeverageAction {
            metric: Some(area.metric),
            title: format!("Build on your {}", name.to_lowercase()),
            description: self.templates.get(area.metric).leverage.to_owned(),
        }
    }
}
