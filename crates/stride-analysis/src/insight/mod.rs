//! Improvement suggestions derived from comparison results.
//!
//! The [`InsightEngine`] turns a [`ComparisonBundle`] (past comparison,
//! benchmark comparison and stage reports) into an [`ImprovementPlan`]:
//!
//! 1. **Areas** ([`InsightEngine::find_weak_areas`],
//!    [`InsightEngine::find_strong_areas`]): metrics that regressed or lag the
//!    population, and metrics that improved or lead it, each with a priority
//! 2. **Action plan** ([`InsightEngine::build_action_plan`]): the top weak areas
//!    spread over immediate, short-term and long-term actions, plus actions
//!    that leverage strengths
//! 3. **Outcomes** ([`InsightEngine::project_outcomes`]): expected improvement
//!    and confidence per weak area over the time horizon
//! 4. **Follow-up** ([`InsightEngine::schedule_follow_up`]): weekly
//!    checkpoints, including a first-week review of stages whose scores have
//!    plateaued, and adjustment rules
//! 5. **Motivation** ([`InsightEngine::build_motivation`]): encouragement,
//!    achievements and the next milestone
//!
//! # Priority
//!
//! A weak area's priority score is `weight(metric) * |change_percent|`, with
//! weights from [`PriorityWeights`](crate::config::PriorityWeights). Scores at
//! or above 30 are high, at or above 15 medium, anything else low. Areas are
//! sorted by priority level, then by the magnitude of their change.
//!
//! # Examples
//!
//! ```
//! use stride_analysis::{
//!     comparison::Comparator,
//!     config::EngineConfig,
//!     insight::{ComparisonBundle, InsightEngine, Priority, SuggestionOptions},
//!     metric::{MetricCatalog, MetricKey},
//!     session::AggregateMetrics,
//! };
//!
//! let config = EngineConfig::default();
//! let catalog = MetricCatalog::standard();
//! let comparator = Comparator::new(&catalog, &config.comparison);
//!
//! let past = AggregateMetrics { session_count: 8, score: Some(1000.0), ..Default::default() };
//! let current = AggregateMetrics { session_count: 8, score: Some(800.0), ..Default::default() };
//! let bundle = ComparisonBundle {
//!     past: Some(comparator.compare_to_past(&current, &past, &[MetricKey::Score])),
//!     ..Default::default()
//! };
//!
//! let engine = InsightEngine::new(&config.insight, &catalog);
//! let plan = engine.generate_suggestions(&bundle, &SuggestionOptions::default());
//! assert_eq!(plan.weak_areas[0].metric, MetricKey::Score);
//! assert_eq!(plan.weak_areas[0].priority, Priority::High);
//! assert_eq!(plan.action_plan.unwrap().immediate.len(), 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    benchmark::DataQuality,
    comparison::{BenchmarkComparison, PastComparison},
    config::InsightConfig,
    metric::{MetricCatalog, MetricKey},
    stage::StageReport,
};

pub use self::{
    motivation::{Motivation, OverallAssessment},
    outlook::{AdjustmentRule, Checkpoint, ExpectedOutcome, FollowUpSchedule},
    plan::{Action, ActionPlan, EffortLevel, LeverageAction},
    templates::{MetricPractice, PracticeTemplates},
};

mod areas;
mod motivation;
mod outlook;
mod plan;
mod templates;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[display("low")]
    Low,
    #[display("medium")]
    Medium,
    #[display("high")]
    High,
}

impl Priority {
    /// Numeric level used for effort estimates: 1, 2 or 3.
    #[must_use]
    pub fn level(self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 2.0,
            Self::High => 3.0,
        }
    }
}

/// How demanding the suggested practice should be.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyPreference {
    #[display("low")]
    Low,
    #[default]
    #[display("medium")]
    Medium,
    #[display("high")]
    High,
}

/// Which comparison an area was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaSource {
    Past,
    Benchmark,
    Stage,
}

/// A metric that stands out, for better or worse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceArea {
    pub metric: MetricKey,
    pub source: AreaSource,
    /// Set for stage-sourced areas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_id: Option<String>,
    pub current_value: f64,
    /// Past value, benchmark mean or stage threshold.
    pub reference_value: f64,
    /// Signed distance from the reference, in percent.
    pub delta_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile_rank: Option<f64>,
    pub priority: Priority,
    pub priority_score: f64,
}

pub type WeakArea = PerformanceArea;
pub type StrongArea = PerformanceArea;

/// The comparison results suggestions are derived from. Every part is
/// optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonBundle {
    pub past: Option<PastComparison>,
    pub benchmark: Option<BenchmarkComparison>,
    #[serde(default)]
    pub stages: Vec<StageReport>,
}

/// Which parts of an [`ImprovementPlan`] to produce, and how to scale them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[expect(clippy::struct_excessive_bools)]
pub struct SuggestionOptions {
    pub include_action_plan: bool,
    pub include_expected_outcomes: bool,
    pub include_follow_up: bool,
    pub include_motivational_elements: bool,
    /// Scales effort estimates and practice frequency.
    pub difficulty_preference: DifficultyPreference,
    /// Days the plan covers; scales projections and checkpoint counts.
    pub time_horizon: u32,
}

impl Default for SuggestionOptions {
    fn default() -> Self {
        Self {
            include_action_plan: true,
            include_expected_outcomes: true,
            include_follow_up: true,
            include_motivational_elements: true,
            difficulty_preference: DifficultyPreference::Medium,
            time_horizon: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementPlan {
    pub overall_assessment: OverallAssessment,
    pub weak_areas: Vec<WeakArea>,
    pub strong_areas: Vec<StrongArea>,
    pub action_plan: Option<ActionPlan>,
    pub expected_outcomes: Option<Vec<ExpectedOutcome>>,
    pub follow_up: Option<FollowUpSchedule>,
    pub motivation: Option<Motivation>,
    /// Quality of the benchmark used, when there was one.
    pub benchmark_quality: Option<DataQuality>,
    pub time_horizon: u32,
}

/// Derives weak/strong areas and the plan built on them.
#[derive(Debug, Clone)]
pub struct InsightEngine<'a> {
    config: &'a InsightConfig,
    catalog: &'a MetricCatalog,
    templates: PracticeTemplates,
}

impl<'a> InsightEngine<'a> {
    #[must_use]
    pub fn new(config: &'a InsightConfig, catalog: &'a MetricCatalog) -> Self {
        Self {
            config,
            catalog,
            templates: PracticeTemplates::standard(),
        }
    }

    #[must_use]
    pub fn templates(&self) -> &PracticeTemplates {
        &self.templates
    }

    /// Runs the whole pipeline, skipping the parts `options` turns off.
    #[must_use]
    pub fn generate_suggestions(
        &self,
        bundle: &ComparisonBundle,
        options: &SuggestionOptions,
    ) -> ImprovementPlan {
        let weak_areas = self.find_weak_areas(bundle);
        let strong_areas = self.find_strong_areas(bundle);
        let overall_assessment = OverallAssessment::from_areas(&weak_areas, &strong_areas);
        let horizon = options.time_horizon;

        ImprovementPlan {
            overall_assessment,
            action_plan: options.include_action_plan.then(|| {
                self.build_action_plan(
                    &weak_areas,
                    &strong_areas,
                    options.difficulty_preference,
                    horizon,
                )
            }),
            expected_outcomes: options
                .include_expected_outcomes
                .then(|| self.project_outcomes(&weak_areas, horizon)),
            follow_up: options.include_follow_up.then(|| {
                let plateaued = bundle
                    .stages
                    .iter()
                    .filter(|report| report.stage.learning.plateau.on_plateau)
                    .map(StageReport::stage_id)
                    .collect::<Vec<_>>();
                self.schedule_follow_up(&weak_areas, &plateaued, horizon)
            }),
            motivation: options
                .include_motivational_elements
                .then(|| self.build_motivation(&strong_areas, &weak_areas, overall_assessment)),
            benchmark_quality: bundle.benchmark.as_ref().map(|b| b.quality),
            weak_areas,
            strong_areas,
            time_horizon: horizon,
        }
    }
}
