//! Player performance analysis for Stride
//!
//! This crate turns recorded play sessions into comparisons, grades and
//! improvement plans. It is a pure library: every operation is a function of
//! its arguments plus an [`EngineConfig`](config::EngineConfig) passed by
//! reference.
//!
//! # Overview
//!
//! The analysis runs in three stages:
//!
//! ## Aggregation
//!
//! 1. **Sessions** ([`session::SessionRecord`]): One recorded play session
//! 2. **Windows** ([`session::split_by_period`]): Current and past windows of a
//!    [`session::ComparisonPeriod`]
//! 3. **Metrics** ([`session::AggregateMetrics`]): Averages, completion rate and
//!    best combo over a set of sessions
//!
//! ## Comparison
//!
//! 1. **Past** ([`comparison::Comparator::compare_to_past`]): Current window
//!    against the player's own past window
//! 2. **Benchmark** ([`benchmark::BenchmarkBuilder`],
//!    [`comparison::Comparator::compare_to_benchmark`]): The player against the
//!    distribution of other players
//! 3. **Stages** ([`stage::analyze_stages`], [`grading::PerformanceGrader`]):
//!    Per-stage grades, learning curves and difficulty estimates
//! 4. **Stage pairs** ([`stage_pairs::compare_stage_pairs`]): Significance
//!    tests between every two stages
//!
//! ## Insight
//!
//! 1. **Areas** ([`insight::InsightEngine::find_weak_areas`]): Prioritized weak
//!    and strong metrics
//! 2. **Plan** ([`insight::InsightEngine::generate_suggestions`]): Actions,
//!    projected outcomes, follow-up checkpoints and motivation
//! 3. **Summaries** ([`summary`]): Human-readable roll-ups of the comparisons
//!
//! Metric values are rendered through the [`metric::MetricCatalog`]; numeric
//! primitives come from `stride-stats`.
//!
//! # Examples
//!
//! ```
//! use stride_analysis::{
//!     comparison::{Comparator, OverallTrend},
//!     config::EngineConfig,
//!     insight::{ComparisonBundle, InsightEngine, SuggestionOptions},
//!     metric::{MetricCatalog, MetricKey},
//!     session::{ComparisonPeriod, SessionRecord, split_by_period},
//! };
//!
//! const DAY: i64 = 24 * 60 * 60 * 1000;
//!
//! // Three sessions a week ago, three this week with lower scores.
//! let sessions = [2, 3, 4, 9, 10, 11]
//!     .into_iter()
//!     .map(|day| SessionRecord::new(day * DAY, if day < 7 { 1000.0 } else { 800.0 }))
//!     .collect::<Vec<_>>();
//!
//! let config = EngineConfig::default();
//! let catalog = MetricCatalog::standard();
//! let comparator = Comparator::new(&catalog, &config.comparison);
//!
//! let windows = split_by_period(&sessions, 12 * DAY, ComparisonPeriod::Week);
//! let past = comparator.compare_to_past(
//!     &windows.current_metrics(),
//!     &windows.past_metrics(),
//!     &MetricKey::ALL,
//! );
//! assert_eq!(past.overall_trend, OverallTrend::Declining);
//!
//! let engine = InsightEngine::new(&config.insight, &catalog);
//! let bundle = ComparisonBundle { past: Some(past), ..Default::default() };
//! let plan = engine.generate_suggestions(&bundle, &SuggestionOptions::default());
//! assert_eq!(plan.weak_areas[0].metric, MetricKey::Score);
//! ```

pub mod benchmark;
pub mod comparison;
pub mod config;
pub mod error;
pub mod grading;
pub mod insight;
pub mod metric;
pub mod session;
pub mod stage;
pub mod stage_pairs;
pub mod summary;
