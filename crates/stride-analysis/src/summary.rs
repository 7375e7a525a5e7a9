//! Human-readable roll-ups of comparison results.
//!
//! [`summarize_periods`] and [`detailed_analysis`] condense past comparisons
//! over several [`ComparisonPeriod`]s; [`summarize_benchmark`] and
//! [`benchmark_analysis`] do the same for a [`BenchmarkComparison`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    comparison::{BenchmarkComparison, OverallPerformance, PastComparison, Performance, Trend},
    insight::PracticeTemplates,
    metric::{MetricCatalog, MetricKey},
    session::ComparisonPeriod,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodOutlook {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub overall: PeriodOutlook,
    pub message: String,
    pub improvements: usize,
    pub declines: usize,
    pub unchanged: usize,
    /// Periods that had data on both sides.
    pub periods_compared: Vec<ComparisonPeriod>,
}

/// Totals the trends of every available period.
#[must_use]
pub fn summarize_periods(comparisons: &BTreeMap<ComparisonPeriod, PastComparison>) -> PeriodSummary {
    let available = comparisons
        .iter()
        .filter(|(_, c)| c.available)
        .collect::<Vec<_>>();

    let improvements = available.iter().map(|(_, c)| c.improvements).sum::<usize>();
    let declines = available.iter().map(|(_, c)| c.declines).sum::<usize>();
    let unchanged = available.iter().map(|(_, c)| c.unchanged).sum::<usize>();

    let (overall, message) = if available.is_empty() {
        (
            PeriodOutlook::InsufficientData,
            "Not enough sessions to compare any period".to_owned(),
        )
    } else {
        match improvements.cmp(&declines) {
            std::cmp::Ordering::Greater => (
                PeriodOutlook::Improving,
                format!("Improving: {improvements} metric(s) up, {declines} down"),
            ),
            std::cmp::Ordering::Less => (
                PeriodOutlook::Declining,
                format!("Declining: {declines} metric(s) down, {improvements} up"),
            ),
            std::cmp::Ordering::Equal => (
                PeriodOutlook::Stable,
                "Performance is stable across the compared periods".to_owned(),
            ),
        }
    };

    PeriodSummary {
        overall,
        message,
        improvements,
        declines,
        unchanged,
        periods_compared: available.iter().map(|&(&p, _)| p).collect(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedAnalysis {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Describes every improved and declined metric per period and recommends a
/// focus for each declined metric.
#[must_use]
pub fn detailed_analysis(
    comparisons: &BTreeMap<ComparisonPeriod, PastComparison>,
    catalog: &MetricCatalog,
    templates: &PracticeTemplates,
) -> DetailedAnalysis {
    let mut analysis = DetailedAnalysis::default();
    let mut declined = vec![];

    for (period, comparison) in comparisons.iter().filter(|(_, c)| c.available) {
        for (&metric, m) in &comparison.metrics {
            let name = catalog.display_name(metric);
            match m.trend {
                Trend::Improved => analysis.strengths.push(format!(
                    "{name} improved by {} over the last {period}",
                    m.display
                )),
                Trend::Declined => {
                    analysis.weaknesses.push(format!(
                        "{name} declined by {} over the last {period}",
                        m.display
                    ));
                    declined.push(metric);
                }
                Trend::Unchanged => {}
            }
        }
    }

    declined.sort_unstable();
    declined.dedup();
    analysis.recommendations = declined
        .into_iter()
        .map(|metric| templates.get(metric).focus.to_owned())
        .collect();

    if analysis.strengths.is_empty() && analysis.weaknesses.is_empty() {
        analysis.recommendations.push(
            "Your performance is stable; try new stages or a higher difficulty to keep progressing"
                .to_owned(),
        );
    }
    analysis
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkSummary {
    pub available: bool,
    pub overall: Performance,
    pub message: String,
    pub above_average: usize,
    pub average: usize,
    pub below_average: usize,
}

#[must_use]
pub fn summarize_benchmark(comparison: &BenchmarkComparison) -> BenchmarkSummary {
    let overall = match comparison.overall_performance {
        OverallPerformance::Excellent => Performance::AboveAverage,
        OverallPerformance::Average => Performance::Average,
        OverallPerformance::NeedsImprovement => Performance::BelowAverage,
    };
    let mut message = if comparison.available {
        match overall {
            Performance::AboveAverage => "You perform above most other players".to_owned(),
            Performance::Average => "You perform in line with other players".to_owned(),
            Performance::BelowAverage => "You perform below most other players".to_owned(),
        }
    } else {
        "No metric could be compared with other players".to_owned()
    };
    if comparison.available && !comparison.quality.reliable {
        message.push_str(&format!(
            " (based on only {} players)",
            comparison.quality.sample_size
        ));
    }

    BenchmarkSummary {
        available: comparison.available,
        overall,
        message,
        above_average: comparison.above_average,
        average: comparison.average,
        below_average: comparison.below_average,
    }
}

/// One metric's place among the population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRanking {
    pub metric: MetricKey,
    pub percentile_rank: f64,
    pub performance: Performance,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkAnalysis {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    /// Highest percentile rank first.
    pub rankings: Vec<MetricRanking>,
    pub recommendations: Vec<String>,
}

/// Lists above-average metrics as strengths and below-average ones as
/// improvements, following the rank bands the comparison was classified with.
#[must_use]
pub fn benchmark_analysis(
    comparison: &BenchmarkComparison,
    catalog: &MetricCatalog,
    templates: &PracticeTemplates,
) -> BenchmarkAnalysis {
    let mut analysis = BenchmarkAnalysis::default();

    for (&metric, m) in &comparison.metrics {
        let name = catalog.display_name(metric);
        let rank = m.percentile_rank;
        match m.performance {
            Performance::AboveAverage => analysis.strengths.push(format!(
                "{name}: top {:.0}% of players",
                (100.0 - rank).max(1.0)
            )),
            Performance::BelowAverage => {
                analysis
                    .improvements
                    .push(format!("{name}: bottom {:.0}% of players", rank.max(1.0)));
                analysis
                    .recommendations
                    .push(templates.get(metric).focus.to_owned());
            }
            Performance::Average => {}
        }
        analysis.rankings.push(MetricRanking {
            metric,
            percentile_rank: rank,
            performance: m.performance,
        });
    }
    analysis
        .rankings
        .sort_by(|a, b| b.percentile_rank.total_cmp(&a.percentile_rank));

    if analysis.recommendations.is_empty() && comparison.available {
        analysis.recommendations.push(
            "Keep your current routine and push your strongest metrics further".to_owned(),
        );
    }
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        benchmark::BenchmarkBuilder,
        comparison::Comparator,
        config::{ComparisonThresholds, EngineConfig},
        session::AggregateMetrics,
    };

    fn metrics(score: f64, accuracy: f64) -> AggregateMetrics {
        AggregateMetrics {
            session_count: 4,
            score: Some(score),
            accuracy: Some(accuracy),
            ..AggregateMetrics::default()
        }
    }

    fn comparisons() -> BTreeMap<ComparisonPeriod, PastComparison> {
        let catalog = MetricCatalog::standard();
        let thresholds = ComparisonThresholds::default();
        let comparator = Comparator::new(&catalog, &thresholds);
        let keys = [MetricKey::Score, MetricKey::Accuracy];
        BTreeMap::from([
            (
                ComparisonPeriod::Week,
                comparator.compare_to_past(&metrics(1100.0, 0.7), &metrics(1000.0, 0.8), &keys),
            ),
            (
                ComparisonPeriod::Month,
                comparator.compare_to_past(&metrics(1100.0, 0.8), &metrics(900.0, 0.8), &keys),
            ),
            (
                ComparisonPeriod::Quarter,
                comparator.compare_to_past(
                    &metrics(1100.0, 0.8),
                    &AggregateMetrics::default(),
                    &keys,
                ),
            ),
        ])
    }

    #[test]
    fn test_summarize_periods() {
        let summary = summarize_periods(&comparisons());
        assert_eq!(summary.overall, PeriodOutlook::Improving);
        assert_eq!(
            (summary.improvements, summary.declines, summary.unchanged),
            (2, 1, 1)
        );
        assert_eq!(
            summary.periods_compared,
            vec![ComparisonPeriod::Week, ComparisonPeriod::Month]
        );

        let empty = summarize_periods(&BTreeMap::new());
        assert_eq!(empty.overall, PeriodOutlook::InsufficientData);
    }

    #[test]
    fn test_detailed_analysis() {
        let catalog = MetricCatalog::standard();
        let templates = PracticeTemplates::standard();
        let analysis = detailed_analysis(&comparisons(), &catalog, &templates);
        assert_eq!(analysis.strengths.len(), 2);
        assert_eq!(
            analysis.weaknesses,
            vec!["Accuracy declined by -10% (-12.5%) over the last week"]
        );
        assert_eq!(
            analysis.recommendations,
            vec![templates.get(MetricKey::Accuracy).focus]
        );

        let stable = detailed_analysis(&BTreeMap::new(), &catalog, &templates);
        assert_eq!(stable.recommendations.len(), 1);
    }

    #[test]
    fn test_benchmark_summary_and_analysis() {
        let config = EngineConfig::default();
        let catalog = MetricCatalog::standard();
        let templates = PracticeTemplates::standard();
        let comparator = Comparator::new(&catalog, &config.comparison);
        let population = (0..=100)
            .map(|i| metrics(f64::from(i) * 10.0, f64::from(i) / 100.0))
            .collect::<Vec<_>>();
        let benchmark = BenchmarkBuilder::new(&config.benchmark)
            .build(&population, &[MetricKey::Score, MetricKey::Accuracy]);
        let comparison = comparator.compare_to_benchmark(
            &metrics(900.0, 0.0),
            &benchmark,
            &[MetricKey::Score, MetricKey::Accuracy],
        );

        let summary = summarize_benchmark(&comparison);
        assert!(summary.available);
        assert_eq!(summary.overall, Performance::Average);
        assert_eq!((summary.above_average, summary.below_average), (1, 1));

        let analysis = benchmark_analysis(&comparison, &catalog, &templates);
        assert_eq!(analysis.strengths, vec!["Score: top 10% of players"]);
        assert_eq!(analysis.improvements, vec!["Accuracy: bottom 1% of players"]);
        assert_eq!(analysis.rankings[0].metric, MetricKey::Score);
        assert_eq!(analysis.recommendations.len(), 1);
    }

    #[test]
    fn test_benchmark_analysis_follows_configured_bands() {
        let config = EngineConfig::default();
        let catalog = MetricCatalog::standard();
        let templates = PracticeTemplates::standard();
        let thresholds = ComparisonThresholds {
            below_average_rank: 10.0,
            above_average_rank: 95.0,
            ..ComparisonThresholds::default()
        };
        let comparator = Comparator::new(&catalog, &thresholds);
        let population = (0..=100)
            .map(|i| metrics(f64::from(i) * 10.0, f64::from(i) / 100.0))
            .collect::<Vec<_>>();
        let keys = [MetricKey::Score, MetricKey::Accuracy];
        let benchmark = BenchmarkBuilder::new(&config.benchmark).build(&population, &keys);
        // Score ranks 90 and accuracy 25: both average under the narrow bands.
        let comparison = comparator.compare_to_benchmark(&metrics(900.0, 0.2), &benchmark, &keys);

        let analysis = benchmark_analysis(&comparison, &catalog, &templates);
        assert!(analysis.strengths.is_empty());
        assert!(analysis.improvements.is_empty());
        assert_eq!(analysis.rankings.len(), 2);
        assert_eq!(
            analysis.recommendations,
            vec!["Keep your current routine and push your strongest metrics further"]
        );
    }
}
