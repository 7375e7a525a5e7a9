use serde::{Deserialize, Serialize};

use super::{AreaSource, InsightEngine, PerformanceArea, Priority};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum OverallAssessment {
    #[display("excellent")]
    Excellent,
    #[display("good")]
    Good,
    #[display("developing")]
    Developing,
    #[display("needs attention")]
    NeedsAttention,
}

impl OverallAssessment {
    /// - no weak areas but some strong ones: excellent
    /// - at least as many strong areas as weak ones: good
    /// - any high-priority weak area: needs attention
    /// - otherwise: developing
    #[must_use]
    pub fn from_areas(weak_areas: &[PerformanceArea], strong_areas: &[PerformanceArea]) -> Self {
        if weak_areas.is_empty() && !strong_areas.is_empty() {
            Self::Excellent
        } else if strong_areas.len() >= weak_areas.len() {
            Self::Good
        } else if weak_areas.iter().any(|a| a.priority == Priority::High) {
            Self::NeedsAttention
        } else {
            Self::Developing
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Motivation {
    pub encouragement: String,
    pub achievements: Vec<String>,
    /// Built from the weak area closest to being resolved.
    pub next_milestone: Option<String>,
}

impl InsightEngine<'_> {
    #[must_use]
    pub fn build_motivation(
        &self,
        strong_areas: &[PerformanceArea],
        weak_areas: &[PerformanceArea],
        assessment: OverallAssessment,
    ) -> Motivation {
        let encouragement = match assessment {
            OverallAssessment::Excellent => "Outstanding work, every tracked metric is holding up",
            OverallAssessment::Good => "Good progress, your strengths outweigh your gaps",
            OverallAssessment::Developing => "You are building momentum, keep the routine going",
            OverallAssessment::NeedsAttention => {
                "A few areas slipped, a focused week will get them back"
            }
        };

        let achievements = strong_areas
            .iter()
            .map(|area| {
                let name = self.catalog.display_name(area.metric);
                match (area.source, area.percentile_rank, area.stage_id.as_deref()) {
                    (AreaSource::Benchmark, Some(rank), _) => {
                        format!("{name} in the top {:.0}% of players", (100.0 - rank).max(1.0))
                    }
                    (AreaSource::Stage, _, Some(stage)) => {
                        format!("{name} above target on {stage}")
                    }
                    _ => format!("{name} up {:.1}%", area.delta_percent.abs()),
                }
            })
            .collect();

        let next_milestone = weak_areas
            .iter()
            .min_by(|a, b| a.priority_score.total_cmp(&b.priority_score))
            .map(|area| {
                let name = self.catalog.display_name(area.metric).to_lowercase();
                let target = self
                    .catalog
                    .get(area.metric)
                    .map_or_else(|| format!("{:.2}", area.reference_value), |def| {
                        def.format(area.reference_value)
                    });
                match (area.source, area.stage_id.as_deref()) {
                    (AreaSource::Past, _) => format!("Bring your {name} back to {target}"),
                    (AreaSource::Benchmark, _) => {
                        format!("Reach the player average {name} of {target}")
                    }
                    (AreaSource::Stage, Some(stage)) => format!("Reach {target} {name} on {stage}"),
                    (AreaSource::Stage, None) => format!("Reach {target} {name}"),
                }
            });

        Motivation {
            encouragement: encouragement.to_owned(),
            achievements,
            next_milestone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::EngineConfig,
        metric::{MetricCatalog, MetricKey},
    };

    fn area(metric: MetricKey, priority: Priority, priority_score: f64) -> PerformanceArea {
        PerformanceArea {
            metric,
            source: AreaSource::Past,
            stage_id: None,
            current_value: 800.0,
            reference_value: 1000.0,
            delta_percent: -20.0,
            percentile_rank: None,
            priority,
            priority_score,
        }
    }

    #[test]
    fn test_assessment() {
        let high = area(MetricKey::Score, Priority::High, 60.0);
        let low = area(MetricKey::MaxCombo, Priority::Low, 5.0);

        assert_eq!(OverallAssessment::from_areas(&[], &[high.clone()]), OverallAssessment::Excellent);
        assert_eq!(OverallAssessment::from_areas(&[], &[]), OverallAssessment::Good);
        assert_eq!(
            OverallAssessment::from_areas(&[low.clone()], &[high.clone()]),
            OverallAssessment::Good
        );
        assert_eq!(
            OverallAssessment::from_areas(&[low.clone(), high.clone()], &[]),
            OverallAssessment::NeedsAttention
        );
        assert_eq!(OverallAssessment::from_areas(&[low], &[]), OverallAssessment::Developing);
    }

    #[test]
    fn test_milestone_from_easiest_weak_area() {
        let config = EngineConfig::default();
        let catalog = MetricCatalog::standard();
        let engine = InsightEngine::new(&config.insight, &catalog);
        let weak = [
            area(MetricKey::Score, Priority::High, 60.0),
            area(MetricKey::MaxCombo, Priority::Medium, 20.0),
        ];
        let strong = [PerformanceArea {
            source: AreaSource::Benchmark,
            percentile_rank: Some(92.0),
            ..area(MetricKey::Accuracy, Priority::High, 40.0)
        }];

        let motivation = engine.build_motivation(&strong, &weak, OverallAssessment::NeedsAttention);
        assert_eq!(
            motivation.next_milestone.as_deref(),
            Some("Bring your max combo back to 1000")
        );
        assert_eq!(motivation.achievements, vec!["Accuracy in the top 8% of players"]);

        let none = engine.build_motivation(&[], &[], OverallAssessment::Good);
        assert_eq!(none.next_milestone, None);
        assert!(none.achievements.is_empty());
    }
}
