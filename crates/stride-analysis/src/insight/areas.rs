use tracing::debug;

use super::{AreaSource, ComparisonBundle, InsightEngine, PerformanceArea, Priority};
use crate::{
    comparison::{Performance, Trend},
    metric::MetricKey,
    stage::StageReport,
};

impl InsightEngine<'_> {
    /// Priority score `weight(metric) * |change_percent|` and its band.
    ///
    /// For a fixed metric the score never decreases as the change grows.
    #[must_use]
    pub fn priority(&self, metric: MetricKey, change_percent: f64) -> (f64, Priority) {
        let score = self.config.priority_weights.weight(metric) * change_percent.abs();
        (score, self.config.priority_bands.classify(score))
    }

    /// Metrics that declined, lag the population, or hold back a struggling
    /// stage; highest priority first.
    #[must_use]
    pub fn find_weak_areas(&self, bundle: &ComparisonBundle) -> Vec<PerformanceArea> {
        let mut areas = vec![];

        if let Some(past) = bundle.past.as_ref().filter(|p| p.available) {
            for (&metric, m) in &past.metrics {
                if m.trend == Trend::Declined
                    && m.change_percent.abs() > self.config.weak_change_percent
                {
                    areas.push(self.area(
                        metric,
                        AreaSource::Past,
                        m.current,
                        m.past,
                        m.change_percent,
                    ));
                }
            }
        }

        if let Some(benchmark) = bundle.benchmark.as_ref().filter(|b| b.available) {
            for (&metric, m) in &benchmark.metrics {
                if m.performance == Performance::BelowAverage
                    && m.percentile_rank < self.config.weak_rank
                {
                    let mut area = self.area(
                        metric,
                        AreaSource::Benchmark,
                        m.current,
                        m.benchmark_mean,
                        m.difference_percent,
                    );
                    area.percentile_rank = Some(m.percentile_rank);
                    areas.push(area);
                }
            }
        }

        for report in bundle.stages.iter().filter(|r| r.grade.grade.is_struggling()) {
            let worst = self
                .stage_ratios(report)
                .min_by(|(_, _, a), (_, _, b)| a.total_cmp(b));
            let Some((metric, (current, threshold), ratio)) = worst else {
                debug!(stage = report.stage_id(), "struggling stage has no thresholded metric");
                continue;
            };
            let mut area = self.area(
                metric,
                AreaSource::Stage,
                current,
                threshold,
                (ratio - 1.0) * 100.0,
            );
            area.stage_id = Some(report.stage_id().to_owned());
            areas.push(area);
        }

        sort_areas(&mut areas);
        areas
    }

    /// Metrics that improved, lead the population, or carry an excelling
    /// stage; highest priority first.
    #[must_use]
    pub fn find_strong_areas(&self, bundle: &ComparisonBundle) -> Vec<PerformanceArea> {
        let mut areas = vec![];

        if let Some(past) = bundle.past.as_ref().filter(|p| p.available) {
            for (&metric, m) in &past.metrics {
                if m.trend == Trend::Improved
                    && m.change_percent.abs() > self.config.strong_change_percent
                {
                    areas.push(self.area(
                        metric,
                        AreaSource::Past,
                        m.current,
                        m.past,
                        m.change_percent,
                    ));
                }
            }
        }

        if let Some(benchmark) = bundle.benchmark.as_ref().filter(|b| b.available) {
            for (&metric, m) in &benchmark.metrics {
                if m.performance == Performance::AboveAverage
                    && m.percentile_rank > self.config.strong_rank
                {
                    let mut area = self.area(
                        metric,
                        AreaSource::Benchmark,
                        m.current,
                        m.benchmark_mean,
                        m.difference_percent,
                    );
                    area.percentile_rank = Some(m.percentile_rank);
                    areas.push(area);
                }
            }
        }

        for report in bundle.stages.iter().filter(|r| r.grade.grade.is_excelling()) {
            let best = self
                .stage_ratios(report)
                .filter(|(_, _, ratio)| *ratio > 1.0)
                .max_by(|(_, _, a), (_, _, b)| a.total_cmp(b));
            if let Some((metric, (current, threshold), ratio)) = best {
                let mut area = self.area(
                    metric,
                    AreaSource::Stage,
                    current,
                    threshold,
                    (ratio - 1.0) * 100.0,
                );
                area.stage_id = Some(report.stage_id().to_owned());
                areas.push(area);
            }
        }

        sort_areas(&mut areas);
        areas
    }

    /// `(metric, (value, threshold), value / threshold)` for every stage
    /// metric that has a positive threshold and a value.
    fn stage_ratios<'r>(
        &self,
        report: &'r StageReport,
    ) -> impl Iterator<Item = (MetricKey, (f64, f64), f64)> + 'r {
        self.config
            .stage_thresholds
            .entries()
            .into_iter()
            .filter(|&(_, threshold)| threshold > 0.0)
            .filter_map(move |(metric, threshold)| {
                let value = report.stage.metrics.get(metric)?;
                Some((metric, (value, threshold), value / threshold))
            })
    }

    fn area(
        &self,
        metric: MetricKey,
        source: AreaSource,
        current_value: f64,
        reference_value: f64,
        delta_percent: f64,
    ) -> PerformanceArea {
        let (priority_score, priority) = self.priority(metric, delta_percent);
        PerformanceArea {
            metric,
            source,
            stage_id: None,
            current_value,
            reference_value,
            delta_percent,
            percentile_rank: None,
            priority,
            priority_score,
        }
    }
}

/// Priority level descending, then change magnitude descending.
fn sort_areas(areas: &mut [PerformanceArea]) {
    areas.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.delta_percent.abs().total_cmp(&a.delta_percent.abs()))
    });
}
