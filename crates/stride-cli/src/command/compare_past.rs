use std::collections::BTreeMap;

use clap::Args;
use serde::Serialize;
use stride_analysis::{
    comparison::PastComparison,
    metric::MetricKey,
    session::{ComparisonPeriod, SessionRecord, split_by_period},
    summary::{DetailedAnalysis, PeriodSummary, detailed_analysis, summarize_periods},
};
use tracing::info;

use super::{Engine, InputArg};
use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct ComparePastArg {
    #[clap(flatten)]
    input: InputArg,
    /// Only analyze sessions of this player
    #[arg(long)]
    player: Option<String>,
    /// Periods to compare
    #[arg(long = "period", value_delimiter = ',', default_values = ["week", "month", "quarter"])]
    periods: Vec<ComparisonPeriod>,
    /// Reference time in milliseconds since the Unix epoch; defaults to now
    #[arg(long)]
    now: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComparePastReport<'a> {
    player_id: Option<&'a str>,
    now: i64,
    comparisons: BTreeMap<ComparisonPeriod, PastComparison>,
    summary: PeriodSummary,
    analysis: DetailedAnalysis,
}

pub(crate) fn run(engine: &Engine, arg: &ComparePastArg) -> anyhow::Result<()> {
    let sessions = util::read_sessions_file(&arg.input.sessions)?;
    let keys = util::resolve_metrics(&arg.input.metrics);
    let now = util::reference_time(arg.now);
    let player_sessions = util::sessions_of(&sessions, arg.player.as_deref());
    info!(
        sessions = player_sessions.len(),
        periods = arg.periods.len(),
        "comparing with past periods"
    );

    let comparisons = compare_periods(engine, &player_sessions, now, &arg.periods, &keys);
    let report = ComparePastReport {
        player_id: arg.player.as_deref(),
        now,
        summary: summarize_periods(&comparisons),
        analysis: detailed_analysis(
            &comparisons,
            engine.catalog(),
            engine.insight().templates(),
        ),
        comparisons,
    };
    Output::save_json(&report, arg.input.output.as_deref())
}

/// Current window against the preceding one, for every period
pub(crate) fn compare_periods(
    engine: &Engine,
    sessions: &[&SessionRecord],
    now: i64,
    periods: &[ComparisonPeriod],
    keys: &[MetricKey],
) -> BTreeMap<ComparisonPeriod, PastComparison> {
    let comparator = engine.comparator();
    periods
        .iter()
        .map(|&period| {
            let windows = split_by_period(sessions.iter().copied(), now, period);
            let comparison =
                comparator.compare_to_past(&windows.current_metrics(), &windows.past_metrics(), keys);
            (period, comparison)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use stride_analysis::config::EngineConfig;

    use super::*;

    const DAY: i64 = 24 * 60 * 60 * 1000;

    #[test]
    fn test_compare_periods() {
        let engine = Engine::new(EngineConfig::default());
        let sessions = [1, 2, 8, 9]
            .into_iter()
            .map(|day| SessionRecord::new(day * DAY, if day < 5 { 500.0 } else { 700.0 }))
            .collect::<Vec<_>>();
        let refs = sessions.iter().collect::<Vec<_>>();

        let comparisons = compare_periods(
            &engine,
            &refs,
            10 * DAY,
            &[ComparisonPeriod::Week, ComparisonPeriod::Month],
            &[MetricKey::Score],
        );
        assert!(comparisons[&ComparisonPeriod::Week].available);
        assert_eq!(comparisons[&ComparisonPeriod::Week].improvements, 1);
        // Every session falls in the current month; the previous one is empty.
        assert!(!comparisons[&ComparisonPeriod::Month].available);
    }
}
