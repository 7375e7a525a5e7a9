use std::collections::BTreeMap;

use clap::Args;
use serde::Serialize;
use stride_analysis::{
    metric::MetricKey,
    session::{ComparisonPeriod, SessionRecord},
    stage::{StageRanking, StageReport, analyze_stages, rank_stages},
    stage_pairs::{StagePairComparison, compare_stage_pairs},
};
use tracing::info;

use super::{Engine, InputArg};
use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct StagesArg {
    #[clap(flatten)]
    input: InputArg,
    /// Only analyze sessions of this player
    #[arg(long)]
    player: Option<String>,
    /// Period each stage's current window is compared over
    #[arg(long, default_value = "week")]
    period: ComparisonPeriod,
    /// Reference time in milliseconds since the Unix epoch; defaults to now
    #[arg(long)]
    now: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StagesReport {
    ranking: StageRanking,
    stages: Vec<StageReport>,
    /// Keyed `<a>_vs_<b>`.
    pairs: BTreeMap<String, StagePairComparison>,
}

pub(crate) fn run(engine: &Engine, arg: &StagesArg) -> anyhow::Result<()> {
    let sessions = util::read_sessions_file(&arg.input.sessions)?;
    let keys = util::resolve_metrics(&arg.input.metrics);
    let now = util::reference_time(arg.now);
    let player_sessions = util::sessions_of(&sessions, arg.player.as_deref());

    let report = build_report(engine, &player_sessions, now, arg.period, &keys);
    info!(
        stages = report.stages.len(),
        pairs = report.pairs.len(),
        "graded stages"
    );
    Output::save_json(&report, arg.input.output.as_deref())
}

fn build_report(
    engine: &Engine,
    sessions: &[&SessionRecord],
    now: i64,
    period: ComparisonPeriod,
    keys: &[MetricKey],
) -> StagesReport {
    let stages = analyze_stages(
        sessions.iter().copied(),
        now,
        period,
        keys,
        &engine.comparator(),
        engine.grader(),
    );
    StagesReport {
        ranking: rank_stages(&stages),
        pairs: compare_stage_pairs(sessions.iter().copied(), now),
        stages,
    }
}
