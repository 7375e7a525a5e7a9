use clap::Args;
use serde::Serialize;
use stride_analysis::{
    benchmark::{BenchmarkStatistics, PlayerPopulation, anonymize_player_id},
    comparison::BenchmarkComparison,
    session::AggregateMetrics,
    summary::{BenchmarkAnalysis, BenchmarkSummary, benchmark_analysis, summarize_benchmark},
};
use tracing::{info, warn};

use super::{Engine, InputArg};
use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct BenchmarkArg {
    #[clap(flatten)]
    input: InputArg,
    /// Player to compare; every other player forms the benchmark
    #[arg(long)]
    player: String,
    /// Drop outlying player values before computing quartiles
    #[arg(long)]
    reject_outliers: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BenchmarkReport<'a> {
    /// Anonymized id of the compared player
    player: String,
    player_metrics: AggregateMetrics,
    benchmark: &'a BenchmarkStatistics,
    comparison: BenchmarkComparison,
    summary: BenchmarkSummary,
    analysis: BenchmarkAnalysis,
}

pub(crate) fn run(engine: &Engine, arg: &BenchmarkArg) -> anyhow::Result<()> {
    let sessions = util::read_sessions_file(&arg.input.sessions)?;
    let keys = util::resolve_metrics(&arg.input.metrics);

    let player_sessions = util::sessions_of(&sessions, Some(arg.player.as_str()));
    if player_sessions.is_empty() {
        anyhow::bail!("No sessions found for player {}", arg.player);
    }
    let player_metrics = AggregateMetrics::from_sessions(player_sessions);

    let population = PlayerPopulation::from_sessions(&sessions, Some(arg.player.as_str()));
    if population.len() < engine.config().benchmark.min_sample_size {
        warn!(
            players = population.len(),
            "benchmark population is below the minimum sample size"
        );
    }
    info!(players = population.len(), "comparing with other players");

    let benchmark = engine.benchmark(&population, &keys, arg.reject_outliers);
    let comparison = engine
        .comparator()
        .compare_to_benchmark(&player_metrics, &benchmark, &keys);
    let report = BenchmarkReport {
        player: anonymize_player_id(&arg.player),
        player_metrics,
        benchmark: &benchmark,
        summary: summarize_benchmark(&comparison),
        analysis: benchmark_analysis(
            &comparison,
            engine.catalog(),
            engine.insight().templates(),
        ),
        comparison,
    };
    Output::save_json(&report, arg.input.output.as_deref())
}
