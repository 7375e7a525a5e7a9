use clap::Args;
use stride_analysis::{
    benchmark::PlayerPopulation,
    insight::{ComparisonBundle, DifficultyPreference, SuggestionOptions},
    metric::MetricKey,
    session::{AggregateMetrics, ComparisonPeriod, SessionRecord},
    stage::analyze_stages,
};
use tracing::info;

use super::{Engine, InputArg, compare_past::compare_periods};
use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
#[expect(clippy::struct_excessive_bools)]
pub(crate) struct SuggestArg {
    #[clap(flatten)]
    input: InputArg,
    /// Player to generate the plan for
    #[arg(long)]
    player: String,
    /// Period the player's recent sessions are compared over
    #[arg(long, default_value = "week")]
    period: ComparisonPeriod,
    /// Reference time in milliseconds since the Unix epoch; defaults to now
    #[arg(long)]
    now: Option<i64>,
    /// Days the plan covers
    #[arg(long, default_value_t = 7)]
    time_horizon: u32,
    /// How demanding the suggested practice should be
    #[arg(long, default_value = "medium")]
    difficulty: DifficultyPreference,
    /// Drop outlying player values before computing the benchmark
    #[arg(long)]
    reject_outliers: bool,
    #[arg(long)]
    no_action_plan: bool,
    #[arg(long)]
    no_outcomes: bool,
    #[arg(long)]
    no_follow_up: bool,
    #[arg(long)]
    no_motivation: bool,
}

impl SuggestArg {
    fn options(&self) -> SuggestionOptions {
        SuggestionOptions {
            include_action_plan: !self.no_action_plan,
            include_expected_outcomes: !self.no_outcomes,
            include_follow_up: !self.no_follow_up,
            include_motivational_elements: !self.no_motivation,
            difficulty_preference: self.difficulty,
            time_horizon: self.time_horizon,
        }
    }
}

pub(crate) fn run(engine: &Engine, arg: &SuggestArg) -> anyhow::Result<()> {
    let sessions = util::read_sessions_file(&arg.input.sessions)?;
    let keys = util::resolve_metrics(&arg.input.metrics);
    let now = util::reference_time(arg.now);

    let bundle = build_bundle(
        engine,
        &sessions,
        &arg.player,
        now,
        arg.period,
        &keys,
        arg.reject_outliers,
    )?;
    let plan = engine.insight().generate_suggestions(&bundle, &arg.options());
    info!(
        weak = plan.weak_areas.len(),
        strong = plan.strong_areas.len(),
        assessment = %plan.overall_assessment,
        "generated improvement plan"
    );
    Output::save_json(&plan, arg.input.output.as_deref())
}

/// Runs every comparison available for `player_id`
///
/// The benchmark is left out when no other player has sessions.
fn build_bundle(
    engine: &Engine,
    sessions: &[SessionRecord],
    player_id: &str,
    now: i64,
    period: ComparisonPeriod,
    keys: &[MetricKey],
    reject_outliers: bool,
) -> anyhow::Result<ComparisonBundle> {
    let player_sessions = util::sessions_of(sessions, Some(player_id));
    if player_sessions.is_empty() {
        anyhow::bail!("No sessions found for player {player_id}");
    }

    let past = compare_periods(engine, &player_sessions, now, &[period], keys)
        .remove(&period);

    let population = PlayerPopulation::from_sessions(sessions, Some(player_id));
    let benchmark = if population.is_empty() {
        info!("no other players, skipping benchmark");
        None
    } else {
        let statistics = engine.benchmark(&population, keys, reject_outliers);
        let player_metrics = AggregateMetrics::from_sessions(player_sessions.iter().copied());
        Some(
            engine
                .comparator()
                .compare_to_benchmark(&player_metrics, &statistics, keys),
        )
    };

    let stages = analyze_stages(
        player_sessions,
        now,
        period,
        keys,
        &engine.comparator(),
        engine.grader(),
    );

    Ok(ComparisonBundle {
        past,
        benchmark,
        stages,
    })
}
