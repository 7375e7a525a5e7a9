use std::{path::PathBuf, sync::Arc};

use clap::{Args, Parser, Subcommand};
use stride_analysis::{
    benchmark::{BenchmarkBuilder, BenchmarkCache, BenchmarkStatistics, PlayerPopulation},
    comparison::Comparator,
    config::EngineConfig,
    grading::PerformanceGrader,
    insight::InsightEngine,
    metric::{MetricCatalog, MetricKey},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use self::{
    benchmark::BenchmarkArg, compare_past::ComparePastArg, stages::StagesArg, suggest::SuggestArg,
};
use crate::util;

mod benchmark;
mod compare_past;
mod stages;
mod suggest;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Engine configuration JSON file; defaults apply to absent keys
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Compare a player's recent sessions with earlier periods
    ComparePast(#[clap(flatten)] ComparePastArg),
    /// Compare a player with the other players in the session file
    Benchmark(#[clap(flatten)] BenchmarkArg),
    /// Grade and rank every stage
    Stages(#[clap(flatten)] StagesArg),
    /// Generate an improvement plan for a player
    Suggest(#[clap(flatten)] SuggestArg),
}

/// Arguments shared by every subcommand
#[derive(Debug, Clone, Args)]
pub(crate) struct InputArg {
    /// Path to a JSON array of session records
    pub sessions: PathBuf,
    /// Metrics to analyze (comma-separated); all metrics when omitted
    #[arg(long, value_delimiter = ',')]
    pub metrics: Vec<String>,
    /// Output file path; stdout when omitted
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);

    let engine = Engine::new(util::read_config_file(args.config.as_deref())?);
    match &args.mode {
        Mode::ComparePast(arg) => compare_past::run(&engine, arg)?,
        Mode::Benchmark(arg) => benchmark::run(&engine, arg)?,
        Mode::Stages(arg) => stages::run(&engine, arg)?,
        Mode::Suggest(arg) => suggest::run(&engine, arg)?,
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Configuration and long-lived state shared by the subcommands
#[derive(Debug)]
pub(crate) struct Engine {
    config: EngineConfig,
    catalog: MetricCatalog,
    grader: PerformanceGrader,
    benchmarks: BenchmarkCache,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            catalog: MetricCatalog::standard(),
            grader: PerformanceGrader::new(),
            benchmarks: BenchmarkCache::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    pub fn grader(&self) -> &PerformanceGrader {
        &self.grader
    }

    pub fn comparator(&self) -> Comparator<'_> {
        Comparator::new(&self.catalog, &self.config.comparison)
    }

    pub fn insight(&self) -> InsightEngine<'_> {
        InsightEngine::new(&self.config.insight, &self.catalog)
    }

    /// Benchmark of `population`, reused while the population is unchanged
    pub fn benchmark(
        &self,
        population: &PlayerPopulation,
        keys: &[MetricKey],
        reject_outliers: bool,
    ) -> Arc<BenchmarkStatistics> {
        let metrics = population.metrics();
        self.benchmarks.get_or_build(&metrics, keys, || {
            info!(players = metrics.len(), reject_outliers, "building benchmark");
            BenchmarkBuilder::new(&self.config.benchmark)
                .with_outlier_rejection(reject_outliers)
                .build(&metrics, keys)
        })
    }
}
