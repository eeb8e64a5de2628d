use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use expert_match::config::{AppConfig, ConfigError};
use expert_match::error::AppError;
use expert_match::matching::{ExpertId, ExpertMatchingService, ScoringWeights};
use expert_match::telemetry;
use tracing::info;

use crate::demo::run_demo;
use crate::infra::{load_fixture, parse_now, FixtureRepository};
use crate::render::{render, render_explanation};

#[derive(Parser, Debug)]
#[command(
    name = "expert-ranker",
    about = "Rank subject-matter experts against a research question",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank every candidate in a fixture file
    Rank(RankArgs),
    /// Show the full score breakdown for one candidate
    Explain(ExplainArgs),
    /// Print the effective scoring weights as JSON
    Weights(WeightsArgs),
    /// Rank the bundled sample pool
    Demo(DemoArgs),
}

#[derive(Args, Debug)]
pub(crate) struct ScoringArgs {
    /// Evaluation instant (YYYY-MM-DD or RFC 3339); defaults to the fixture's asOf, then now
    #[arg(long, value_parser = parse_now)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Weights override file; takes precedence over EXPERT_MATCH_WEIGHTS
    #[arg(long)]
    pub(crate) weights: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// JSON fixture with question, entities and candidates
    #[arg(long)]
    pub(crate) input: PathBuf,
    #[command(flatten)]
    pub(crate) scoring: ScoringArgs,
    /// Keep only the top N candidates
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug)]
pub(crate) struct ExplainArgs {
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Candidate id to explain
    #[arg(long)]
    pub(crate) expert: String,
    #[command(flatten)]
    pub(crate) scoring: ScoringArgs,
}

#[derive(Args, Debug)]
pub(crate) struct WeightsArgs {
    #[arg(long)]
    pub(crate) weights: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    #[command(flatten)]
    pub(crate) scoring: ScoringArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
    Csv,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    info!(environment = config.environment.label(), "configuration loaded");

    match cli.command {
        Command::Rank(args) => run_rank(&config, args),
        Command::Explain(args) => run_explain(&config, args),
        Command::Weights(args) => {
            let weights = resolve_weights(&config, args.weights)?;
            println!("{}", serde_json::to_string_pretty(&weights)?);
            Ok(())
        }
        Command::Demo(args) => run_demo(&config, args),
    }
}

pub(crate) fn resolve_weights(
    config: &AppConfig,
    override_path: Option<PathBuf>,
) -> Result<ScoringWeights, AppError> {
    match override_path {
        Some(path) => ScoringWeights::from_path(path)
            .map_err(|err| ConfigError::Weights(err).into()),
        None => Ok(config.scoring_weights()?),
    }
}

pub(crate) fn resolve_now(
    flag: Option<DateTime<Utc>>,
    fixture: Option<DateTime<Utc>>,
) -> DateTime<Utc> {
    flag.or(fixture).unwrap_or_else(Utc::now)
}

fn run_rank(config: &AppConfig, args: RankArgs) -> Result<(), AppError> {
    let fixture = load_fixture(&args.input)?;
    let weights = resolve_weights(config, args.scoring.weights)?;
    let now = resolve_now(args.scoring.now, fixture.as_of);
    let limit = args.limit.or(config.scoring.rank_limit);

    info!(input = %args.input.display(), %now, "ranking fixture");

    let repository = Arc::new(FixtureRepository::from_fixture(&fixture));
    let service = ExpertMatchingService::new(repository.clone(), weights);
    let ranked = service.rank(&fixture.question, &fixture.entities, now, limit)?;

    let stdout = std::io::stdout();
    render(&ranked, repository.as_ref(), args.format, stdout.lock())
}

fn run_explain(config: &AppConfig, args: ExplainArgs) -> Result<(), AppError> {
    let fixture = load_fixture(&args.input)?;
    let weights = resolve_weights(config, args.scoring.weights)?;
    let now = resolve_now(args.scoring.now, fixture.as_of);

    let repository = Arc::new(FixtureRepository::from_fixture(&fixture));
    let service = ExpertMatchingService::new(repository, weights);
    let result = service.score_candidate(
        &ExpertId(args.expert),
        &fixture.question,
        &fixture.entities,
        now,
    )?;

    let stdout = std::io::stdout();
    render_explanation(&result, now, stdout.lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn cli_parses_rank_flags() {
        let cli = Cli::try_parse_from([
            "expert-ranker",
            "rank",
            "--input",
            "pool.json",
            "--now",
            "2025-06-01",
            "--limit",
            "3",
            "--format",
            "csv",
        ])
        .expect("arguments parse");

        match cli.command {
            Command::Rank(args) => {
                assert_eq!(args.input, PathBuf::from("pool.json"));
                assert_eq!(args.limit, Some(3));
                assert_eq!(args.format, OutputFormat::Csv);
                assert_eq!(
                    args.scoring.now,
                    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single()
                );
            }
            other => panic!("expected rank command, got {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_unparseable_now() {
        let err = Cli::try_parse_from(["expert-ranker", "demo", "--now", "soonish"])
            .expect_err("bad date rejected");
        assert!(err.to_string().contains("soonish"));
    }

    #[test]
    fn flag_beats_fixture_timestamp() {
        let flag = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single();
        let fixture = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
        assert_eq!(resolve_now(flag, fixture), flag.expect("valid"));
        assert_eq!(resolve_now(None, fixture), fixture.expect("valid"));
    }
}
