use std::sync::Arc;

use expert_match::config::AppConfig;
use expert_match::error::AppError;
use expert_match::matching::ExpertMatchingService;
use tracing::info;

use crate::cli::{resolve_now, resolve_weights, DemoArgs};
use crate::infra::{FixtureRepository, RankingFixture};
use crate::render::render;

const DEMO_POOL: &str = include_str!("../fixtures/demo_pool.json");

pub(crate) fn demo_fixture() -> Result<RankingFixture, AppError> {
    RankingFixture::from_json(DEMO_POOL)
}

pub(crate) fn run_demo(config: &AppConfig, args: DemoArgs) -> Result<(), AppError> {
    let fixture = demo_fixture()?;
    let weights = resolve_weights(config, args.scoring.weights)?;
    let now = resolve_now(args.scoring.now, fixture.as_of);

    let repository = Arc::new(FixtureRepository::from_fixture(&fixture));
    let service = ExpertMatchingService::new(repository.clone(), weights);
    let ranked = service.rank(
        &fixture.question,
        &fixture.entities,
        now,
        config.scoring.rank_limit,
    )?;

    info!(ranked = ranked.results.len(), "demo pool ranked");

    if let Some(title) = fixture.question.title.as_deref() {
        println!("Question: {title}");
    }
    println!("Evaluated at {now}\n");

    let stdout = std::io::stdout();
    render(&ranked, repository.as_ref(), args.format, stdout.lock())
}
