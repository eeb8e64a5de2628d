use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{EntitySet, ExpertId, Question, ScoreResult};
use super::repository::{ExpertRepository, RepositoryError};
use super::scoring::{sort_ranked, ScoringEngine, ScoringWeights};

/// Service composing the expert repository and the scoring engine.
pub struct ExpertMatchingService<R> {
    repository: Arc<R>,
    engine: Arc<ScoringEngine>,
}

/// Candidate left out of a ranking because its profile could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedCandidate {
    pub expert_id: ExpertId,
    pub reason: String,
}

/// Ranked scores, highest first, plus the candidates that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankedCandidates {
    pub results: Vec<ScoreResult>,
    pub skipped: Vec<SkippedCandidate>,
}

impl RankedCandidates {
    pub fn top(&self) -> Option<&ScoreResult> {
        self.results.first()
    }
}

impl<R> ExpertMatchingService<R>
where
    R: ExpertRepository + 'static,
{
    pub fn new(repository: Arc<R>, weights: ScoringWeights) -> Self {
        Self {
            repository,
            engine: Arc::new(ScoringEngine::new(weights)),
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Score a single expert against a question.
    pub fn score_candidate(
        &self,
        expert_id: &ExpertId,
        question: &Question,
        entities: &EntitySet,
        now: DateTime<Utc>,
    ) -> Result<ScoreResult, MatchingServiceError> {
        let expert = self
            .repository
            .fetch(expert_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(self.engine.score(&expert, question, entities, now))
    }

    /// Score the repository's candidate pool and order it by total score.
    ///
    /// A candidate whose profile fails to load is skipped and reported rather than failing the
    /// whole ranking. `limit` truncates the ranked list after sorting.
    pub fn rank(
        &self,
        question: &Question,
        entities: &EntitySet,
        now: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<RankedCandidates, MatchingServiceError> {
        let pool = self.repository.candidate_pool()?;
        let mut ranked = RankedCandidates::default();

        for expert_id in pool {
            match self.repository.fetch(&expert_id) {
                Ok(Some(expert)) => {
                    ranked
                        .results
                        .push(self.engine.score(&expert, question, entities, now));
                }
                Ok(None) => {
                    warn!(%expert_id, "candidate missing from repository, skipping");
                    ranked.skipped.push(SkippedCandidate {
                        expert_id,
                        reason: RepositoryError::NotFound.to_string(),
                    });
                }
                Err(err) => {
                    warn!(%expert_id, error = %err, "candidate failed to load, skipping");
                    ranked.skipped.push(SkippedCandidate {
                        expert_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        sort_ranked(&mut ranked.results);
        if let Some(limit) = limit {
            ranked.results.truncate(limit);
        }

        info!(
            question = question.id.as_deref().unwrap_or("-"),
            ranked = ranked.results.len(),
            skipped = ranked.skipped.len(),
            "ranked candidate pool"
        );

        Ok(ranked)
    }
}

/// Error raised by the matching service.
#[derive(Debug, thiserror::Error)]
pub enum MatchingServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
