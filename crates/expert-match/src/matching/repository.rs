use super::domain::{CandidateExpert, ExpertId};

/// Data-access collaborator returning fully populated expert aggregates.
///
/// Implementations load every nested relation the rubric reads; whether that comes from a
/// database, a cache or a fixture file is invisible to scoring.
pub trait ExpertRepository: Send + Sync {
    fn fetch(&self, id: &ExpertId) -> Result<Option<CandidateExpert>, RepositoryError>;
    /// Every candidate id, in the order ties should keep after ranking.
    fn candidate_pool(&self) -> Result<Vec<ExpertId>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("expert not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("expert {expert_id} could not be loaded: {reason}")]
    Corrupt { expert_id: ExpertId, reason: String },
}
