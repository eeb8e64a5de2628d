//! Expert matching: the candidate data model, the scoring engine and the service that ranks a
//! candidate pool loaded through an [`ExpertRepository`].

pub mod domain;
pub mod repository;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AnswerRecord, CandidateExpert, CategoryScore, CompanyRelationship, Connection,
    EmploymentRecord, EntitySet, ExpertAccount, ExpertId, ExpertiseArea, ObservablePattern,
    Question, RecommendationLevel, ScoreCategory, ScoreDetail, ScoreResult, TargetLocation,
};
pub use repository::{ExpertRepository, RepositoryError};
pub use scoring::{ScoringEngine, ScoringWeights};
pub use service::{ExpertMatchingService, MatchingServiceError, RankedCandidates, SkippedCandidate};
