//! Multi-factor expert scoring.
//!
//! Seven independent category scores (employment, vendor, observable, geography, expertise,
//! network, performance) are summed, scaled by a trust/recency multiplier and rounded. The
//! rubric lives in [`ScoringWeights`] and the current instant is an argument, so a score is a
//! pure function of its inputs.

mod config;
pub(crate) mod normalize;
mod policy;
pub mod recency;
mod rules;

pub use config::{
    ConfidenceWeights, EmploymentWeights, ExpertiseWeights, GeographyWeights,
    MultiplierWeights, NetworkWeights, ObservableWeights, PerformanceWeights, RecencyTier,
    RecommendationThresholds, ScoringWeights, VendorWeights, WeightLookup, WeightTable,
    WeightsError,
};
pub use normalize::{companies_match, normalize_company};
pub use policy::classify;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::domain::{CandidateExpert, EntitySet, Question, ScoreCategory, ScoreResult};

/// Stateless scorer that applies a weight rubric to candidate experts.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn score(
        &self,
        expert: &CandidateExpert,
        question: &Question,
        entities: &EntitySet,
        now: DateTime<Utc>,
    ) -> ScoreResult {
        let weights = &self.weights;

        let mut breakdown = BTreeMap::new();
        breakdown.insert(
            ScoreCategory::Employment,
            rules::employment_score(expert, entities, weights, now),
        );
        breakdown.insert(
            ScoreCategory::Vendor,
            rules::vendor_score(expert, entities, weights),
        );
        breakdown.insert(
            ScoreCategory::Observable,
            rules::observable_score(expert, entities, weights, now),
        );
        breakdown.insert(
            ScoreCategory::Geography,
            rules::geography_score(expert, entities, weights),
        );
        breakdown.insert(
            ScoreCategory::Expertise,
            rules::expertise_score(expert, entities, weights),
        );
        breakdown.insert(
            ScoreCategory::Network,
            rules::network_score(expert, entities, weights),
        );
        breakdown.insert(
            ScoreCategory::Performance,
            rules::performance_score(expert, weights),
        );

        let base: f64 = breakdown.values().map(|entry| entry.score).sum();
        let multiplier = policy::multiplier(expert, question, weights, now);
        let total_score = (base * multiplier).round().max(0.0) as u32;
        let confidence = policy::confidence(&breakdown, &weights.confidence);
        let recommendation_level = classify(total_score, &weights.thresholds);

        debug!(
            expert_id = %expert.id,
            total_score,
            multiplier,
            confidence,
            recommendation = %recommendation_level,
            "scored candidate"
        );

        ScoreResult {
            expert_id: expert.id.clone(),
            total_score,
            breakdown,
            multiplier,
            confidence,
            recommendation_level,
        }
    }

    /// Score every expert and order by total score, highest first. Ties keep input order.
    pub fn rank<'a, I>(
        &self,
        experts: I,
        question: &Question,
        entities: &EntitySet,
        now: DateTime<Utc>,
    ) -> Vec<ScoreResult>
    where
        I: IntoIterator<Item = &'a CandidateExpert>,
    {
        let mut results: Vec<ScoreResult> = experts
            .into_iter()
            .map(|expert| self.score(expert, question, entities, now))
            .collect();
        sort_ranked(&mut results);
        results
    }
}

pub(crate) fn sort_ranked(results: &mut [ScoreResult]) {
    results.sort_by(|left, right| right.total_score.cmp(&left.total_score));
}
