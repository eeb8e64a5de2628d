use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::super::domain::{
    CandidateExpert, CategoryScore, Question, RecommendationLevel, ScoreCategory,
};
use super::config::{ConfidenceWeights, RecommendationThresholds, ScoringWeights};
use super::recency::days_since;

/// Trust and recency adjustment applied to the summed category scores.
pub(crate) fn multiplier(
    expert: &CandidateExpert,
    question: &Question,
    weights: &ScoringWeights,
    now: DateTime<Utc>,
) -> f64 {
    let rubric = &weights.multipliers;
    let mut multiplier = 1.0;

    if expert.user.is_verified {
        multiplier *= rubric.verified_account;
    }
    if expert.linkedin_verified {
        multiplier *= rubric.linkedin_verified;
    }

    let inactive_days = days_since(expert.last_active_at, now);
    if inactive_days < 7.0 {
        multiplier *= rubric.active_within_week;
    } else if inactive_days < 30.0 {
        multiplier *= rubric.active_within_month;
    }

    let fresh_observation = expert
        .active_patterns()
        .any(|pattern| days_since(pattern.last_observed, now) < rubric.fresh_observation_days);
    if fresh_observation {
        multiplier *= rubric.fresh_observation;
    }

    if question.is_top3 {
        multiplier *= rubric.priority_question;
    }

    multiplier
}

/// Confidence from how many relationship signals fired and how strong they were on average.
pub(crate) fn confidence(
    breakdown: &BTreeMap<ScoreCategory, CategoryScore>,
    weights: &ConfidenceWeights,
) -> f64 {
    let signal_weights = [
        (ScoreCategory::Employment, weights.employment),
        (ScoreCategory::Vendor, weights.vendor),
        (ScoreCategory::Observable, weights.observable),
        (ScoreCategory::Network, weights.network),
    ];

    let mut signals = 0u32;
    let mut total_weight = 0.0;
    for (category, weight) in signal_weights {
        if let Some(entry) = breakdown.get(&category).filter(|entry| entry.is_positive()) {
            signals += 1;
            total_weight += entry.score * weight;
        }
    }

    if signals == 0 {
        return 0.0;
    }

    let average = total_weight / f64::from(signals);
    let signal_bonus = (f64::from(signals) * weights.per_signal_bonus).min(weights.max_signal_bonus);
    (average / 100.0 + signal_bonus).min(1.0)
}

/// Tier for a rounded total. Thresholds are inclusive lower bounds.
pub fn classify(total_score: u32, thresholds: &RecommendationThresholds) -> RecommendationLevel {
    if total_score >= thresholds.highly_recommended {
        RecommendationLevel::HighlyRecommended
    } else if total_score >= thresholds.recommended {
        RecommendationLevel::Recommended
    } else if total_score >= thresholds.suitable {
        RecommendationLevel::Suitable
    } else if total_score >= thresholds.possible {
        RecommendationLevel::Possible
    } else {
        RecommendationLevel::LowMatch
    }
}
