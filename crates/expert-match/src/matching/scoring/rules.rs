use chrono::{DateTime, Utc};

use super::super::domain::{CandidateExpert, CategoryScore, EntitySet, ScoreDetail};
use super::config::{ScoringWeights, WeightLookup};
use super::normalize::{companies_match, fold_case};
use super::recency::{days_since, years_since};

fn fallback_note(lookup: WeightLookup) -> &'static str {
    if lookup.is_fallback() {
        " (unrecognised type, default weight)"
    } else {
        ""
    }
}

/// Best single employment match across target companies. Not summed.
pub(crate) fn employment_score(
    expert: &CandidateExpert,
    entities: &EntitySet,
    weights: &ScoringWeights,
    now: DateTime<Utc>,
) -> CategoryScore {
    let rubric = &weights.employment;
    let mut details = Vec::new();

    for company in &entities.companies {
        let current = expert
            .employment_history
            .iter()
            .find(|record| record.is_current && companies_match(&record.company, company));

        if let Some(record) = current {
            details.push(ScoreDetail {
                subject: record.company.clone(),
                score: rubric.current,
                notes: "currently employed".to_string(),
            });
            continue;
        }

        for record in expert
            .employment_history
            .iter()
            .filter(|record| !record.is_current && companies_match(&record.company, company))
        {
            let years = years_since(record.end_date, now);
            let score = (rubric.past_base - years * rubric.decay_per_year).max(rubric.past_floor);
            details.push(ScoreDetail {
                subject: record.company.clone(),
                score,
                notes: format!("former employee, left {years:.1} years ago"),
            });
        }
    }

    let score = details.iter().map(|detail| detail.score).fold(0.0, f64::max);
    CategoryScore { score, details }
}

/// Vendor and relationship proximity from active company relationships and trust-weighted
/// connections, summed then capped.
pub(crate) fn vendor_score(
    expert: &CandidateExpert,
    entities: &EntitySet,
    weights: &ScoringWeights,
) -> CategoryScore {
    let rubric = &weights.vendor;
    let mut details = Vec::new();

    for company in &entities.companies {
        for relationship in expert
            .active_relationships()
            .filter(|relationship| companies_match(&relationship.company, company))
        {
            let lookup = rubric.relationships.lookup(&relationship.relationship_type);
            details.push(ScoreDetail {
                subject: relationship.company.clone(),
                score: lookup.value(),
                notes: format!(
                    "{} relationship{}",
                    relationship.relationship_type,
                    fallback_note(lookup)
                ),
            });
        }

        for connection in expert
            .connections
            .iter()
            .filter(|connection| companies_match(&connection.company, company))
        {
            let lookup = rubric.relationships.lookup(&connection.relationship);
            let trust = connection.trust_level / 100.0;
            details.push(ScoreDetail {
                subject: connection.company.clone(),
                score: lookup.value() * trust,
                notes: format!(
                    "{} connection at trust {:.0}{}",
                    connection.relationship,
                    connection.trust_level,
                    fallback_note(lookup)
                ),
            });
        }
    }

    let total: f64 = details.iter().map(|detail| detail.score).sum();
    CategoryScore {
        score: total.min(rubric.cap),
        details,
    }
}

/// First-hand observations at target companies, weighted by type, recency and confidence.
pub(crate) fn observable_score(
    expert: &CandidateExpert,
    entities: &EntitySet,
    weights: &ScoringWeights,
    now: DateTime<Utc>,
) -> CategoryScore {
    let rubric = &weights.observable;
    let mut details = Vec::new();

    for company in &entities.companies {
        for pattern in expert
            .active_patterns()
            .filter(|pattern| companies_match(&pattern.company, company))
        {
            let lookup = rubric.pattern_types.lookup(&pattern.pattern_type);
            let days = days_since(pattern.last_observed, now);
            let recency = rubric.recency_bonus(days);
            let score = lookup.value() * recency * (pattern.confidence / 100.0);
            details.push(ScoreDetail {
                subject: pattern.company.clone(),
                score,
                notes: format!(
                    "{} observed {:.0} days ago at confidence {:.0}{}",
                    pattern.pattern_type,
                    days,
                    pattern.confidence,
                    fallback_note(lookup)
                ),
            });
        }
    }

    let total: f64 = details.iter().map(|detail| detail.score).sum();
    CategoryScore {
        score: total.min(rubric.cap),
        details,
    }
}

/// Two-tier proximity: an active observation at any target company counts as `same_city`
/// for every target location, otherwise `different_country`. Best location wins.
pub(crate) fn geography_score(
    expert: &CandidateExpert,
    entities: &EntitySet,
    weights: &ScoringWeights,
) -> CategoryScore {
    if entities.locations.is_empty() {
        return CategoryScore::empty();
    }

    let observes_target = expert.active_patterns().any(|pattern| {
        entities
            .companies
            .iter()
            .any(|company| companies_match(&pattern.company, company))
    });

    let proximity = if observes_target {
        "same_city"
    } else {
        "different_country"
    };
    let score = weights.geography.proximity.lookup(proximity).value();

    let details = entities
        .locations
        .iter()
        .map(|location| ScoreDetail {
            subject: location.name().to_string(),
            score,
            notes: proximity.to_string(),
        })
        .collect();

    CategoryScore { score, details }
}

/// Topic overlap scaled by proficiency plus flat credit for a matching primary industry.
pub(crate) fn expertise_score(
    expert: &CandidateExpert,
    entities: &EntitySet,
    weights: &ScoringWeights,
) -> CategoryScore {
    let rubric = &weights.expertise;
    let mut details = Vec::new();

    for area in &expert.expertise_areas {
        let value = fold_case(&area.value);
        if value.is_empty() {
            continue;
        }
        for topic in &entities.topics {
            let topic = fold_case(topic);
            if topic.is_empty() {
                continue;
            }
            if value.contains(&topic) || topic.contains(&value) {
                details.push(ScoreDetail {
                    subject: area.value.clone(),
                    score: rubric.topic_match * (area.proficiency_level / 100.0),
                    notes: format!(
                        "matches topic '{topic}' at proficiency {:.0}",
                        area.proficiency_level
                    ),
                });
            }
        }
    }

    if let Some(raw_primary) = expert.primary_industry.as_deref() {
        let primary = fold_case(raw_primary);
        for industry in &entities.industries {
            if !primary.is_empty() && fold_case(industry) == primary {
                details.push(ScoreDetail {
                    subject: raw_primary.trim().to_string(),
                    score: rubric.industry_match,
                    notes: "primary industry match".to_string(),
                });
            }
        }
    }

    let total: f64 = details.iter().map(|detail| detail.score).sum();
    CategoryScore {
        score: total.min(rubric.cap),
        details,
    }
}

/// Breadth of the expert's contacts at target companies, with a bonus for contacts already
/// on the platform.
pub(crate) fn network_score(
    expert: &CandidateExpert,
    entities: &EntitySet,
    weights: &ScoringWeights,
) -> CategoryScore {
    let rubric = &weights.network;
    let mut details = Vec::new();

    for company in &entities.companies {
        let at_company: Vec<_> = expert
            .connections
            .iter()
            .filter(|connection| companies_match(&connection.company, company))
            .collect();
        if at_company.is_empty() {
            continue;
        }

        let joined = at_company
            .iter()
            .filter(|connection| connection.connected_user_id.is_some())
            .count();
        let connection_score =
            (at_company.len() as f64 * rubric.per_connection).min(rubric.per_company_cap);
        let joined_bonus = joined as f64 * rubric.joined_bonus;

        details.push(ScoreDetail {
            subject: company.clone(),
            score: connection_score + joined_bonus,
            notes: format!(
                "{} connection(s), {} on platform",
                at_company.len(),
                joined
            ),
        });
    }

    let total: f64 = details.iter().map(|detail| detail.score).sum();
    CategoryScore {
        score: total.min(rubric.cap),
        details,
    }
}

/// Track record on the platform. Bounded by the input ranges rather than a cap.
pub(crate) fn performance_score(
    expert: &CandidateExpert,
    weights: &ScoringWeights,
) -> CategoryScore {
    let rubric = &weights.performance;

    let accuracy = expert.accuracy_score * rubric.accuracy_factor;
    let response_rate = expert.response_rate * rubric.response_rate_factor;
    let verification = f64::from(expert.verification_level) * rubric.verification_factor;
    let answers = expert.answer_history.len();
    let experience = (answers as f64 * rubric.per_answer).min(rubric.experience_cap);
    let speed = match expert.average_response_time {
        Some(hours) if hours < rubric.fast_response_hours => rubric.speed_bonus,
        _ => 0.0,
    };

    let details = vec![
        ScoreDetail {
            subject: "accuracy".to_string(),
            score: accuracy,
            notes: format!("accuracy score {:.0}", expert.accuracy_score),
        },
        ScoreDetail {
            subject: "response_rate".to_string(),
            score: response_rate,
            notes: format!("response rate {:.0}%", expert.response_rate * 100.0),
        },
        ScoreDetail {
            subject: "verification".to_string(),
            score: verification,
            notes: format!("verification level {}", expert.verification_level),
        },
        ScoreDetail {
            subject: "experience".to_string(),
            score: experience,
            notes: format!("{answers} prior answer(s)"),
        },
        ScoreDetail {
            subject: "speed".to_string(),
            score: speed,
            notes: match expert.average_response_time {
                Some(hours) => format!("average response {hours:.1}h"),
                None => "no response history".to_string(),
            },
        },
    ];

    CategoryScore {
        score: accuracy + response_rate + verification + experience + speed,
        details,
    }
}
