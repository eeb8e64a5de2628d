use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::matching::domain::{
    AnswerRecord, CandidateExpert, CompanyRelationship, Connection, EmploymentRecord,
    ExpertId, ExpertiseArea, ObservablePattern,
};
use crate::matching::repository::{ExpertRepository, RepositoryError};
use crate::matching::scoring::{ScoringEngine, ScoringWeights};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid now")
}

pub(super) fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::new(ScoringWeights::standard())
}

pub(super) fn current_job(company: &str) -> EmploymentRecord {
    EmploymentRecord {
        company: company.to_string(),
        title: Some("Operations Manager".to_string()),
        is_current: true,
        start_date: Some(days_ago(900)),
        end_date: None,
    }
}

pub(super) fn past_job(company: &str, left: DateTime<Utc>) -> EmploymentRecord {
    EmploymentRecord {
        company: company.to_string(),
        title: Some("Analyst".to_string()),
        is_current: false,
        start_date: Some(left - Duration::days(1_000)),
        end_date: Some(left),
    }
}

pub(super) fn connection(company: &str, relationship: &str, trust: f64) -> Connection {
    Connection {
        company: company.to_string(),
        relationship: relationship.to_string(),
        trust_level: trust,
        connected_user_id: None,
    }
}

pub(super) fn joined_connection(company: &str, user: &str) -> Connection {
    Connection {
        connected_user_id: Some(user.to_string()),
        ..connection(company, "industry_peer", 50.0)
    }
}

pub(super) fn relationship(company: &str, kind: &str) -> CompanyRelationship {
    CompanyRelationship {
        company: company.to_string(),
        relationship_type: kind.to_string(),
        is_active: true,
    }
}

pub(super) fn pattern(
    company: &str,
    kind: &str,
    confidence: f64,
    observed: DateTime<Utc>,
) -> ObservablePattern {
    ObservablePattern {
        company: company.to_string(),
        pattern_type: kind.to_string(),
        category: Some("operations".to_string()),
        confidence,
        last_observed: Some(observed),
        is_active: true,
    }
}

pub(super) fn expertise(value: &str, proficiency: f64) -> ExpertiseArea {
    ExpertiseArea {
        kind: "topic".to_string(),
        value: value.to_string(),
        proficiency_level: proficiency,
    }
}

pub(super) fn answers(count: usize) -> Vec<AnswerRecord> {
    (0..count)
        .map(|index| AnswerRecord {
            id: Some(format!("ans-{index}")),
            question_id: None,
        })
        .collect()
}

/// Mid-career expert with a little of everything at Acme.
pub(super) fn seasoned_expert(id: &str) -> CandidateExpert {
    let mut expert = CandidateExpert::new(id);
    expert.accuracy_score = 90.0;
    expert.response_rate = 0.8;
    expert.verification_level = 3;
    expert.average_response_time = Some(12.0);
    expert.last_active_at = Some(days_ago(2));
    expert.primary_industry = Some("Logistics".to_string());
    expert.employment_history = vec![past_job("Acme Corp", days_ago(365))];
    expert.connections = vec![connection("Acme", "direct_vendor", 50.0)];
    expert.expertise_areas = vec![expertise("freight logistics", 80.0)];
    expert.observable_patterns = vec![pattern("ACME", "TRAFFIC", 60.0, days_ago(100))];
    expert.answer_history = answers(3);
    expert
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    experts: Mutex<HashMap<ExpertId, CandidateExpert>>,
    order: Mutex<Vec<ExpertId>>,
    broken: Mutex<Vec<ExpertId>>,
    unavailable: bool,
}

impl MemoryRepository {
    pub(super) fn with_experts(experts: Vec<CandidateExpert>) -> Self {
        let repository = Self::default();
        for expert in experts {
            repository.add(expert);
        }
        repository
    }

    pub(super) fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub(super) fn add(&self, expert: CandidateExpert) {
        self.order
            .lock()
            .expect("order mutex poisoned")
            .push(expert.id.clone());
        self.experts
            .lock()
            .expect("repository mutex poisoned")
            .insert(expert.id.clone(), expert);
    }

    /// Listed in the pool but fails to load.
    pub(super) fn add_broken(&self, id: &str) {
        let id = ExpertId::from(id);
        self.order
            .lock()
            .expect("order mutex poisoned")
            .push(id.clone());
        self.broken.lock().expect("broken mutex poisoned").push(id);
    }

    /// Listed in the pool with no profile behind it.
    pub(super) fn add_dangling(&self, id: &str) {
        self.order
            .lock()
            .expect("order mutex poisoned")
            .push(ExpertId::from(id));
    }
}

impl ExpertRepository for MemoryRepository {
    fn fetch(&self, id: &ExpertId) -> Result<Option<CandidateExpert>, RepositoryError> {
        if self
            .broken
            .lock()
            .expect("broken mutex poisoned")
            .contains(id)
        {
            return Err(RepositoryError::Corrupt {
                expert_id: id.clone(),
                reason: "employment history join failed".to_string(),
            });
        }
        let guard = self.experts.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn candidate_pool(&self) -> Result<Vec<ExpertId>, RepositoryError> {
        if self.unavailable {
            return Err(RepositoryError::Unavailable("connection refused".to_string()));
        }
        let guard = self.order.lock().expect("order mutex poisoned");
        Ok(guard.clone())
    }
}
