use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use expert_match::error::AppError;
use expert_match::matching::scoring::recency::{
    lenient_timestamp, null_as_default, parse_timestamp,
};
use expert_match::matching::{
    CandidateExpert, EntitySet, ExpertId, ExpertRepository, Question, RepositoryError,
};
use serde::Deserialize;
use tracing::warn;

/// Ranking input: one question, its extracted entities and the candidate pool.
///
/// Candidates stay as raw JSON until the repository loads them, so one malformed profile is
/// reported as a skipped candidate instead of rejecting the whole file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RankingFixture {
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub(crate) as_of: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) question: Question,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) entities: EntitySet,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) candidates: Vec<serde_json::Value>,
}

impl RankingFixture {
    pub(crate) fn from_json(raw: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(raw)?)
    }
}

pub(crate) fn load_fixture(path: &Path) -> Result<RankingFixture, AppError> {
    let raw = std::fs::read_to_string(path)?;
    RankingFixture::from_json(&raw)
}

enum FixtureEntry {
    Loaded(Box<CandidateExpert>),
    Malformed(String),
}

/// Read-only repository over the candidates in a [`RankingFixture`].
pub(crate) struct FixtureRepository {
    order: Vec<ExpertId>,
    entries: HashMap<ExpertId, FixtureEntry>,
}

impl FixtureRepository {
    pub(crate) fn from_fixture(fixture: &RankingFixture) -> Self {
        let mut order = Vec::with_capacity(fixture.candidates.len());
        let mut entries = HashMap::with_capacity(fixture.candidates.len());

        for (index, raw) in fixture.candidates.iter().enumerate() {
            let id = raw
                .get("id")
                .and_then(|value| value.as_str())
                .map(ExpertId::from)
                .unwrap_or_else(|| ExpertId(format!("candidate-{}", index + 1)));

            let entry = match serde_json::from_value::<CandidateExpert>(raw.clone()) {
                Ok(expert) => FixtureEntry::Loaded(Box::new(expert)),
                Err(err) => {
                    warn!(expert_id = %id, error = %err, "malformed candidate in fixture");
                    FixtureEntry::Malformed(err.to_string())
                }
            };

            if entries.insert(id.clone(), entry).is_none() {
                order.push(id);
            }
        }

        Self { order, entries }
    }

    /// Display name for table output, falling back to the id.
    pub(crate) fn label(&self, id: &ExpertId) -> String {
        match self.entries.get(id) {
            Some(FixtureEntry::Loaded(expert)) => expert.label().to_string(),
            _ => id.to_string(),
        }
    }
}

impl ExpertRepository for FixtureRepository {
    fn fetch(&self, id: &ExpertId) -> Result<Option<CandidateExpert>, RepositoryError> {
        match self.entries.get(id) {
            Some(FixtureEntry::Loaded(expert)) => Ok(Some(expert.as_ref().clone())),
            Some(FixtureEntry::Malformed(reason)) => Err(RepositoryError::Corrupt {
                expert_id: id.clone(),
                reason: reason.clone(),
            }),
            None => Ok(None),
        }
    }

    fn candidate_pool(&self) -> Result<Vec<ExpertId>, RepositoryError> {
        Ok(self.order.clone())
    }
}

pub(crate) fn parse_now(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw)
        .ok_or_else(|| format!("failed to parse '{raw}' as YYYY-MM-DD or RFC 3339 timestamp"))
}
