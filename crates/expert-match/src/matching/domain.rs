use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::scoring::recency::{lenient_timestamp, null_as_default};

/// Identifier wrapper for expert profiles.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpertId(pub String);

impl fmt::Display for ExpertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExpertId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Expert profile with every nested relation the scoring rubric reads.
///
/// Shaped after the aggregate returned by the data-access collaborator, so collections and
/// scalars read a missing key or `null` as their default and date fields tolerate unparsable
/// values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateExpert {
    pub id: ExpertId,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Historical answer accuracy, 0-100.
    #[serde(default, deserialize_with = "null_as_default")]
    pub accuracy_score: f64,
    /// Share of invitations answered, 0-1.
    #[serde(default, deserialize_with = "null_as_default")]
    pub response_rate: f64,
    /// Verification tier, 0-4.
    #[serde(default, deserialize_with = "null_as_default")]
    pub verification_level: u8,
    /// Mean hours to answer.
    #[serde(default)]
    pub average_response_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_active_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub linkedin_verified: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: ExpertAccount,
    #[serde(default)]
    pub primary_industry: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub employment_history: Vec<EmploymentRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub connections: Vec<Connection>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expertise_areas: Vec<ExpertiseArea>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_relationships: Vec<CompanyRelationship>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub observable_patterns: Vec<ObservablePattern>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer_history: Vec<AnswerRecord>,
}

impl CandidateExpert {
    /// Bare profile with no history; mostly useful for building fixtures.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ExpertId(id.into()),
            display_name: None,
            accuracy_score: 0.0,
            response_rate: 0.0,
            verification_level: 0,
            average_response_time: None,
            last_active_at: None,
            linkedin_verified: false,
            user: ExpertAccount::default(),
            primary_industry: None,
            employment_history: Vec::new(),
            connections: Vec::new(),
            expertise_areas: Vec::new(),
            company_relationships: Vec::new(),
            observable_patterns: Vec::new(),
            answer_history: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id.0)
    }

    pub fn active_patterns(&self) -> impl Iterator<Item = &ObservablePattern> {
        self.observable_patterns
            .iter()
            .filter(|pattern| pattern.is_active)
    }

    pub fn active_relationships(&self) -> impl Iterator<Item = &CompanyRelationship> {
        self.company_relationships
            .iter()
            .filter(|relationship| relationship.is_active)
    }
}

/// Platform account flags attached to the expert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertAccount {
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentRecord {
    pub company: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_current: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub end_date: Option<DateTime<Utc>>,
}

/// Person the expert knows at a company. `relationship` is a free-text type key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationship: String,
    /// 0-100.
    #[serde(default, deserialize_with = "null_as_default")]
    pub trust_level: f64,
    /// Set once the contact has joined the platform.
    #[serde(default)]
    pub connected_user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertiseArea {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    pub value: String,
    /// 0-100.
    #[serde(default, deserialize_with = "null_as_default")]
    pub proficiency_level: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRelationship {
    pub company: String,
    pub relationship_type: String,
    #[serde(default = "default_active", deserialize_with = "null_as_active")]
    pub is_active: bool,
}

/// Something the expert can see first-hand at a company (traffic, facilities, hiring).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservablePattern {
    pub company: String,
    pub pattern_type: String,
    #[serde(default)]
    pub category: Option<String>,
    /// 0-100.
    #[serde(default, deserialize_with = "null_as_default")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_observed: Option<DateTime<Utc>>,
    #[serde(default = "default_active", deserialize_with = "null_as_active")]
    pub is_active: bool,
}

/// Prior answer; only the count feeds scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub question_id: Option<String>,
}

fn default_active() -> bool {
    true
}

fn null_as_active<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_else(default_active))
}

/// Research question being routed. Only the priority flag affects scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "isTop3", deserialize_with = "null_as_default")]
    pub is_top3: bool,
}

/// Target location as produced by entity extraction: either `{ "name": .. }` or a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetLocation {
    Named { name: String },
    Plain(String),
}

impl TargetLocation {
    pub fn name(&self) -> &str {
        match self {
            TargetLocation::Named { name } => name,
            TargetLocation::Plain(name) => name,
        }
    }
}

/// Entities extracted from the question text by an upstream collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySet {
    #[serde(default, deserialize_with = "null_as_default")]
    pub companies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<TargetLocation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub industries: Vec<String>,
}

impl EntitySet {
    pub fn for_companies<I, S>(companies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            companies: companies.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// The seven scoring categories, in rubric order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    Employment,
    Vendor,
    Observable,
    Geography,
    Expertise,
    Network,
    Performance,
}

impl ScoreCategory {
    pub const ALL: [ScoreCategory; 7] = [
        ScoreCategory::Employment,
        ScoreCategory::Vendor,
        ScoreCategory::Observable,
        ScoreCategory::Geography,
        ScoreCategory::Expertise,
        ScoreCategory::Network,
        ScoreCategory::Performance,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ScoreCategory::Employment => "employment",
            ScoreCategory::Vendor => "vendor",
            ScoreCategory::Observable => "observable",
            ScoreCategory::Geography => "geography",
            ScoreCategory::Expertise => "expertise",
            ScoreCategory::Network => "network",
            ScoreCategory::Performance => "performance",
        }
    }
}

/// One matched record contributing to a category, kept for audit trails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDetail {
    pub subject: String,
    pub score: f64,
    pub notes: String,
}

/// Score for one category after caps, plus the matches that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub score: f64,
    pub details: Vec<ScoreDetail>,
}

impl CategoryScore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_positive(&self) -> bool {
        self.score > 0.0
    }
}

/// Recommendation tier derived from the rounded total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationLevel {
    LowMatch,
    Possible,
    Suitable,
    Recommended,
    HighlyRecommended,
}

impl RecommendationLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RecommendationLevel::HighlyRecommended => "HIGHLY_RECOMMENDED",
            RecommendationLevel::Recommended => "RECOMMENDED",
            RecommendationLevel::Suitable => "SUITABLE",
            RecommendationLevel::Possible => "POSSIBLE",
            RecommendationLevel::LowMatch => "LOW_MATCH",
        }
    }
}

impl fmt::Display for RecommendationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scoring output for one candidate against one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub expert_id: ExpertId,
    pub total_score: u32,
    pub breakdown: BTreeMap<ScoreCategory, CategoryScore>,
    pub multiplier: f64,
    pub confidence: f64,
    pub recommendation_level: RecommendationLevel,
}

impl ScoreResult {
    /// Capped score for a category; zero if the category is absent.
    pub fn category_score(&self, category: ScoreCategory) -> f64 {
        self.breakdown
            .get(&category)
            .map(|entry| entry.score)
            .unwrap_or(0.0)
    }

    /// Sum of the seven category scores before the multiplier.
    pub fn base_score(&self) -> f64 {
        self.breakdown.values().map(|entry| entry.score).sum()
    }
}
