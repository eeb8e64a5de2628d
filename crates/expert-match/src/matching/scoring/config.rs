use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Keyed weights with an explicit fallback for keys the table does not know.
///
/// Keys are trimmed and lowercased on the way in and on lookup, so `"Direct_Vendor"` and
/// `"direct_vendor"` hit the same entry. An override replaces the whole table, so `fallback`
/// is required when a table appears in a weights file; `entries` may be omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawWeightTable")]
pub struct WeightTable {
    entries: BTreeMap<String, f64>,
    fallback: f64,
}

#[derive(Deserialize)]
struct RawWeightTable {
    #[serde(default)]
    entries: BTreeMap<String, f64>,
    fallback: f64,
}

impl From<RawWeightTable> for WeightTable {
    fn from(raw: RawWeightTable) -> Self {
        WeightTable::new(raw.entries, raw.fallback)
    }
}

/// Result of a [`WeightTable`] lookup; `Fallback` marks an unrecognised key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightLookup {
    Known(f64),
    Fallback(f64),
}

impl WeightLookup {
    pub fn value(self) -> f64 {
        match self {
            WeightLookup::Known(value) | WeightLookup::Fallback(value) => value,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, WeightLookup::Fallback(_))
    }
}

impl WeightTable {
    pub fn new<I, K>(entries: I, fallback: f64) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, value)| (normalize_key(key.as_ref()), value))
                .collect(),
            fallback,
        }
    }

    pub fn lookup(&self, key: &str) -> WeightLookup {
        match self.entries.get(&normalize_key(key)) {
            Some(value) => WeightLookup::Known(*value),
            None => WeightLookup::Fallback(self.fallback),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.get(&normalize_key(key)).copied()
    }

    pub fn fallback(&self) -> f64 {
        self.fallback
    }

    pub fn max_value(&self) -> f64 {
        self.entries
            .values()
            .copied()
            .fold(self.fallback, f64::max)
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Current employer scores flat; former employers decay linearly per year since leaving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmploymentWeights {
    pub current: f64,
    pub past_base: f64,
    pub decay_per_year: f64,
    pub past_floor: f64,
}

impl Default for EmploymentWeights {
    fn default() -> Self {
        Self {
            current: 100.0,
            past_base: 80.0,
            decay_per_year: 10.0,
            past_floor: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorWeights {
    /// Keyed by relationship type; shared by company relationships and connections.
    pub relationships: WeightTable,
    pub cap: f64,
}

impl Default for VendorWeights {
    fn default() -> Self {
        Self {
            relationships: WeightTable::new(
                [
                    ("direct_vendor", 70.0),
                    ("logistics_provider", 65.0),
                    ("service_provider", 60.0),
                    ("competitor", 50.0),
                    ("industry_peer", 40.0),
                ],
                30.0,
            ),
            cap: 70.0,
        }
    }
}

/// Recency multiplier applied to a pattern observed fewer than `max_days` days ago.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecencyTier {
    pub max_days: f64,
    pub bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservableWeights {
    /// Keyed by pattern type (`TRAFFIC`, `FINANCIAL`, ...).
    pub pattern_types: WeightTable,
    /// Checked in order; first tier whose `max_days` exceeds the age wins.
    pub recency_tiers: Vec<RecencyTier>,
    pub stale_bonus: f64,
    pub cap: f64,
}

impl ObservableWeights {
    pub fn recency_bonus(&self, days: f64) -> f64 {
        self.recency_tiers
            .iter()
            .find(|tier| days < tier.max_days)
            .map(|tier| tier.bonus)
            .unwrap_or(self.stale_bonus)
    }
}

impl Default for ObservableWeights {
    fn default() -> Self {
        Self {
            pattern_types: WeightTable::new(
                [
                    ("TRAFFIC", 15.0),
                    ("FACILITY", 20.0),
                    ("SUPPLY_CHAIN", 25.0),
                    ("WORKFORCE", 20.0),
                    ("FINANCIAL", 30.0),
                    ("TECHNOLOGY", 15.0),
                ],
                10.0,
            ),
            recency_tiers: vec![
                RecencyTier {
                    max_days: 30.0,
                    bonus: 1.2,
                },
                RecencyTier {
                    max_days: 90.0,
                    bonus: 1.0,
                },
                RecencyTier {
                    max_days: 180.0,
                    bonus: 0.8,
                },
            ],
            stale_bonus: 0.6,
            cap: 80.0,
        }
    }
}

/// Proximity tiers. Only `same_city` and `different_country` are produced by the current
/// geography rule; the remaining tiers are carried so overrides stay round-trippable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeographyWeights {
    pub proximity: WeightTable,
}

impl Default for GeographyWeights {
    fn default() -> Self {
        Self {
            proximity: WeightTable::new(
                [
                    ("same_facility", 50.0),
                    ("same_city", 40.0),
                    ("same_region", 30.0),
                    ("same_state", 20.0),
                    ("same_country", 10.0),
                    ("different_country", 0.0),
                ],
                0.0,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpertiseWeights {
    /// Scaled by proficiency / 100.
    pub topic_match: f64,
    pub industry_match: f64,
    pub cap: f64,
}

impl Default for ExpertiseWeights {
    fn default() -> Self {
        Self {
            topic_match: 15.0,
            industry_match: 30.0,
            cap: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkWeights {
    pub per_connection: f64,
    pub per_company_cap: f64,
    pub joined_bonus: f64,
    pub cap: f64,
}

impl Default for NetworkWeights {
    fn default() -> Self {
        Self {
            per_connection: 5.0,
            per_company_cap: 20.0,
            joined_bonus: 3.0,
            cap: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceWeights {
    pub accuracy_factor: f64,
    pub response_rate_factor: f64,
    pub verification_factor: f64,
    pub per_answer: f64,
    pub experience_cap: f64,
    pub fast_response_hours: f64,
    pub speed_bonus: f64,
}

impl Default for PerformanceWeights {
    fn default() -> Self {
        Self {
            accuracy_factor: 0.2,
            response_rate_factor: 10.0,
            verification_factor: 5.0,
            per_answer: 2.0,
            experience_cap: 20.0,
            fast_response_hours: 24.0,
            speed_bonus: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiplierWeights {
    pub verified_account: f64,
    pub linkedin_verified: f64,
    pub active_within_week: f64,
    pub active_within_month: f64,
    pub fresh_observation: f64,
    pub fresh_observation_days: f64,
    pub priority_question: f64,
}

impl Default for MultiplierWeights {
    fn default() -> Self {
        Self {
            verified_account: 1.1,
            linkedin_verified: 1.1,
            active_within_week: 1.15,
            active_within_month: 1.05,
            fresh_observation: 1.2,
            fresh_observation_days: 30.0,
            priority_question: 1.2,
        }
    }
}

/// Per-category weight used when averaging signal strength into a confidence estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    pub employment: f64,
    pub vendor: f64,
    pub observable: f64,
    pub network: f64,
    pub per_signal_bonus: f64,
    pub max_signal_bonus: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            employment: 1.0,
            vendor: 0.8,
            observable: 0.9,
            network: 0.6,
            per_signal_bonus: 0.1,
            max_signal_bonus: 0.3,
        }
    }
}

/// Inclusive lower bounds on the rounded total score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    pub highly_recommended: u32,
    pub recommended: u32,
    pub suitable: u32,
    pub possible: u32,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            highly_recommended: 150,
            recommended: 100,
            suitable: 50,
            possible: 25,
        }
    }
}

/// Complete rubric consumed by the scoring engine. Immutable once built; a partial JSON
/// document deserialises with every missing field taken from [`ScoringWeights::standard`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub employment: EmploymentWeights,
    pub vendor: VendorWeights,
    pub observable: ObservableWeights,
    pub geography: GeographyWeights,
    pub expertise: ExpertiseWeights,
    pub network: NetworkWeights,
    pub performance: PerformanceWeights,
    pub multipliers: MultiplierWeights,
    pub confidence: ConfidenceWeights,
    pub thresholds: RecommendationThresholds,
}

impl ScoringWeights {
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, WeightsError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| WeightsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| WeightsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug)]
pub enum WeightsError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for WeightsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightsError::Read { path, .. } => {
                write!(f, "unable to read weights file {}", path.display())
            }
            WeightsError::Parse { path, source } => {
                write!(f, "invalid weights file {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for WeightsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WeightsError::Read { source, .. } => Some(source),
            WeightsError::Parse { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_relationship_type_uses_fallback() {
        let weights = ScoringWeights::standard();
        let lookup = weights.vendor.relationships.lookup("former_classmate");
        assert_eq!(lookup, WeightLookup::Fallback(30.0));
        assert!(lookup.is_fallback());
    }

    #[test]
    fn lookups_ignore_case_and_padding() {
        let weights = ScoringWeights::standard();
        assert_eq!(
            weights.vendor.relationships.lookup(" Direct_Vendor "),
            WeightLookup::Known(70.0)
        );
        assert_eq!(
            weights.observable.pattern_types.lookup("supply_chain"),
            WeightLookup::Known(25.0)
        );
        assert_eq!(
            weights.observable.pattern_types.lookup("SATELLITE"),
            WeightLookup::Fallback(10.0)
        );
    }

    #[test]
    fn recency_tiers_step_down() {
        let observable = ObservableWeights::default();
        assert_eq!(observable.recency_bonus(0.0), 1.2);
        assert_eq!(observable.recency_bonus(29.9), 1.2);
        assert_eq!(observable.recency_bonus(30.0), 1.0);
        assert_eq!(observable.recency_bonus(89.0), 1.0);
        assert_eq!(observable.recency_bonus(90.0), 0.8);
        assert_eq!(observable.recency_bonus(180.0), 0.6);
        assert_eq!(observable.recency_bonus(999.0), 0.6);
    }

    #[test]
    fn dormant_proximity_tiers_are_present() {
        let geography = GeographyWeights::default();
        assert_eq!(geography.proximity.get("same_facility"), Some(50.0));
        assert_eq!(geography.proximity.get("same_region"), Some(30.0));
        assert_eq!(geography.proximity.get("same_state"), Some(20.0));
        assert_eq!(geography.proximity.get("same_country"), Some(10.0));
        assert_eq!(geography.proximity.max_value(), 50.0);
    }

    #[test]
    fn partial_override_keeps_standard_values() {
        let weights = ScoringWeights::from_json(
            r#"{ "network": { "cap": 25.0 }, "thresholds": { "possible": 10 } }"#,
        )
        .expect("partial override parses");

        assert_eq!(weights.network.cap, 25.0);
        assert_eq!(weights.network.per_connection, 5.0);
        assert_eq!(weights.thresholds.possible, 10);
        assert_eq!(weights.thresholds.highly_recommended, 150);
        assert_eq!(weights.employment, EmploymentWeights::default());
    }

    #[test]
    fn override_table_keys_are_normalised() {
        let weights = ScoringWeights::from_json(
            r#"{ "observable": { "pattern_types": { "entries": { "SATELLITE": 35.0 }, "fallback": 5.0 } } }"#,
        )
        .expect("override parses");

        assert_eq!(
            weights.observable.pattern_types.lookup("satellite"),
            WeightLookup::Known(35.0)
        );
        assert_eq!(
            weights.observable.pattern_types.lookup("FINANCIAL"),
            WeightLookup::Fallback(5.0)
        );
    }

    #[test]
    fn table_override_without_fallback_is_rejected() {
        let err = ScoringWeights::from_json(
            r#"{ "vendor": { "relationships": { "entries": { "direct_vendor": 70, "partner": 45 } } } }"#,
        )
        .expect_err("fallback is required");
        assert!(err.to_string().contains("fallback"));
    }

    #[test]
    fn table_override_with_fallback_keeps_unknown_types_weighted() {
        let weights = ScoringWeights::from_json(
            r#"{ "vendor": { "relationships": { "entries": { "direct_vendor": 70, "partner": 45 }, "fallback": 30 } } }"#,
        )
        .expect("override parses");

        let relationships = &weights.vendor.relationships;
        assert_eq!(relationships.lookup("partner"), WeightLookup::Known(45.0));
        assert_eq!(relationships.lookup("unknown_kind"), WeightLookup::Fallback(30.0));
        assert_eq!(relationships.get("competitor"), None);
        assert_eq!(weights.vendor.cap, 70.0);
    }

    #[test]
    fn standard_weights_round_trip_through_json() {
        let weights = ScoringWeights::standard();
        let raw = serde_json::to_string(&weights).expect("serializes");
        assert_eq!(ScoringWeights::from_json(&raw).expect("parses"), weights);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ScoringWeights::from_path("/definitely/not/here/weights.json")
            .expect_err("missing file");
        assert!(matches!(err, WeightsError::Read { .. }));
        assert!(err.to_string().contains("weights.json"));
    }
}
