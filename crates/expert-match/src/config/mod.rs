use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::matching::scoring::{ScoringWeights, WeightsError};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }

    /// Log level used when `APP_LOG_LEVEL` is unset.
    pub const fn default_log_level(self) -> &'static str {
        match self {
            Self::Development => "info",
            Self::Test | Self::Production => "warn",
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL")
            .unwrap_or_else(|_| environment.default_log_level().to_string());

        let weights_path = env::var("EXPERT_MATCH_WEIGHTS")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let rank_limit = match env::var("EXPERT_MATCH_RANK_LIMIT") {
            Ok(raw) => Some(parse_rank_limit(&raw)?),
            Err(_) => None,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig {
                weights_path,
                rank_limit,
            },
        })
    }

    /// Standard weights, or the override file named by `EXPERT_MATCH_WEIGHTS`.
    pub fn scoring_weights(&self) -> Result<ScoringWeights, ConfigError> {
        match &self.scoring.weights_path {
            Some(path) => ScoringWeights::from_path(path).map_err(ConfigError::Weights),
            None => Ok(ScoringWeights::standard()),
        }
    }
}

fn parse_rank_limit(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(ConfigError::InvalidRankLimit(raw.to_string())),
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where scoring weights come from and how many ranked candidates to keep.
#[derive(Debug, Clone, Default)]
pub struct ScoringConfig {
    pub weights_path: Option<PathBuf>,
    pub rank_limit: Option<usize>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidRankLimit(String),
    Weights(WeightsError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidRankLimit(raw) => write!(
                f,
                "EXPERT_MATCH_RANK_LIMIT must be a positive integer (got '{raw}')"
            ),
            ConfigError::Weights(err) => write!(f, "scoring weights: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidRankLimit(_) => None,
            ConfigError::Weights(err) => Some(err),
        }
    }
}
