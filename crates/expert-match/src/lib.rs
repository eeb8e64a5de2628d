//! Expert scoring and ranking for paid research questions.
//!
//! The [`matching::scoring::ScoringEngine`] is a pure function of an expert profile, a
//! question, the entities extracted from that question and an explicit "now". Everything
//! around it (configuration, telemetry, repository collaborators, orchestration) lives in
//! the sibling modules.

pub mod config;
pub mod error;
pub mod matching;
pub mod telemetry;
