use std::io::Write;

use chrono::{DateTime, Utc};
use expert_match::error::AppError;
use expert_match::matching::{RankedCandidates, ScoreCategory, ScoreResult};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::infra::FixtureRepository;

/// Flat CSV row; one column per category so spreadsheets can sort on any signal.
#[derive(Debug, Serialize)]
struct RankedRow<'a> {
    rank: usize,
    expert_id: &'a str,
    name: String,
    total_score: u32,
    recommendation: &'static str,
    confidence: String,
    multiplier: String,
    employment: String,
    vendor: String,
    observable: String,
    geography: String,
    expertise: String,
    network: String,
    performance: String,
}

impl<'a> RankedRow<'a> {
    fn new(rank: usize, result: &'a ScoreResult, name: String) -> Self {
        let cell = |category| format!("{:.2}", result.category_score(category));
        Self {
            rank,
            expert_id: &result.expert_id.0,
            name,
            total_score: result.total_score,
            recommendation: result.recommendation_level.label(),
            confidence: format!("{:.2}", result.confidence),
            multiplier: format!("{:.3}", result.multiplier),
            employment: cell(ScoreCategory::Employment),
            vendor: cell(ScoreCategory::Vendor),
            observable: cell(ScoreCategory::Observable),
            geography: cell(ScoreCategory::Geography),
            expertise: cell(ScoreCategory::Expertise),
            network: cell(ScoreCategory::Network),
            performance: cell(ScoreCategory::Performance),
        }
    }
}

pub(crate) fn render<W: Write>(
    ranked: &RankedCandidates,
    repository: &FixtureRepository,
    format: OutputFormat,
    out: W,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Table => write_table(ranked, repository, out),
        OutputFormat::Json => write_json(ranked, out),
        OutputFormat::Csv => write_csv(ranked, repository, out),
    }
}

fn write_table<W: Write>(
    ranked: &RankedCandidates,
    repository: &FixtureRepository,
    mut out: W,
) -> Result<(), AppError> {
    writeln!(out, "Ranked candidates")?;
    if ranked.results.is_empty() {
        writeln!(out, "- none")?;
    }
    for (index, result) in ranked.results.iter().enumerate() {
        writeln!(
            out,
            "{:>3}. {} ({}) | score {} | {} | confidence {:.2} | x{:.3}",
            index + 1,
            repository.label(&result.expert_id),
            result.expert_id,
            result.total_score,
            result.recommendation_level,
            result.confidence,
            result.multiplier
        )?;
    }

    if !ranked.skipped.is_empty() {
        writeln!(out, "\nSkipped candidates")?;
        for skipped in &ranked.skipped {
            writeln!(out, "- {}: {}", skipped.expert_id, skipped.reason)?;
        }
    }
    Ok(())
}

fn write_json<W: Write>(ranked: &RankedCandidates, mut out: W) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut out, ranked)?;
    writeln!(out)?;
    Ok(())
}

fn write_csv<W: Write>(
    ranked: &RankedCandidates,
    repository: &FixtureRepository,
    out: W,
) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    for (index, result) in ranked.results.iter().enumerate() {
        let row = RankedRow::new(index + 1, result, repository.label(&result.expert_id));
        writer
            .serialize(row)
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
    }
    writer.flush()?;
    Ok(())
}

/// Per-category audit trail for a single candidate.
pub(crate) fn render_explanation<W: Write>(
    result: &ScoreResult,
    now: DateTime<Utc>,
    mut out: W,
) -> Result<(), AppError> {
    writeln!(out, "Expert {} evaluated at {}", result.expert_id, now)?;
    writeln!(
        out,
        "Total {} ({}), base {:.2} x multiplier {:.3}, confidence {:.2}",
        result.total_score,
        result.recommendation_level,
        result.base_score(),
        result.multiplier,
        result.confidence
    )?;

    for category in ScoreCategory::ALL {
        let Some(entry) = result.breakdown.get(&category) else {
            continue;
        };
        writeln!(out, "\n{}: {:.2}", category.label(), entry.score)?;
        for detail in &entry.details {
            writeln!(
                out,
                "  - {} {:+.2} ({})",
                detail.subject, detail.score, detail.notes
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::RankingFixture;
    use chrono::TimeZone;
    use expert_match::matching::{ExpertMatchingService, ScoringWeights};
    use std::sync::Arc;

    fn ranked() -> (RankedCandidates, Arc<FixtureRepository>) {
        let fixture = RankingFixture::from_json(
            r#"{
                "entities": { "companies": ["Acme"] },
                "candidates": [
                    { "id": "exp-low", "displayName": "Lee Park" },
                    { "id": "exp-high", "displayName": "Ana Diaz",
                      "employmentHistory": [{ "company": "Acme Inc", "isCurrent": true }] },
                    { "id": "exp-bad", "verificationLevel": -2 }
                ]
            }"#,
        )
        .expect("fixture parses");
        let repository = Arc::new(FixtureRepository::from_fixture(&fixture));
        let service = ExpertMatchingService::new(repository.clone(), ScoringWeights::standard());
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single().expect("valid");
        let ranked = service
            .rank(&fixture.question, &fixture.entities, now, None)
            .expect("ranking succeeds");
        (ranked, repository)
    }

    #[test]
    fn table_lists_ranked_and_skipped_candidates() {
        let (ranked, repository) = ranked();
        let mut buffer = Vec::new();
        render(&ranked, &repository, OutputFormat::Table, &mut buffer).expect("renders");
        let text = String::from_utf8(buffer).expect("utf8");

        assert!(text.contains("  1. Ana Diaz (exp-high) | score 100 | RECOMMENDED"));
        assert!(text.contains("  2. Lee Park (exp-low) | score 0 | LOW_MATCH"));
        assert!(text.contains("Skipped candidates\n- exp-bad:"));
    }

    #[test]
    fn csv_has_header_and_one_row_per_result() {
        let (ranked, repository) = ranked();
        let mut buffer = Vec::new();
        render(&ranked, &repository, OutputFormat::Csv, &mut buffer).expect("renders");
        let text = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("rank,expert_id,name,total_score,recommendation"));
        assert!(lines[1].starts_with("1,exp-high,Ana Diaz,100,RECOMMENDED"));
    }

    #[test]
    fn json_output_round_trips_through_serde() {
        let (ranked, repository) = ranked();
        let mut buffer = Vec::new();
        render(&ranked, &repository, OutputFormat::Json, &mut buffer).expect("renders");
        let value: serde_json::Value = serde_json::from_slice(&buffer).expect("valid json");

        assert_eq!(value["results"][0]["expertId"], "exp-high");
        assert_eq!(value["skipped"][0]["expertId"], "exp-bad");
    }

    #[test]
    fn explanation_lists_every_category() {
        let (ranked, _) = ranked();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single().expect("valid");
        let mut buffer = Vec::new();
        render_explanation(&ranked.results[0], now, &mut buffer).expect("renders");
        let text = String::from_utf8(buffer).expect("utf8");

        for category in ScoreCategory::ALL {
            assert!(text.contains(&format!("\n{}:", category.label())));
        }
        assert!(text.contains("Acme Inc +100.00 (currently employed)"));
    }
}
