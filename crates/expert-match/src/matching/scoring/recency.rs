//! Elapsed-time helpers plus the lenient serde adapters used by the candidate aggregate.
//! The current instant is always passed in; nothing here reads the clock.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Elapsed days reported for a missing or unparsable timestamp.
pub const STALE_DAYS: f64 = 999.0;

/// Elapsed years reported for a missing or unparsable timestamp. Large enough that any
/// year-based decay bottoms out at its floor.
pub const STALE_YEARS: f64 = 100.0;

const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_YEAR: f64 = 365.25;

/// Fractional days between `timestamp` and `now`. Future timestamps count as zero.
pub fn days_since(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match timestamp {
        Some(ts) => elapsed_days(ts, now),
        None => STALE_DAYS,
    }
}

/// Fractional years between `timestamp` and `now`. Future timestamps count as zero.
pub fn years_since(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match timestamp {
        Some(ts) => elapsed_days(ts, now) / DAYS_PER_YEAR,
        None => STALE_YEARS,
    }
}

fn elapsed_days(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let seconds = (now - timestamp).num_seconds().max(0);
    seconds as f64 / SECONDS_PER_DAY
}

/// Parse RFC 3339, `YYYY-MM-DDTHH:MM:SS` (assumed UTC) or a bare `YYYY-MM-DD`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Deserialize an optional timestamp, mapping anything unparsable to `None` so a single
/// bad record is treated as stale instead of rejecting the whole profile.
pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(value)) => parse_timestamp(&value),
        Some(serde_json::Value::Number(millis)) => millis
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    })
}

/// Deserialize `null` the same way as a missing key: the type's default.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().expect("valid now")
    }

    #[test]
    fn missing_timestamps_are_stale() {
        assert_eq!(days_since(None, now()), STALE_DAYS);
        assert_eq!(years_since(None, now()), STALE_YEARS);
    }

    #[test]
    fn future_timestamps_clamp_to_zero() {
        let tomorrow = now() + Duration::days(1);
        assert_eq!(days_since(Some(tomorrow), now()), 0.0);
        assert_eq!(years_since(Some(tomorrow), now()), 0.0);
    }

    #[test]
    fn fractional_days_and_years() {
        let earlier = now() - Duration::hours(36);
        assert_eq!(days_since(Some(earlier), now()), 1.5);

        let left = now() - Duration::hours(21_915);
        assert_eq!(years_since(Some(left), now()), 2.5);
    }

    #[test]
    fn parses_supported_formats() {
        let midnight = Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).single().expect("valid");
        assert_eq!(parse_timestamp("2024-03-09"), Some(midnight));
        assert_eq!(parse_timestamp("2024-03-09T00:00:00"), Some(midnight));
        assert_eq!(parse_timestamp("2024-03-09T00:00:00Z"), Some(midnight));
        assert_eq!(parse_timestamp("2024-03-09T01:00:00+01:00"), Some(midnight));
        assert_eq!(parse_timestamp("last spring"), None);
        assert_eq!(parse_timestamp("  "), None);
    }

    #[test]
    fn lenient_deserializer_swallows_garbage() {
        #[derive(Deserialize)]
        struct Stamped {
            #[serde(default, deserialize_with = "lenient_timestamp")]
            at: Option<DateTime<Utc>>,
        }

        let bad: Stamped = serde_json::from_str(r#"{ "at": "not-a-date" }"#).expect("parses");
        assert!(bad.at.is_none());

        let null: Stamped = serde_json::from_str(r#"{ "at": null }"#).expect("parses");
        assert!(null.at.is_none());

        let missing: Stamped = serde_json::from_str("{}").expect("parses");
        assert!(missing.at.is_none());

        let good: Stamped = serde_json::from_str(r#"{ "at": "2024-03-09" }"#).expect("parses");
        assert!(good.at.is_some());
    }

    #[test]
    fn null_reads_as_the_default_value() {
        #[derive(Deserialize)]
        struct Counts {
            #[serde(default, deserialize_with = "null_as_default")]
            tags: Vec<String>,
            #[serde(default, deserialize_with = "null_as_default")]
            weight: f64,
        }

        let nulls: Counts =
            serde_json::from_str(r#"{ "tags": null, "weight": null }"#).expect("parses");
        assert!(nulls.tags.is_empty());
        assert_eq!(nulls.weight, 0.0);

        let set: Counts =
            serde_json::from_str(r#"{ "tags": ["a"], "weight": 2.5 }"#).expect("parses");
        assert_eq!(set.tags, vec!["a".to_string()]);
        assert_eq!(set.weight, 2.5);
    }
}
