//! Record normalization
//!
//! This module maps raw survey rows onto typed [`Record`]s.
//! - Gender free text reduced to letters and matched exactly
//! - Time-spent phrases looked up in a fixed table
//! - Platform lists split, trimmed, lower-cased and de-duplicated
//! - Malformed fields degrade to `Unknown` / `None`, never to an error

use crate::schema::{ColumnMap, RawRow};
use crate::types::{Age, Gender, PlatformSet, Record, Score, TimeBucket};

/// Exact survey phrase for each canonical time bucket
pub const TIME_SPENT_PHRASES: [(&str, TimeBucket); 6] = [
    ("Less than an Hour", TimeBucket::OneHour),
    ("Between 1 and 2 hours", TimeBucket::TwoHours),
    ("Between 2 and 3 hours", TimeBucket::ThreeHours),
    ("Between 3 and 4 hours", TimeBucket::FourHours),
    ("Between 4 and 5 hours", TimeBucket::FiveHours),
    ("More than 5 hours", TimeBucket::SixHoursPlus),
];

/// Normalizer for converting raw rows to records
pub struct Normalizer;

impl Normalizer {
    /// Normalize every row, preserving input order
    pub fn normalize(rows: &[RawRow], columns: &ColumnMap) -> Vec<Record> {
        let records: Vec<Record> = rows
            .iter()
            .map(|row| Self::normalize_row(row, columns))
            .collect();

        let unknown_age = records.iter().filter(|r| r.age == Age::Unknown).count();
        let unknown_gender = records.iter().filter(|r| r.gender == Gender::Unknown).count();
        let unknown_bucket = records
            .iter()
            .filter(|r| r.time_bucket == TimeBucket::Unknown)
            .count();
        tracing::debug!(
            records = records.len(),
            unknown_age,
            unknown_gender,
            unknown_bucket,
            "normalized survey rows"
        );

        records
    }

    /// Normalize a single row
    pub fn normalize_row(row: &RawRow, columns: &ColumnMap) -> Record {
        Record {
            age: normalize_age(row.get(&columns.age)),
            gender: normalize_gender(row.get(&columns.gender)),
            distraction: normalize_score(row.get(&columns.distraction)),
            depression: normalize_score(row.get(&columns.depression)),
            time_bucket: normalize_time_spent(row.get(&columns.time_spent)),
            platforms: normalize_platforms(row.get(&columns.platforms)),
        }
    }
}

/// Parse a whole, non-negative age. Blank and fractional input is unknown.
pub fn normalize_age(raw: &str) -> Age {
    match parse_whole_number(raw) {
        Some(age) => u32::try_from(age).map(Age::Known).unwrap_or(Age::Unknown),
        None => {
            tracing::trace!(raw, "unparseable age");
            Age::Unknown
        }
    }
}

/// Lower-case, keep only `a-z`, then match `male` / `female` exactly
pub fn normalize_gender(raw: &str) -> Gender {
    let letters: String = raw
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase())
        .collect();

    match letters.as_str() {
        "male" => Gender::Male,
        "female" => Gender::Female,
        _ => Gender::Unknown,
    }
}

/// Parse a 1..=5 Likert answer
pub fn normalize_score(raw: &str) -> Option<Score> {
    let score = parse_whole_number(raw)
        .and_then(|value| u8::try_from(value).ok())
        .and_then(Score::new);
    if score.is_none() {
        tracing::trace!(raw, "score outside 1..=5");
    }
    score
}

/// Exact phrase lookup; anything else is `Unknown`
pub fn normalize_time_spent(raw: &str) -> TimeBucket {
    TIME_SPENT_PHRASES
        .iter()
        .find(|(phrase, _)| *phrase == raw)
        .map(|(_, bucket)| *bucket)
        .unwrap_or(TimeBucket::Unknown)
}

/// Split on commas, trim and lower-case each token, drop duplicates and blanks
pub fn normalize_platforms(raw: &str) -> PlatformSet {
    PlatformSet::from_tokens(raw.split(',').map(|token| token.trim().to_lowercase()))
}

/// Integer value of numeric text such as `"21"` or `"21.0"`
fn parse_whole_number(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
            Some(value as i64)
        }
        _ => None,
    }
}
