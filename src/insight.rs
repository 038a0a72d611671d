//! Insight derivation
//!
//! Derives the summary shown next to the heatmap from a filtered record set:
//! - Most common known gender and most used platform (ties keep the first seen)
//! - Time buckets whose peak depression score reaches 5
//! - Mean distraction and distress, rounded to two decimals

use crate::types::{Gender, InsightSummary, PeakDistress, Record, Score, TimeBucket};

/// Placeholder for an insight field that cannot be derived
pub const UNKNOWN: &str = "unknown";

/// Message shown when no record passes the filters
pub const NO_DATA_MESSAGE: &str = "No data available for the selected filters.";

/// Deriver for insight summaries
pub struct InsightDeriver;

impl InsightDeriver {
    /// Derive insights from the filtered records
    pub fn derive(records: &[&Record], selected_age: u32) -> InsightSummary {
        if records.is_empty() {
            return InsightSummary::no_data(selected_age);
        }

        InsightSummary {
            respondents: records.len(),
            dominant_gender: dominant_gender(records),
            time_buckets_at_peak_distress: peak_distress_buckets(records),
            dominant_platform: dominant_platform(records),
            mean_distraction: mean_score(records.iter().filter_map(|r| r.distraction)),
            mean_distress: mean_score(records.iter().filter_map(|r| r.depression)),
            selected_age,
        }
    }
}

/// Most common known gender
pub fn dominant_gender(records: &[&Record]) -> Option<Gender> {
    most_common(
        records
            .iter()
            .map(|r| r.gender)
            .filter(|g| *g != Gender::Unknown),
    )
}

/// Most common platform, counted once per record that lists it
pub fn dominant_platform(records: &[&Record]) -> Option<String> {
    most_common(records.iter().flat_map(|r| r.platforms.iter())).map(str::to_string)
}

/// Canonically ordered buckets whose maximum depression score is 5.
///
/// Buckets with no filtered records are skipped rather than counted as 0.
pub fn peak_distress_buckets(records: &[&Record]) -> Vec<TimeBucket> {
    TimeBucket::CANONICAL
        .iter()
        .copied()
        .filter(|bucket| {
            records
                .iter()
                .filter(|r| r.time_bucket == *bucket)
                .filter_map(|r| r.depression)
                .max()
                .is_some_and(|peak| peak.is_max())
        })
        .collect()
}

/// Arithmetic mean rounded to two decimals
pub fn mean_score<I>(scores: I) -> Option<f64>
where
    I: IntoIterator<Item = Score>,
{
    let (sum, count) = scores
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), s| (sum + s.value() as u64, count + 1));
    if count == 0 {
        return None;
    }
    Some(round_cents(sum as f64 / count as f64))
}

/// Round a non-negative finite value to cents, half up, using the exact
/// binary value of `value` rather than `value * 100.0`.
///
/// `43.0 / 40.0` is stored just below 1.075 and rounds to 1.07.
fn round_cents(value: f64) -> f64 {
    let bits = value.to_bits();
    let exponent = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if exponent == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), exponent - 1075)
    };

    if exponent >= 0 {
        return value;
    }
    let shift = exponent.unsigned_abs();
    if shift >= 100 {
        return 0.0;
    }

    // value = mantissa / 2^shift, so value * 100 = scaled / denominator exactly
    let scaled = mantissa as u128 * 100;
    let denominator = 1u128 << shift;
    let mut cents = scaled / denominator;
    if (scaled % denominator) * 2 >= denominator {
        cents += 1;
    }
    cents as f64 / 100.0
}

/// Two-decimal rendering of a mean, or `"unknown"`
pub fn format_mean(mean: Option<f64>) -> String {
    mean.map(|m| format!("{m:.2}"))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Value with the highest count; ties go to the value encountered first
fn most_common<T: PartialEq>(items: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: Vec<(T, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(seen, _)| *seen == item) {
            Some((_, count)) => *count += 1,
            None => counts.push((item, 1)),
        }
    }

    let mut best: Option<(T, usize)> = None;
    for (item, count) in counts {
        if best.as_ref().map_or(true, |(_, top)| count > *top) {
            best = Some((item, count));
        }
    }
    best.map(|(item, _)| item)
}

impl InsightSummary {
    /// Plain-text insight paragraph
    pub fn narrative(&self) -> String {
        if self.is_empty() {
            return NO_DATA_MESSAGE.to_string();
        }

        let peak_message = match self.peak_distress() {
            PeakDistress::NotDetected => "No maximum distress detected.".to_string(),
            peak => format!("The time spent with maximum distress (value = 5) ranges from {peak}."),
        };

        format!(
            "The most common gender is {}. The selected age is {}. {} \
             The platform used is {}. The average distraction level is {} (on a scale of 1 to 5). \
             The average distress level is {} (on a scale of 1 to 5).",
            self.dominant_gender.map(|g| g.as_str()).unwrap_or(UNKNOWN),
            self.selected_age,
            peak_message,
            self.dominant_platform.as_deref().unwrap_or(UNKNOWN),
            format_mean(self.mean_distraction),
            format_mean(self.mean_distress),
        )
    }
}
