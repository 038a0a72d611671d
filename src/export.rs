//! Export composition
//!
//! Serializes the filtered records and their insight summary into a flat text
//! report: a comma-separated table, a blank line, then a fixed-order summary
//! block. Output is byte-for-byte reproducible for identical inputs.

use std::fmt::Write;

use crate::insight::format_mean;
use crate::types::{InsightSummary, Record, Score};

/// Default file name offered for the report
pub const DEFAULT_EXPORT_FILE: &str = "filtered_insights.csv";

pub const EXPORT_HEADER: &str = "TimeSpent,Distraction,Depression,Gender";

/// Placeholder for a summary value that cannot be derived
const UNKNOWN_VALUE: &str = "Unknown";

/// Composer for text export reports
pub struct ExportComposer;

impl ExportComposer {
    /// Compose the report for the filtered `records` and their `insights`
    pub fn compose(records: &[&Record], insights: &InsightSummary) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "{EXPORT_HEADER}");
        for record in records {
            let _ = writeln!(
                output,
                "{},{},{},{}",
                record.time_bucket,
                score_field(record.distraction),
                score_field(record.depression),
                record.gender
            );
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "Summary of Insights:");
        let _ = writeln!(
            output,
            "Average Distraction Level,{}",
            format_mean(insights.mean_distraction)
        );
        let _ = writeln!(
            output,
            "Average Distress Level,{}",
            format_mean(insights.mean_distress)
        );
        let _ = writeln!(
            output,
            "Most Common Gender,{}",
            insights
                .dominant_gender
                .map(|g| g.as_str())
                .unwrap_or(UNKNOWN_VALUE)
        );
        let _ = writeln!(
            output,
            "Most Used Platform,{}",
            insights.dominant_platform.as_deref().unwrap_or(UNKNOWN_VALUE)
        );

        output
    }
}

fn score_field(score: Option<Score>) -> String {
    score.map(|s| s.to_string()).unwrap_or_default()
}
