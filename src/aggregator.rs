//! Grid aggregation
//!
//! Builds the fixed 6 x 2 heatmap grid from a filtered record set and pairs it
//! with the derived insight summary.
//!
//! Each cell shows the score of the *first* filtered record in its time bucket,
//! not an average. A bucket with several matching records is represented by
//! only one of them. This is a known limitation kept for output parity.

use crate::insight::InsightDeriver;
use crate::types::{Cell, InsightSummary, Metric, Record, TimeBucket};
use serde::Serialize;

/// Number of cells in every grid snapshot
pub const GRID_SIZE: usize = TimeBucket::CANONICAL.len() * Metric::ALL.len();

/// Result of aggregating one filtered view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    /// Exactly [`GRID_SIZE`] cells, bucket-major in canonical order
    pub cells: Vec<Cell>,
    pub insights: InsightSummary,
}

/// Aggregator for filtered record sets
pub struct Aggregator;

impl Aggregator {
    /// Aggregate the filtered records into grid cells and insights
    pub fn aggregate(records: &[&Record], selected_age: u32) -> Aggregation {
        let cells = Self::build_grid(records);
        let insights = InsightDeriver::derive(records, selected_age);

        tracing::debug!(
            respondents = records.len(),
            filled = cells.iter().filter(|c| c.value.is_some()).count(),
            "aggregated grid"
        );

        Aggregation { cells, insights }
    }

    /// One cell per (bucket, metric), valued by the first record in the bucket
    pub fn build_grid(records: &[&Record]) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(GRID_SIZE);

        for bucket in TimeBucket::CANONICAL {
            let representative = records.iter().find(|r| r.time_bucket == bucket);
            for metric in Metric::ALL {
                cells.push(Cell {
                    time_bucket: bucket,
                    metric,
                    value: representative.and_then(|r| r.score(metric)),
                    representative_gender: representative.map(|r| r.gender),
                });
            }
        }

        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Age, Gender, PlatformSet, Score};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn make_record(gender: Gender, bucket: TimeBucket, d: u8, m: u8) -> Record {
        Record {
            age: Age::Known(22),
            gender,
            distraction: Score::new(d),
            depression: Score::new(m),
            time_bucket: bucket,
            platforms: PlatformSet::default(),
        }
    }

    #[test]
    fn test_grid_always_has_every_key() {
        let records = vec![make_record(Gender::Male, TimeBucket::TwoHours, 4, 2)];
        let refs: Vec<&Record> = records.iter().collect();
        let empty: Vec<&Record> = Vec::new();

        for input in [&refs[..], &empty[..]] {
            let cells = Aggregator::build_grid(input);
            assert_eq!(cells.len(), GRID_SIZE);
            let keys: HashSet<_> = cells.iter().map(Cell::key).collect();
            assert_eq!(keys.len(), 12);
        }
    }

    #[test]
    fn test_first_match_represents_bucket() {
        let records = vec![
            make_record(Gender::Female, TimeBucket::ThreeHours, 2, 1),
            make_record(Gender::Male, TimeBucket::ThreeHours, 5, 5),
        ];
        let refs: Vec<&Record> = records.iter().collect();
        let cells = Aggregator::build_grid(&refs);

        let three: Vec<&Cell> = cells
            .iter()
            .filter(|c| c.time_bucket == TimeBucket::ThreeHours)
            .collect();
        assert_eq!(three[0].metric, Metric::Distraction);
        assert_eq!(three[0].value, Score::new(2));
        assert_eq!(three[1].value, Score::new(1));
        assert_eq!(three[1].representative_gender, Some(Gender::Female));
    }

    #[test]
    fn test_empty_bucket_has_no_data() {
        let cells = Aggregator::build_grid(&[]);
        assert!(cells.iter().all(|c| c.value.is_none()));
        assert!(cells.iter().all(|c| c.representative_label() == "No data"));
    }

    #[test]
    fn test_unknown_bucket_never_fills_a_cell() {
        let records = vec![make_record(Gender::Male, TimeBucket::Unknown, 5, 5)];
        let refs: Vec<&Record> = records.iter().collect();
        let aggregation = Aggregator::aggregate(&refs, 60);

        assert!(aggregation.cells.iter().all(|c| c.value.is_none()));
        assert_eq!(aggregation.insights.respondents, 1);
    }

    #[test]
    fn test_aggregate_empty_is_well_defined() {
        let aggregation = Aggregator::aggregate(&[], 18);
        assert_eq!(aggregation.cells.len(), GRID_SIZE);
        assert_eq!(aggregation.insights, InsightSummary::no_data(18));
    }
}
