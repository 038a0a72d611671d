//! Pipeline orchestration
//!
//! This module provides the public API for Survey Pulse. Raw rows are
//! normalized once into an immutable record collection; every filter change
//! then re-derives the filtered set, the full grid, and the full insight
//! summary, and reconciles the grid against the previously rendered one.

use crate::aggregator::{Aggregation, Aggregator};
use crate::config::PulseConfig;
use crate::error::PulseError;
use crate::export::ExportComposer;
use crate::filter::{Facets, FilterEvent, FilterPredicate};
use crate::insight::InsightDeriver;
use crate::normalizer::Normalizer;
use crate::reconciler::{Reconciler, UpdatePolicy};
use crate::renderer::{ColorScale, Frame, Renderer};
use crate::schema::{RawRow, SurveyReader};
use crate::types::{Cell, FilterState, Gender, InsightSummary, Record, Selection};
use std::path::Path;
use uuid::Uuid;

/// Compose the export report for a CSV document under one filter state (stateless, one-shot).
///
/// # Arguments
/// * `csv_data` - Survey CSV including its header row
/// * `filter` - Filter selection to apply
/// * `config` - Column mapping and defaults
///
/// # Example
/// ```ignore
/// let report = csv_to_report(&csv_data, &FilterState::default(), &PulseConfig::default())?;
/// ```
pub fn csv_to_report(
    csv_data: &str,
    filter: &FilterState,
    config: &PulseConfig,
) -> Result<String, PulseError> {
    // Stage 1: Read raw rows
    let rows = SurveyReader::parse_str(csv_data, &config.columns)?;

    // Stage 2: Normalize
    let records = Normalizer::normalize(&rows, &config.columns);

    // Stage 3: Filter
    let filtered = FilterPredicate::apply(&records, filter);

    // Stage 4: Derive insights and compose
    let insights = InsightDeriver::derive(&filtered, filter.max_age);
    Ok(ExportComposer::compose(&filtered, &insights))
}

/// Interactive heatmap session over one dataset.
///
/// Holds the normalized records (never mutated), the current filter state,
/// and the last rendered grid. Each filter change produces a [`Frame`].
pub struct HeatmapSession {
    id: Uuid,
    records: Vec<Record>,
    facets: Facets,
    filter: FilterState,
    rendered: Vec<Cell>,
    sequence: u64,
    colors: ColorScale,
    update_policy: UpdatePolicy,
}

impl HeatmapSession {
    /// Create a session over already-normalized records
    pub fn new(records: Vec<Record>, config: &PulseConfig) -> Self {
        let id = Uuid::new_v4();
        let facets = Facets::from_records(&records);
        tracing::info!(
            session_id = %id,
            records = records.len(),
            max_age = config.default_max_age,
            "heatmap session created"
        );

        Self {
            id,
            records,
            facets,
            filter: FilterState::with_max_age(config.default_max_age),
            rendered: Vec::new(),
            sequence: 0,
            colors: ColorScale::default(),
            update_policy: config.update_policy,
        }
    }

    /// Create a session from raw rows
    pub fn from_rows(rows: &[RawRow], config: &PulseConfig) -> Self {
        Self::new(Normalizer::normalize(rows, &config.columns), config)
    }

    /// Create a session from a CSV document
    pub fn from_csv_str(csv_data: &str, config: &PulseConfig) -> Result<Self, PulseError> {
        let rows = SurveyReader::parse_str(csv_data, &config.columns)?;
        Ok(Self::from_rows(&rows, config))
    }

    /// Create a session from a CSV file
    pub fn from_csv_path(path: &Path, config: &PulseConfig) -> Result<Self, PulseError> {
        let rows = SurveyReader::from_path(path, &config.columns)?;
        Ok(Self::from_rows(&rows, config))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn colors(&self) -> &ColorScale {
        &self.colors
    }

    /// Cells as of the last frame; empty before the first render and after teardown
    pub fn rendered_cells(&self) -> &[Cell] {
        &self.rendered
    }

    /// Records passing the current filter, in dataset order
    pub fn filtered(&self) -> Vec<&Record> {
        FilterPredicate::apply(&self.records, &self.filter)
    }

    /// Aggregate the current view without producing a frame
    pub fn aggregate(&self) -> Aggregation {
        Aggregator::aggregate(&self.filtered(), self.filter.max_age)
    }

    /// Recompute the current view and reconcile it against the last frame
    pub fn render(&mut self) -> Frame {
        let aggregation = self.aggregate();
        let diff = Reconciler::reconcile_with(&self.rendered, &aggregation.cells, self.update_policy);
        self.rendered = aggregation.cells;
        self.sequence += 1;

        tracing::debug!(
            session_id = %self.id,
            sequence = self.sequence,
            entering = diff.entering.len(),
            updating = diff.updating.len(),
            exiting = diff.exiting.len(),
            "frame reconciled"
        );

        let narrative = aggregation.insights.narrative();
        Frame {
            session_id: self.id,
            sequence: self.sequence,
            filter: self.filter.clone(),
            diff,
            insights: aggregation.insights,
            narrative,
        }
    }

    /// Render the current view and hand the frame to `renderer`
    pub fn render_to<R: Renderer>(&mut self, renderer: &mut R) -> Frame {
        let frame = self.render();
        renderer.render(&frame, &self.colors);
        frame
    }

    /// Apply one UI control change and re-render
    pub fn apply(&mut self, event: &FilterEvent) -> Frame {
        tracing::debug!(session_id = %self.id, ?event, "filter event");
        event.apply_to(&mut self.filter);
        self.render()
    }

    pub fn set_max_age(&mut self, max_age: u32) -> Frame {
        self.apply(&FilterEvent::MaxAge(max_age))
    }

    pub fn set_gender(&mut self, gender: Selection<Gender>) -> Frame {
        self.apply(&FilterEvent::Gender(gender))
    }

    pub fn set_platform(&mut self, platform: Selection<String>) -> Frame {
        self.apply(&FilterEvent::Platform(platform))
    }

    /// Apply an event and hand the resulting frame to `renderer`
    pub fn dispatch<R: Renderer>(&mut self, event: &FilterEvent, renderer: &mut R) -> Frame {
        let frame = self.apply(event);
        renderer.render(&frame, &self.colors);
        frame
    }

    /// Remove every rendered cell. The frame carries an empty narrative.
    pub fn teardown(&mut self) -> Frame {
        let diff = Reconciler::reconcile(&self.rendered, &[]);
        self.rendered.clear();
        self.sequence += 1;
        tracing::debug!(session_id = %self.id, exiting = diff.exiting.len(), "session torn down");

        Frame {
            session_id: self.id,
            sequence: self.sequence,
            filter: self.filter.clone(),
            diff,
            insights: InsightSummary::no_data(self.filter.max_age),
            narrative: String::new(),
        }
    }

    /// Text report for the current filter state
    pub fn export(&self) -> String {
        let filtered = self.filtered();
        let insights = InsightDeriver::derive(&filtered, self.filter.max_age);
        ExportComposer::compose(&filtered, &insights)
    }

    /// Static image of the renderer's current state
    pub fn export_image<R: Renderer>(&self, renderer: &R) -> Result<Vec<u8>, PulseError> {
        renderer.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::GRID_SIZE;
    use crate::types::{Score, TimeBucket};

    fn sample_csv() -> String {
        let header = crate::schema::ColumnMap::default()
            .entries()
            .iter()
            .map(|(_, h)| format!("\"{h}\""))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{header}\n\
             21,Male,\"Facebook, YouTube\",Less than an Hour,3,5\n\
             35,Female,\"Instagram, YouTube\",Between 2 and 3 hours,4,2\n\
             abc,Female,Pinterest,More than 5 hours,5,5\n\
             52,Nonbinary,Reddit,Between 1 and 2 hours,2,1\n"
        )
    }

    fn session() -> HeatmapSession {
        HeatmapSession::from_csv_str(&sample_csv(), &PulseConfig::default()).unwrap()
    }

    #[test]
    fn test_first_render_enters_every_cell() {
        let mut session = session();
        let frame = session.render();

        assert_eq!(frame.sequence, 1);
        assert_eq!(frame.diff.entering.len(), GRID_SIZE);
        assert!(frame.diff.updating.is_empty());
        assert_eq!(frame.insights.respondents, 3);
    }

    #[test]
    fn test_filter_changes_are_updates() {
        let mut session = session();
        session.render();
        let frame = session.set_gender(Selection::Only(Gender::Female));

        assert!(frame.diff.entering.is_empty());
        assert!(frame.diff.exiting.is_empty());
        assert_eq!(frame.diff.updating.len(), GRID_SIZE);
        assert_eq!(frame.insights.respondents, 1);
        assert_eq!(frame.insights.dominant_gender, Some(Gender::Female));
    }

    #[test]
    fn test_unknown_age_row_is_excluded() {
        let mut session = session();
        let frame = session.set_max_age(u32::MAX);

        assert_eq!(frame.insights.respondents, 3);
        let six = session
            .rendered_cells()
            .iter()
            .find(|c| c.time_bucket == TimeBucket::SixHoursPlus)
            .unwrap();
        assert_eq!(six.value, None);
    }

    #[test]
    fn test_empty_filter_result() {
        let mut session = session();
        let frame = session.set_platform(Selection::Only("myspace".to_string()));

        assert_eq!(frame.narrative, "No data available for the selected filters.");
        assert_eq!(session.rendered_cells().len(), GRID_SIZE);
        assert!(session.rendered_cells().iter().all(|c| c.value.is_none()));
    }

    #[test]
    fn test_teardown_exits_every_cell() {
        let mut session = session();
        session.render();
        let frame = session.teardown();

        assert_eq!(frame.diff.exiting.len(), GRID_SIZE);
        assert!(frame.diff.entering.is_empty());
        assert_eq!(frame.narrative, "");
        assert_eq!(frame.session_id, session.id());
        assert!(session.rendered_cells().is_empty());
    }

    #[test]
    fn test_records_are_not_touched_by_filtering() {
        let mut session = session();
        let before = session.records().to_vec();
        session.set_max_age(20);
        session.set_platform(Selection::Only("youtube".to_string()));
        assert_eq!(session.records(), &before[..]);
    }

    #[test]
    fn test_csv_to_report_matches_session_export() {
        let csv_data = sample_csv();
        let report = csv_to_report(&csv_data, &FilterState::default(), &PulseConfig::default()).unwrap();
        assert_eq!(report, session().export());
        assert!(report.starts_with("TimeSpent,Distraction,Depression,Gender\n1hr,3,5,Male\n"));
    }

    #[test]
    fn test_first_match_value_in_frame() {
        let mut session = session();
        let frame = session.render();
        let one_hour = frame
            .diff
            .entering
            .iter()
            .find(|c| c.time_bucket == TimeBucket::OneHour)
            .unwrap();
        assert_eq!(one_hour.value, Score::new(3));
    }
}
