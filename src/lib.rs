//! Survey Pulse - filter-reactive heatmap over social-media and mental-health survey data
//!
//! Pulse turns raw survey rows into a fixed time-spent x distress grid through a
//! deterministic pipeline: CSV reading → normalization → filtering →
//! aggregation → reconciliation. A renderer consumes the resulting frames; the
//! export composer serializes the current view into a text report.
//!
//! ## Modules
//!
//! - **Pipeline**: [`HeatmapSession`] drives the stages on every filter change
//! - **Export**: [`csv_to_report`] composes a report in one call

pub mod aggregator;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod insight;
pub mod normalizer;
pub mod pipeline;
pub mod reconciler;
pub mod renderer;
pub mod schema;
pub mod types;

pub use aggregator::{Aggregation, Aggregator};
pub use config::PulseConfig;
pub use error::PulseError;
pub use export::ExportComposer;
pub use filter::{Facets, FilterEvent, FilterPredicate};
pub use pipeline::{csv_to_report, HeatmapSession};
pub use reconciler::{Keyed, Reconciler, Reconciliation, Update, UpdatePolicy};
pub use renderer::{ColorScale, Frame, Renderer};

// Schema exports
pub use schema::{ColumnMap, RawRow, SurveyReader};

/// Pulse version reported by the CLI
pub const PULSE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "survey-pulse";
