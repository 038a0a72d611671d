//! Error types for Survey Pulse
//!
//! Only the I/O edges of the pipeline can fail. Normalization, filtering,
//! aggregation, reconciliation and export are total.

use thiserror::Error;

/// Errors that can occur while loading input or driving a session
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("Failed to read survey CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid filter event: {0}")]
    InvalidFilter(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Renderer does not support image snapshots")]
    SnapshotUnsupported,
}
