//! Session configuration
//!
//! Loaded from JSON. Every field is optional and falls back to the defaults
//! for the social-media and mental-health survey export.

use crate::error::PulseError;
use crate::reconciler::UpdatePolicy;
use crate::schema::ColumnMap;
use crate::types::DEFAULT_MAX_AGE;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Age ceiling applied on the first render
    pub default_max_age: u32,
    /// Whether unchanged cells are still reported as updates
    pub update_policy: UpdatePolicy,
    pub columns: ColumnMap,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            default_max_age: DEFAULT_MAX_AGE,
            update_policy: UpdatePolicy::default(),
            columns: ColumnMap::default(),
        }
    }
}

impl PulseConfig {
    pub fn from_json(json: &str) -> Result<Self, PulseError> {
        let config: PulseConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn load(path: &Path) -> Result<Self, PulseError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), PulseError> {
        for (field, header) in self.columns.entries() {
            if header.trim().is_empty() {
                return Err(PulseError::ConfigError(format!(
                    "column for '{field}' must not be empty"
                )));
            }
        }
        Ok(())
    }
}
