//! Raw rows and the survey column mapping

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const AGE_COLUMN: &str = "1. What is your age?";
pub const GENDER_COLUMN: &str = "2. Gender";
pub const PLATFORMS_COLUMN: &str = "7. What social media platforms do you commonly use?";
pub const TIME_SPENT_COLUMN: &str =
    "8. What is the average time you spend on social media every day?";
pub const DISTRACTION_COLUMN: &str = "12. On a scale of 1 to 5, how easily distracted are you?";
pub const DEPRESSION_COLUMN: &str = "18. How often do you feel depressed or down?";

/// One survey response: free-text question header to free-text answer.
///
/// Consumed only by the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: HashMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an answer, replacing any previous answer for the same header
    pub fn insert(&mut self, header: impl Into<String>, answer: impl Into<String>) {
        self.fields.insert(header.into(), answer.into());
    }

    /// Answer for `header`, or `""` when the question is absent
    pub fn get(&self, header: &str) -> &str {
        self.fields.get(header).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (header, answer) in iter {
            row.insert(header, answer);
        }
        row
    }
}

/// Which survey question feeds which record field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub age: String,
    pub gender: String,
    pub platforms: String,
    pub time_spent: String,
    pub distraction: String,
    pub depression: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            age: AGE_COLUMN.to_string(),
            gender: GENDER_COLUMN.to_string(),
            platforms: PLATFORMS_COLUMN.to_string(),
            time_spent: TIME_SPENT_COLUMN.to_string(),
            distraction: DISTRACTION_COLUMN.to_string(),
            depression: DEPRESSION_COLUMN.to_string(),
        }
    }
}

impl ColumnMap {
    /// Headers in record-field order, labelled by field
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("age", self.age.as_str()),
            ("gender", self.gender.as_str()),
            ("platforms", self.platforms.as_str()),
            ("time_spent", self.time_spent.as_str()),
            ("distraction", self.distraction.as_str()),
            ("depression", self.depression.as_str()),
        ]
    }
}
