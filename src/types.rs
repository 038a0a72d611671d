//! Core types for the Survey Pulse pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: normalized records, filter state, grid cells, and insight summaries.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Respondent age as parsed from the survey.
///
/// `Unknown` is never coerced to zero: it fails every age ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Age {
    Known(u32),
    Unknown,
}

impl Age {
    /// True when the age is known and does not exceed `max_age`
    pub fn at_most(&self, max_age: u32) -> bool {
        match self {
            Age::Known(age) => *age <= max_age,
            Age::Unknown => false,
        }
    }

    pub fn known(&self) -> Option<u32> {
        match self {
            Age::Known(age) => Some(*age),
            Age::Unknown => None,
        }
    }
}

/// Normalized gender value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unknown => "Unknown",
        }
    }

    /// Parse a selector label ("Male" / "Female"), case-insensitive.
    ///
    /// `Unknown` is not selectable, so it is never returned.
    pub fn from_label(label: &str) -> Option<Gender> {
        match label.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Self-reported Likert score in 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Score> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Score(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_max(&self) -> bool {
        self.0 == Self::MAX
    }
}

impl TryFrom<u8> for Score {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Score::new(value).ok_or_else(|| format!("score {value} outside 1..=5"))
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> u8 {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Daily time spent on social media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeBucket {
    #[serde(rename = "1hr")]
    OneHour,
    #[serde(rename = "2hr")]
    TwoHours,
    #[serde(rename = "3hr")]
    ThreeHours,
    #[serde(rename = "4hr")]
    FourHours,
    #[serde(rename = "5hr")]
    FiveHours,
    #[serde(rename = "6hr+")]
    SixHoursPlus,
    Unknown,
}

impl TimeBucket {
    /// The six buckets shown on the grid, in axis order
    pub const CANONICAL: [TimeBucket; 6] = [
        TimeBucket::OneHour,
        TimeBucket::TwoHours,
        TimeBucket::ThreeHours,
        TimeBucket::FourHours,
        TimeBucket::FiveHours,
        TimeBucket::SixHoursPlus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBucket::OneHour => "1hr",
            TimeBucket::TwoHours => "2hr",
            TimeBucket::ThreeHours => "3hr",
            TimeBucket::FourHours => "4hr",
            TimeBucket::FiveHours => "5hr",
            TimeBucket::SixHoursPlus => "6hr+",
            TimeBucket::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grid column metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Distraction,
    Depression,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Distraction, Metric::Depression];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Distraction => "Distraction",
            Metric::Depression => "Depression",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distinct platform tokens in order of first appearance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlatformSet(Vec<String>);

impl PlatformSet {
    /// Build a set from already-normalized tokens; duplicates and empty tokens are dropped
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut platforms: Vec<String> = Vec::new();
        for token in tokens {
            let token = token.into();
            if !token.is_empty() && !platforms.contains(&token) {
                platforms.push(token);
            }
        }
        Self(platforms)
    }

    pub fn contains(&self, platform: &str) -> bool {
        self.0.iter().any(|p| p == platform)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A normalized survey response. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub age: Age,
    pub gender: Gender,
    /// `None` when the raw answer was not an integer in 1..=5
    pub distraction: Option<Score>,
    /// `None` when the raw answer was not an integer in 1..=5
    pub depression: Option<Score>,
    pub time_bucket: TimeBucket,
    pub platforms: PlatformSet,
}

impl Record {
    pub fn score(&self, metric: Metric) -> Option<Score> {
        match metric {
            Metric::Distraction => self.distraction,
            Metric::Depression => self.depression,
        }
    }
}

/// A categorical selector value: either the `"All"` sentinel or one concrete option
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    /// True when the selector is `All` or equals `value`
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(selected) => selected == value,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(ALL_OPTION),
            Selection::Only(value) => value.fmt(f),
        }
    }
}

impl<T: fmt::Display> Serialize for Selection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Sentinel option that disables a categorical filter
pub const ALL_OPTION: &str = "All";

/// Default age ceiling for the first render
pub const DEFAULT_MAX_AGE: u32 = 60;

/// The only mutable state of a session: the current filter selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub max_age: u32,
    pub gender: Selection<Gender>,
    /// Lower-cased platform token
    pub platform: Selection<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::with_max_age(DEFAULT_MAX_AGE)
    }
}

impl FilterState {
    pub fn with_max_age(max_age: u32) -> Self {
        Self {
            max_age,
            gender: Selection::All,
            platform: Selection::All,
        }
    }
}

/// Stable identity of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CellKey {
    pub time_bucket: TimeBucket,
    pub metric: Metric,
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.time_bucket, self.metric)
    }
}

/// Label shown for a cell with no representative respondent
pub const NO_DATA: &str = "No data";

/// One (time bucket x metric) cell of the heatmap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub time_bucket: TimeBucket,
    pub metric: Metric,
    /// Score of the representative respondent, `None` when the bucket is empty
    pub value: Option<Score>,
    /// Gender of the representative respondent, `None` when the bucket is empty
    #[serde(serialize_with = "serialize_representative")]
    pub representative_gender: Option<Gender>,
}

fn serialize_representative<S: Serializer>(
    gender: &Option<Gender>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(gender.map(|g| g.as_str()).unwrap_or(NO_DATA))
}

impl Cell {
    pub fn key(&self) -> CellKey {
        CellKey {
            time_bucket: self.time_bucket,
            metric: self.metric,
        }
    }

    pub fn representative_label(&self) -> &'static str {
        self.representative_gender
            .map(|g| g.as_str())
            .unwrap_or(NO_DATA)
    }

    /// Hover lines for this cell; positioning is left to the renderer
    pub fn tooltip(&self) -> Vec<String> {
        vec![
            format!("Time Spent: {}", self.time_bucket),
            format!("Metric: {}", self.metric),
            format!(
                "Value: {}",
                self.value
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| NO_DATA.to_string())
            ),
            format!("Gender: {}", self.representative_label()),
        ]
    }
}

/// Time buckets whose peak depression score reaches the top of the scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakDistress {
    NotDetected,
    Single(TimeBucket),
    /// Inclusive canonical span; buckets inside it need not peak themselves
    Span { from: TimeBucket, to: TimeBucket },
}

impl fmt::Display for PeakDistress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeakDistress::NotDetected => f.write_str("no maximum distress detected"),
            PeakDistress::Single(bucket) => bucket.fmt(f),
            PeakDistress::Span { from, to } => write!(f, "{from} to {to}"),
        }
    }
}

/// Derived insights for one filtered view. Recomputed on every filter change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightSummary {
    /// Number of filtered records the insights were derived from
    pub respondents: usize,
    pub dominant_gender: Option<Gender>,
    /// Canonically ordered buckets whose maximum depression score is 5
    pub time_buckets_at_peak_distress: Vec<TimeBucket>,
    pub dominant_platform: Option<String>,
    /// Rounded to 2 decimal places
    pub mean_distraction: Option<f64>,
    /// Rounded to 2 decimal places
    pub mean_distress: Option<f64>,
    pub selected_age: u32,
}

impl InsightSummary {
    /// Sentinel summary for an empty filtered set
    pub fn no_data(selected_age: u32) -> Self {
        Self {
            respondents: 0,
            dominant_gender: None,
            time_buckets_at_peak_distress: Vec::new(),
            dominant_platform: None,
            mean_distraction: None,
            mean_distress: None,
            selected_age,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.respondents == 0
    }

    pub fn peak_distress(&self) -> PeakDistress {
        match self.time_buckets_at_peak_distress.as_slice() {
            [] => PeakDistress::NotDetected,
            [only] => PeakDistress::Single(*only),
            [first, .., last] => PeakDistress::Span {
                from: *first,
                to: *last,
            },
        }
    }
}
