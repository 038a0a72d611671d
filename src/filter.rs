//! Filter predicate and selector facets
//!
//! A record passes when its known age is at or below the ceiling and it
//! matches both categorical selectors. Facets enumerate the distinct values
//! the selectors may offer, always led by the `"All"` sentinel.

use crate::error::PulseError;
use crate::types::{FilterState, Gender, Record, Selection, ALL_OPTION};
use std::str::FromStr;

/// Filter predicate over normalized records
pub struct FilterPredicate;

impl FilterPredicate {
    /// Decide whether `record` passes `state`
    pub fn passes(record: &Record, state: &FilterState) -> bool {
        record.age.at_most(state.max_age)
            && state.gender.admits(&record.gender)
            && match &state.platform {
                Selection::All => true,
                Selection::Only(platform) => record.platforms.contains(platform),
            }
    }

    /// Keep the records that pass, in input order
    pub fn apply<'a, I>(records: I, state: &FilterState) -> Vec<&'a Record>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records
            .into_iter()
            .filter(|record| Self::passes(record, state))
            .collect()
    }
}

/// Parse a gender selector value (`"All"`, `"Male"`, `"Female"`)
pub fn parse_gender_selection(label: &str) -> Result<Selection<Gender>, PulseError> {
    if label.trim().eq_ignore_ascii_case(ALL_OPTION) {
        return Ok(Selection::All);
    }
    Gender::from_label(label)
        .map(Selection::Only)
        .ok_or_else(|| PulseError::InvalidFilter(format!("unknown gender option '{label}'")))
}

/// Parse a platform selector value; platform tokens are matched lower-cased
pub fn parse_platform_selection(label: &str) -> Selection<String> {
    let trimmed = label.trim();
    if trimmed.eq_ignore_ascii_case(ALL_OPTION) {
        Selection::All
    } else {
        Selection::Only(trimmed.to_lowercase())
    }
}

/// One UI control change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    MaxAge(u32),
    Gender(Selection<Gender>),
    Platform(Selection<String>),
}

impl FilterEvent {
    /// Apply this event to `state`
    pub fn apply_to(&self, state: &mut FilterState) {
        match self {
            FilterEvent::MaxAge(max_age) => state.max_age = *max_age,
            FilterEvent::Gender(gender) => state.gender = gender.clone(),
            FilterEvent::Platform(platform) => state.platform = platform.clone(),
        }
    }
}

/// Parses `age=N`, `gender=G` and `platform=P`
impl FromStr for FilterEvent {
    type Err = PulseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (control, value) = line
            .split_once('=')
            .ok_or_else(|| PulseError::InvalidFilter(format!("expected control=value, got '{line}'")))?;

        match control.trim().to_ascii_lowercase().as_str() {
            "age" | "max_age" => value
                .trim()
                .parse::<u32>()
                .map(FilterEvent::MaxAge)
                .map_err(|e| PulseError::InvalidFilter(format!("age '{}': {e}", value.trim()))),
            "gender" => parse_gender_selection(value).map(FilterEvent::Gender),
            "platform" => Ok(FilterEvent::Platform(parse_platform_selection(value))),
            other => Err(PulseError::InvalidFilter(format!("unknown control '{other}'"))),
        }
    }
}

/// Display label for a platform token: first character upper-cased
pub fn platform_label(platform: &str) -> String {
    let mut chars = platform.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Distinct values observed in the dataset, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Facets {
    /// Known genders only; `Unknown` is never offered
    pub genders: Vec<Gender>,
    pub platforms: Vec<String>,
    /// (youngest, oldest) known age, if any
    pub age_range: Option<(u32, u32)>,
}

impl Facets {
    pub fn from_records(records: &[Record]) -> Self {
        let mut facets = Facets::default();

        for record in records {
            if record.gender != Gender::Unknown && !facets.genders.contains(&record.gender) {
                facets.genders.push(record.gender);
            }
            for platform in record.platforms.iter() {
                if !facets.platforms.iter().any(|p| p == platform) {
                    facets.platforms.push(platform.to_string());
                }
            }
            if let Some(age) = record.age.known() {
                facets.age_range = Some(match facets.age_range {
                    Some((low, high)) => (low.min(age), high.max(age)),
                    None => (age, age),
                });
            }
        }

        facets
    }

    /// Gender selector options, led by `"All"`
    pub fn gender_options(&self) -> Vec<String> {
        std::iter::once(ALL_OPTION.to_string())
            .chain(self.genders.iter().map(|g| g.as_str().to_string()))
            .collect()
    }

    /// Platform selector options (raw tokens), led by `"All"`
    pub fn platform_options(&self) -> Vec<String> {
        std::iter::once(ALL_OPTION.to_string())
            .chain(self.platforms.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Age, PlatformSet, Score, TimeBucket};
    use pretty_assertions::assert_eq;

    fn make_record(age: Age, gender: Gender, platforms: &[&str]) -> Record {
        Record {
            age,
            gender,
            distraction: Score::new(3),
            depression: Score::new(3),
            time_bucket: TimeBucket::TwoHours,
            platforms: PlatformSet::from_tokens(platforms.iter().copied()),
        }
    }

    fn dataset() -> Vec<Record> {
        vec![
            make_record(Age::Known(20), Gender::Male, &["youtube", "discord"]),
            make_record(Age::Known(45), Gender::Female, &["facebook"]),
            make_record(Age::Unknown, Gender::Female, &["youtube"]),
            make_record(Age::Known(30), Gender::Unknown, &["reddit", "youtube"]),
        ]
    }

    #[test]
    fn test_age_ceiling() {
        let records = dataset();
        let passed = FilterPredicate::apply(&records, &FilterState::with_max_age(30));
        assert_eq!(passed.len(), 2);
        assert!(passed.iter().all(|r| r.age.at_most(30)));
    }

    #[test]
    fn test_unknown_age_never_passes() {
        let records = dataset();
        for max_age in [0, 60, u32::MAX] {
            let passed = FilterPredicate::apply(&records, &FilterState::with_max_age(max_age));
            assert!(passed.iter().all(|r| r.age != Age::Unknown));
        }
        let all = FilterPredicate::apply(&records, &FilterState::with_max_age(u32::MAX));
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_gender_and_platform_selectors() {
        let records = dataset();
        let state = FilterState {
            max_age: 100,
            gender: Selection::Only(Gender::Male),
            platform: Selection::Only("discord".to_string()),
        };
        let passed = FilterPredicate::apply(&records, &state);
        assert_eq!(passed.len(), 1);
        assert_eq!(passed[0].age, Age::Known(20));

        let state = FilterState {
            platform: Selection::Only("youtube".to_string()),
            ..FilterState::with_max_age(100)
        };
        assert_eq!(FilterPredicate::apply(&records, &state).len(), 2);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = dataset();
        let state = FilterState {
            max_age: 40,
            gender: Selection::All,
            platform: Selection::Only("youtube".to_string()),
        };
        let once = FilterPredicate::apply(&records, &state);
        let twice = FilterPredicate::apply(once.iter().copied(), &state);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_facets_first_seen_order() {
        let facets = Facets::from_records(&dataset());
        assert_eq!(facets.gender_options(), vec!["All", "Male", "Female"]);
        assert_eq!(
            facets.platform_options(),
            vec!["All", "youtube", "discord", "facebook", "reddit"]
        );
        assert_eq!(facets.age_range, Some((20, 45)));
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!(parse_gender_selection("all").unwrap(), Selection::All);
        assert_eq!(
            parse_gender_selection("Female").unwrap(),
            Selection::Only(Gender::Female)
        );
        assert!(parse_gender_selection("Unknown").is_err());
        assert_eq!(
            parse_platform_selection(" YouTube "),
            Selection::Only("youtube".to_string())
        );
        assert_eq!(platform_label("youtube"), "Youtube");
        assert_eq!(platform_label(""), "");
    }

    #[test]
    fn test_filter_event_parsing() {
        assert_eq!("age=25".parse::<FilterEvent>().unwrap(), FilterEvent::MaxAge(25));
        assert_eq!(
            "gender = Male".parse::<FilterEvent>().unwrap(),
            FilterEvent::Gender(Selection::Only(Gender::Male))
        );
        assert_eq!(
            "platform=All".parse::<FilterEvent>().unwrap(),
            FilterEvent::Platform(Selection::All)
        );
        assert!("age=old".parse::<FilterEvent>().is_err());
        assert!("colour=red".parse::<FilterEvent>().is_err());
        assert!("age".parse::<FilterEvent>().is_err());
    }

    #[test]
    fn test_filter_event_updates_state() {
        let mut state = FilterState::default();
        FilterEvent::Platform(Selection::Only("tiktok".to_string())).apply_to(&mut state);
        FilterEvent::MaxAge(30).apply_to(&mut state);

        assert_eq!(state.max_age, 30);
        assert_eq!(state.platform, Selection::Only("tiktok".to_string()));
        assert_eq!(state.gender, Selection::All);
    }
}
