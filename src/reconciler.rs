//! Keyed reconciliation between grid snapshots
//!
//! Diffs a previous snapshot against the next one by stable key and sorts
//! every item into entering, updating, or exiting. The renderer applies the
//! result; the core never issues draw calls.
//!
//! The heatmap grid always has the same 12 keys, so after the first render
//! every transition is a pure update. The reconciler stays generic anyway.

use crate::types::{Cell, CellKey};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Items with a stable identity across snapshots
pub trait Keyed {
    type Key: Eq + Hash + Clone;

    fn key(&self) -> Self::Key;
}

impl Keyed for Cell {
    type Key = CellKey;

    fn key(&self) -> CellKey {
        Cell::key(self)
    }
}

/// Whether unchanged items are reported as updates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Every surviving key is an update, even if its value is identical
    #[default]
    Always,
    /// Only surviving keys whose item changed are updates
    OnChange,
}

/// A key present in both snapshots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update<T> {
    pub previous: T,
    pub current: T,
}

impl<T: PartialEq> Update<T> {
    pub fn is_changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Classification of one snapshot transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation<T> {
    /// Keys new in this snapshot, in next-snapshot order
    pub entering: Vec<T>,
    /// Keys in both snapshots, in next-snapshot order
    pub updating: Vec<Update<T>>,
    /// Keys gone from this snapshot, in previous-snapshot order
    pub exiting: Vec<T>,
}

impl<T> Reconciliation<T> {
    pub fn is_empty(&self) -> bool {
        self.entering.is_empty() && self.updating.is_empty() && self.exiting.is_empty()
    }
}

/// Reconciler for keyed snapshots
pub struct Reconciler;

impl Reconciler {
    /// Diff `previous` against `next` by key, reporting every surviving key as an update
    pub fn reconcile<T>(previous: &[T], next: &[T]) -> Reconciliation<T>
    where
        T: Keyed + Clone,
    {
        let previous_by_key: HashMap<T::Key, &T> = previous
            .iter()
            .rev()
            .map(|item| (item.key(), item))
            .collect();
        let next_keys: HashSet<T::Key> = next.iter().map(Keyed::key).collect();

        let mut entering = Vec::new();
        let mut updating = Vec::new();
        for item in next {
            match previous_by_key.get(&item.key()) {
                Some(old) => updating.push(Update {
                    previous: (*old).clone(),
                    current: item.clone(),
                }),
                None => entering.push(item.clone()),
            }
        }

        let exiting = previous
            .iter()
            .filter(|item| !next_keys.contains(&item.key()))
            .cloned()
            .collect();

        Reconciliation {
            entering,
            updating,
            exiting,
        }
    }

    /// Diff under an explicit update policy
    pub fn reconcile_with<T>(previous: &[T], next: &[T], policy: UpdatePolicy) -> Reconciliation<T>
    where
        T: Keyed + Clone + PartialEq,
    {
        let mut diff = Self::reconcile(previous, next);
        if policy == UpdatePolicy::OnChange {
            diff.updating.retain(Update::is_changed);
        }
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Aggregator;
    use crate::types::{Gender, Metric, Score, TimeBucket};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        value: &'static str,
    }

    impl Keyed for Item {
        type Key = u32;

        fn key(&self) -> u32 {
            self.id
        }
    }

    fn item(id: u32, value: &'static str) -> Item {
        Item { id, value }
    }

    #[test]
    fn test_generic_enter_update_exit() {
        let previous = vec![item(1, "a"), item(2, "b"), item(3, "c")];
        let next = vec![item(4, "d"), item(2, "B"), item(1, "a")];
        let diff = Reconciler::reconcile(&previous, &next);

        assert_eq!(diff.entering, vec![item(4, "d")]);
        assert_eq!(
            diff.updating,
            vec![
                Update { previous: item(2, "b"), current: item(2, "B") },
                Update { previous: item(1, "a"), current: item(1, "a") },
            ]
        );
        assert_eq!(diff.exiting, vec![item(3, "c")]);
    }

    #[test]
    fn test_first_render_and_teardown() {
        let cells = Aggregator::build_grid(&[]);

        let first = Reconciler::reconcile(&[], &cells);
        assert_eq!(first.entering.len(), 12);
        assert!(first.updating.is_empty() && first.exiting.is_empty());

        let teardown = Reconciler::reconcile(&cells, &[]);
        assert_eq!(teardown.exiting.len(), 12);
        assert!(teardown.entering.is_empty() && teardown.updating.is_empty());
    }

    #[test]
    fn test_identical_snapshots_are_all_updates() {
        let cells = Aggregator::build_grid(&[]);
        let diff = Reconciler::reconcile(&cells, &cells);

        assert!(diff.entering.is_empty());
        assert!(diff.exiting.is_empty());
        assert_eq!(diff.updating.len(), 12);
        assert!(diff.updating.iter().all(|u| !u.is_changed()));
    }

    #[test]
    fn test_on_change_policy_drops_unchanged() {
        let previous = Aggregator::build_grid(&[]);
        let mut next = previous.clone();
        next[0] = Cell {
            time_bucket: TimeBucket::OneHour,
            metric: Metric::Distraction,
            value: Score::new(4),
            representative_gender: Some(Gender::Male),
        };

        let diff = Reconciler::reconcile_with(&previous, &next, UpdatePolicy::OnChange);
        assert_eq!(diff.updating.len(), 1);
        assert_eq!(diff.updating[0].current.value, Score::new(4));

        let diff = Reconciler::reconcile_with(&previous, &next, UpdatePolicy::Always);
        assert_eq!(diff.updating.len(), 12);
    }
}
