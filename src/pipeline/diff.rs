//! Diff calculation for novelty notifications.
//!
//! Compares the fingerprints of this run's items against the snapshot left by
//! the previous run. New fingerprints are notified; the snapshot is then
//! replaced by the current set, so items that drop out of view are forgotten.
//!
//! Without a previous snapshot (first deployment), or with an empty one,
//! nothing is notified and the current set only becomes the baseline.

use std::collections::HashSet;

use crate::models::{Fingerprint, Fingerprinted, Snapshot};

/// Outcome of comparing the current items against the previous snapshot.
#[derive(Debug, Clone)]
pub struct DiffResult<'a, T> {
    /// Items to notify, in input order
    pub novel: Vec<&'a T>,
    /// Replacement snapshot (current fingerprints only)
    pub next: Snapshot,
    /// No previous snapshot existed, or it was empty
    pub cold_start: bool,
    /// Fingerprints present in both runs
    pub unchanged: usize,
    /// Previously seen fingerprints no longer visible
    pub forgotten: usize,
}

impl<T> DiffResult<'_, T> {
    /// Check if anything should be notified.
    pub fn has_changes(&self) -> bool {
        !self.novel.is_empty()
    }
}

/// Calculator for computing novelty between runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffCalculator;

impl DiffCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Calculate novelty of `current` against the `previous` snapshot.
    pub fn calculate<'a, T: Fingerprinted>(
        &self,
        previous: Option<&Snapshot>,
        current: &'a [T],
    ) -> DiffResult<'a, T> {
        let keyed: Vec<(Fingerprint, &T)> =
            current.iter().map(|item| (item.fingerprint(), item)).collect();
        let next: Snapshot = keyed.iter().map(|(key, _)| key.clone()).collect();

        let Some(previous) = previous.filter(|s| !s.is_empty()) else {
            return DiffResult {
                novel: Vec::new(),
                next,
                cold_start: true,
                unchanged: 0,
                forgotten: 0,
            };
        };

        // One notification per fingerprint, for its first item
        let mut notified: HashSet<&Fingerprint> = HashSet::new();
        let mut novel: Vec<&T> = Vec::new();
        for (key, item) in &keyed {
            if !previous.contains(key) && notified.insert(key) {
                novel.push(*item);
            }
        }

        let unchanged = next.iter().filter(|key| previous.contains(key)).count();
        let forgotten = previous.iter().filter(|key| !next.contains(key)).count();

        DiffResult {
            novel,
            next,
            cold_start: false,
            unchanged,
            forgotten,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Posting;

    fn make_posting(id: &str, title: &str) -> Posting {
        Posting {
            title: title.to_string(),
            link: format!("https://example.com/{}", id),
            meta: "2026-02-02 | 학사팀".to_string(),
        }
    }

    fn calculate_diff<'a>(previous: Option<&Snapshot>, current: &'a [Posting]) -> DiffResult<'a, Posting> {
        DiffCalculator::new().calculate(previous, current)
    }

    fn snapshot_of(items: &[Posting]) -> Snapshot {
        items.iter().map(Fingerprinted::fingerprint).collect()
    }

    #[test]
    fn test_cold_start_notifies_nothing() {
        let curr = vec![
            make_posting("001", "Title 1"),
            make_posting("002", "Title 2"),
            make_posting("003", "Title 3"),
        ];

        let result = calculate_diff(None, &curr);
        assert!(result.cold_start);
        assert!(!result.has_changes());
        assert_eq!(result.next.len(), 3);
    }

    #[test]
    fn test_steady_state_after_cold_start() {
        let curr = vec![make_posting("001", "Title 1"), make_posting("002", "Title 2")];
        let baseline = calculate_diff(None, &curr).next;

        let result = calculate_diff(Some(&baseline), &curr);
        assert!(!result.cold_start);
        assert!(!result.has_changes());
        assert_eq!(result.unchanged, 2);
        assert_eq!(result.next, baseline);
    }

    #[test]
    fn test_single_addition() {
        let prev = vec![make_posting("001", "Title 1"), make_posting("002", "Title 2")];
        let mut curr = prev.clone();
        curr.push(make_posting("003", "Title 3"));

        let result = calculate_diff(Some(&snapshot_of(&prev)), &curr);
        assert_eq!(result.novel.len(), 1);
        assert_eq!(result.novel[0].title, "Title 3");
    }

    #[test]
    fn test_title_change_is_a_new_item() {
        let prev = vec![make_posting("001", "Old Title")];
        let curr = vec![make_posting("001", "New Title")];

        let result = calculate_diff(Some(&snapshot_of(&prev)), &curr);
        assert_eq!(result.novel.len(), 1);
        assert_eq!(result.forgotten, 1);
    }

    #[test]
    fn test_replaces_wholesale() {
        let prev = vec![make_posting("001", "Keep"), make_posting("002", "Gone")];
        let curr = vec![make_posting("001", "Keep")];

        let result = calculate_diff(Some(&snapshot_of(&prev)), &curr);
        assert!(!result.has_changes());
        assert_eq!(result.forgotten, 1);
        assert_eq!(result.next, snapshot_of(&curr));

        // The forgotten item is novel again when it comes back
        let again = calculate_diff(Some(&result.next), &prev);
        assert_eq!(again.novel.len(), 1);
        assert_eq!(again.novel[0].title, "Gone");
    }

    #[test]
    fn test_duplicate_items_notified_once() {
        let prev = vec![make_posting("001", "Keep")];
        let curr = vec![
            make_posting("001", "Keep"),
            make_posting("002", "Twice"),
            make_posting("002", "Twice"),
        ];

        let result = calculate_diff(Some(&snapshot_of(&prev)), &curr);
        assert_eq!(result.novel.len(), 1);
        assert_eq!(result.next.len(), 2);
    }

    #[test]
    fn test_empty_previous_is_cold_start() {
        let curr = vec![
            make_posting("001", "First Notice"),
            make_posting("002", "Second Notice"),
            make_posting("003", "Third Notice"),
        ];

        let result = calculate_diff(Some(&Snapshot::new()), &curr);
        assert!(result.cold_start);
        assert!(!result.has_changes());
        assert_eq!(result.next.len(), 3);
    }

    #[test]
    fn test_full_to_empty() {
        let prev = vec![make_posting("001", "Last Notice")];
        let curr: Vec<Posting> = vec![];

        let result = calculate_diff(Some(&snapshot_of(&prev)), &curr);
        assert!(!result.has_changes());
        assert!(result.next.is_empty());
        assert_eq!(result.forgotten, 1);
    }
}
