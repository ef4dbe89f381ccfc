// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Primer cache

use ta_domain_types::Candidate;

/// Most recent candidate set fetched for the current prefix. Replaced
/// wholesale, never edited entry by entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Primer {
    entries: Vec<Candidate>,
}

impl Primer {
    pub fn entries(&self) -> &[Candidate] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn replace(&mut self, entries: Vec<Candidate>) {
        self.entries = entries;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Split a trailing truncation marker off a fetched list; the flag is
/// true when one was present
pub fn strip_truncation(mut candidates: Vec<Candidate>) -> (Vec<Candidate>, bool) {
    if candidates.last().is_some_and(Candidate::is_truncation_marker) {
        candidates.pop();
        (candidates, true)
    } else {
        (candidates, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_marker_sets_incomplete() {
        let (list, incomplete) =
            strip_truncation(vec![Candidate::new("Agaricus", 1), Candidate::new("…", 0)]);
        assert!(incomplete);
        assert_eq!(list, vec![Candidate::new("Agaricus", 1)]);

        let (list, incomplete) = strip_truncation(vec![Candidate::new("Agaricus", 1)]);
        assert!(!incomplete);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn marker_only_list_becomes_empty() {
        let (list, incomplete) = strip_truncation(vec![Candidate::new("...", 0)]);
        assert!(incomplete);
        assert!(list.is_empty());
    }

    #[test]
    fn replace_swaps_all_entries() {
        let mut primer = Primer::default();
        primer.replace(vec![Candidate::new("A", 1), Candidate::new("B", 2)]);
        assert_eq!(primer.len(), 2);
        primer.replace(vec![Candidate::new("C", 3)]);
        assert_eq!(primer.entries(), &[Candidate::new("C", 3)]);
        primer.clear();
        assert!(primer.is_empty());
    }
}
