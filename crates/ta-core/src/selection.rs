// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Selection state: which record identifiers are bound to the field
//!
//! Multi-value fields keep two index-aligned lists, bound identifiers and
//! kept name/id pairs, one slot per separator-delimited entry of the input.
//! Unresolved slots hold `None`.

use ta_domain_types::{BindingSnapshot, BoundRecord, Candidate, KeptRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Single {
        bound: Option<BoundRecord>,
    },
    Multiple {
        ids: Vec<Option<i64>>,
        kept: Vec<Option<KeptRecord>>,
    },
}

impl Selection {
    pub fn new(multi_value: bool) -> Self {
        if multi_value {
            Selection::Multiple {
                ids: Vec::new(),
                kept: Vec::new(),
            }
        } else {
            Selection::Single { bound: None }
        }
    }

    pub fn snapshot(&self) -> BindingSnapshot {
        match self {
            Selection::Single { bound } => BindingSnapshot::Single {
                record: bound.clone(),
            },
            Selection::Multiple { ids, .. } => BindingSnapshot::Multiple { ids: ids.clone() },
        }
    }

    pub fn bound_ids(&self) -> Vec<Option<i64>> {
        match self {
            Selection::Single { bound } => vec![bound.as_ref().map(|b| b.id)],
            Selection::Multiple { ids, .. } => ids.clone(),
        }
    }

    pub fn kept(&self) -> &[Option<KeptRecord>] {
        match self {
            Selection::Single { .. } => &[],
            Selection::Multiple { kept, .. } => kept,
        }
    }

    /// Identifier bound to slot `index` (ignored for single-value fields)
    pub fn bound_id(&self, index: usize) -> Option<i64> {
        match self {
            Selection::Single { bound } => bound.as_ref().map(|b| b.id),
            Selection::Multiple { ids, .. } => ids.get(index).copied().flatten(),
        }
    }

    /// Bind `candidate` to slot `index` (ignored for single-value fields)
    pub fn bind(&mut self, index: usize, candidate: &Candidate) {
        match self {
            Selection::Single { bound } => *bound = Some(BoundRecord::from(candidate)),
            Selection::Multiple { ids, kept } => {
                if ids.len() <= index {
                    ids.resize(index + 1, None);
                }
                if kept.len() <= index {
                    kept.resize(index + 1, None);
                }
                ids[index] = Some(candidate.id);
                kept[index] = Some(KeptRecord::from(candidate));
            }
        }
    }

    /// Unbind slot `index`; the slot itself stays so alignment holds
    pub fn clear_slot(&mut self, index: usize) {
        match self {
            Selection::Single { bound } => *bound = None,
            Selection::Multiple { ids, kept } => {
                if let Some(id) = ids.get_mut(index) {
                    *id = None;
                }
                if let Some(k) = kept.get_mut(index) {
                    *k = None;
                }
            }
        }
    }

    /// Drop every binding and all kept data
    pub fn clear_all(&mut self) {
        match self {
            Selection::Single { bound } => *bound = None,
            Selection::Multiple { ids, kept } => {
                ids.clear();
                kept.clear();
            }
        }
    }

    /// Realign the slots with `inputs`: kept pairs move to the index of
    /// their name, pairs whose name left the input are dropped. Returns the
    /// non-empty entries that have no kept pair.
    pub fn sync(&mut self, inputs: &[String]) -> Vec<String> {
        let Selection::Multiple { ids, kept } = self else {
            return Vec::new();
        };

        let mut old: Vec<Option<(Option<i64>, KeptRecord)>> = kept
            .iter()
            .enumerate()
            .map(|(i, k)| k.clone().map(|k| (ids.get(i).copied().flatten(), k)))
            .collect();

        let mut new_ids = vec![None; inputs.len()];
        let mut new_kept = vec![None; inputs.len()];
        let mut missing = Vec::new();
        for (i, input) in inputs.iter().enumerate() {
            let found = old
                .iter_mut()
                .find(|slot| matches!(slot, Some((_, k)) if k.name == *input))
                .and_then(Option::take);
            match found {
                Some((id, k)) => {
                    new_ids[i] = id;
                    new_kept[i] = Some(k);
                }
                None if !input.is_empty() => missing.push(input.clone()),
                None => {}
            }
        }

        *ids = new_ids;
        *kept = new_kept;
        missing
    }

    /// Place a looked-up record at the index where its name appears in
    /// `inputs`; returns that index
    pub fn place_lookup(&mut self, inputs: &[String], candidate: &Candidate) -> Option<usize> {
        if !matches!(self, Selection::Multiple { .. }) {
            return None;
        }
        let index = inputs.iter().position(|input| *input == candidate.name)?;
        if let Selection::Multiple { ids, kept } = self {
            ids.resize(inputs.len().max(ids.len()), None);
            kept.resize(inputs.len().max(kept.len()), None);
        }
        self.bind(index, candidate);
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(value: &str) -> Vec<String> {
        value.split(',').map(|s| s.trim().to_string()).collect()
    }

    fn multi_with(names: &[(&str, i64)]) -> Selection {
        let mut selection = Selection::new(true);
        for (i, (name, id)) in names.iter().enumerate() {
            selection.bind(i, &Candidate::new(*name, *id));
        }
        selection
    }

    #[test]
    fn single_binding_carries_extra_attributes() {
        let mut selection = Selection::new(false);
        let candidate = Candidate::new("California, USA", 7).with_extra("north", 42.0);
        selection.bind(0, &candidate);

        match selection.snapshot() {
            BindingSnapshot::Single { record: Some(record) } => {
                assert_eq!(record.id, 7);
                assert_eq!(record.extra.get("north"), Some(&serde_json::json!(42.0)));
            }
            other => panic!("unexpected {other:?}"),
        }
        selection.clear_slot(3);
        assert_eq!(selection.bound_id(0), None);
    }

    #[test]
    fn sync_drops_removed_names_and_reports_new_ones() {
        let mut selection = multi_with(&[("A", 1), ("B", 2), ("C", 3)]);
        let missing = selection.sync(&inputs("A, X, C"));

        assert_eq!(missing, vec!["X".to_string()]);
        assert_eq!(selection.bound_ids(), vec![Some(1), None, Some(3)]);
        assert_eq!(selection.kept().len(), 3);
        assert!(selection.kept()[1].is_none());
    }

    #[test]
    fn sync_follows_reordered_entries() {
        let mut selection = multi_with(&[("A", 1), ("B", 2)]);
        let missing = selection.sync(&inputs("B, Q, A"));
        assert_eq!(missing, vec!["Q".to_string()]);
        assert_eq!(selection.bound_ids(), vec![Some(2), None, Some(1)]);
    }

    #[test]
    fn lookups_land_at_their_input_index() {
        let mut selection = multi_with(&[("A", 1), ("B", 2), ("C", 3)]);
        let current = inputs("A, X, C");
        selection.sync(&current);

        assert_eq!(selection.place_lookup(&current, &Candidate::new("X", 9)), Some(1));
        assert_eq!(selection.bound_ids(), vec![Some(1), Some(9), Some(3)]);
        assert_eq!(selection.place_lookup(&current, &Candidate::new("Z", 4)), None);
    }

    #[test]
    fn clearing_a_slot_keeps_alignment() {
        let mut selection = multi_with(&[("A", 1), ("B", 2)]);
        selection.clear_slot(0);
        assert_eq!(selection.bound_ids(), vec![None, Some(2)]);
        selection.clear_all();
        assert!(selection.bound_ids().is_empty());
        assert!(!selection.snapshot().has_binding());
    }

    #[test]
    fn empty_entries_are_not_missing() {
        let mut selection = Selection::new(true);
        assert_eq!(selection.sync(&inputs("A,")), vec!["A".to_string()]);
        assert_eq!(selection.bound_ids(), vec![None, None]);
    }
}
