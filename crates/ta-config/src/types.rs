// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Per record type matching options

use serde::{Deserialize, Serialize};
use ta_domain_types::RecordType;

/// Options that change how a record type fetches and matches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeOptions {
    /// Match every word of the token, in any order
    pub unordered: bool,
    /// Words a name needs before drilldown matching shows siblings (0 = off)
    pub collapse: usize,
    /// Only refresh once the token ends in a word separator
    pub whole_words_only: bool,
    /// Keep the server's order instead of sorting
    pub preserve_order: bool,
    /// Show the fetched list verbatim and auto-select its first entry
    pub act_like_select: bool,
    /// Do not open the list when it would show a single entry
    pub autofill_single_match: bool,
}

impl TypeOptions {
    /// Built-in options for `record_type`
    pub fn defaults_for(record_type: RecordType) -> Self {
        match record_type {
            RecordType::Clade => Self::default(),
            RecordType::Herbarium
            | RecordType::Location
            | RecordType::Project
            | RecordType::SpeciesList
            | RecordType::User => Self {
                unordered: true,
                ..Self::default()
            },
            RecordType::LocationContaining => Self {
                act_like_select: true,
                autofill_single_match: true,
                ..Self::default()
            },
            RecordType::LocationGoogle => Self {
                act_like_select: true,
                ..Self::default()
            },
            RecordType::Name => Self {
                collapse: 1,
                ..Self::default()
            },
            RecordType::Region => Self {
                unordered: true,
                preserve_order: true,
                ..Self::default()
            },
        }
    }

    /// Whether matches keep the fetched order
    pub fn keeps_server_order(&self) -> bool {
        self.act_like_select || self.preserve_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_collapses_at_one_word() {
        let options = TypeOptions::defaults_for(RecordType::Name);
        assert_eq!(options.collapse, 1);
        assert!(!options.unordered);
    }

    #[test]
    fn region_keeps_server_order() {
        let options = TypeOptions::defaults_for(RecordType::Region);
        assert!(options.unordered);
        assert!(options.keeps_server_order());
        assert!(!TypeOptions::defaults_for(RecordType::Location).keeps_server_order());
    }

    #[test]
    fn containing_locations_act_like_select() {
        let options = TypeOptions::defaults_for(RecordType::LocationContaining);
        assert!(options.act_like_select);
        assert!(options.autofill_single_match);
        assert!(!TypeOptions::defaults_for(RecordType::LocationGoogle).autofill_single_match);
    }
}
