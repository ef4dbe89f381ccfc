// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Matching engine
//!
//! Pure functions from (primer, token, strategy) to a match list. Names are
//! compared in NFC form, lower-cased.

use std::collections::HashSet;

use ta_domain_types::Candidate;
use unicode_normalization::UnicodeNormalization;

use crate::config::Strategy;
use crate::token::space_count;

/// NFC-normalized, lower-cased form used for every comparison
pub fn normalize(s: &str) -> String {
    s.nfc().collect::<String>().to_lowercase()
}

/// Candidates of `primer` matching `token`, in primer order
pub fn compute_matches(primer: &[Candidate], token: &str, strategy: Strategy) -> Vec<Candidate> {
    match strategy {
        Strategy::Normal => normal(primer, token),
        Strategy::Unordered => unordered(primer, token),
        Strategy::Collapsed { level } => collapsed(primer, token, level),
        Strategy::Select => primer.to_vec(),
    }
}

/// Sort by case-insensitive name (ties keep primer order) and drop
/// consecutive entries with equal names, keeping the first
pub fn sort_and_dedupe(mut matches: Vec<Candidate>) -> Vec<Candidate> {
    matches.sort_by_cached_key(|c| normalize(&c.name));
    matches.dedup_by(|later, earlier| later.name == earlier.name);
    matches
}

/// Select mode: `None` when the current matches already hold the same
/// names as the primer, otherwise the primer verbatim
pub fn select_matches(primer: &[Candidate], current: &[Candidate]) -> Option<Vec<Candidate>> {
    let primer_names: HashSet<&str> = primer.iter().map(|c| c.name.as_str()).collect();
    let current_names: HashSet<&str> = current.iter().map(|c| c.name.as_str()).collect();
    if primer_names == current_names {
        None
    } else {
        Some(primer.to_vec())
    }
}

fn normal(primer: &[Candidate], token: &str) -> Vec<Candidate> {
    let token = normalize(token);
    if token.is_empty() {
        return Vec::new();
    }
    primer
        .iter()
        .filter(|c| !c.name.is_empty() && normalize(&c.name).contains(&token))
        .cloned()
        .collect()
}

fn unordered(primer: &[Candidate], token: &str) -> Vec<Candidate> {
    let token = normalize(token);
    let words: Vec<String> = token
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(|w| format!(" {w}"))
        .collect();
    if words.is_empty() {
        return Vec::new();
    }
    primer
        .iter()
        .filter(|c| {
            let padded = format!(" {} ", normalize(&c.name));
            words.iter().all(|w| padded.contains(w.as_str()))
        })
        .cloned()
        .collect()
}

/// Below `level` words in the token, each group of names sharing the
/// token's word depth is represented by its exact-prefix entry when one
/// exists. At `level` words or more, every containing name matches.
fn collapsed(primer: &[Candidate], token: &str, level: usize) -> Vec<Candidate> {
    let token = normalize(token);
    if token.is_empty() {
        return Vec::new();
    }
    let containing: Vec<(String, &Candidate)> = primer
        .iter()
        .map(|c| (normalize(&c.name), c))
        .filter(|(name, c)| !c.name.is_empty() && name.contains(&token))
        .collect();

    let depth = space_count(&token);
    if depth >= level {
        return containing.into_iter().map(|(_, c)| c.clone()).collect();
    }

    let mut groups: Vec<(String, Vec<(String, &Candidate)>)> = Vec::new();
    for (name, candidate) in containing {
        let key = name.split(' ').take(depth + 1).collect::<Vec<_>>().join(" ");
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push((name, candidate)),
            None => groups.push((key, vec![(name, candidate)])),
        }
    }

    let mut matches = Vec::new();
    for (key, members) in groups {
        match members.iter().find(|(name, _)| *name == key) {
            Some((_, representative)) => matches.push((*representative).clone()),
            None => matches.extend(members.into_iter().map(|(_, c)| c.clone())),
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primer(names: &[&str]) -> Vec<Candidate> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| Candidate::new(*n, i as i64 + 1))
            .collect()
    }

    fn names(matches: &[Candidate]) -> Vec<&str> {
        matches.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn normal_matches_substrings_anywhere() {
        let list = primer(&["Agaricus", "Boletus", "Tricholoma agaricoides"]);
        assert_eq!(
            names(&compute_matches(&list, "AGARIC", Strategy::Normal)),
            vec!["Agaricus", "Tricholoma agaricoides"]
        );
        assert!(compute_matches(&list, "", Strategy::Normal).is_empty());
    }

    #[test]
    fn normal_compares_normalized_forms() {
        let list = primer(&["Cort\u{0069}\u{0301}narius"]);
        assert_eq!(compute_matches(&list, "cortínarius", Strategy::Normal).len(), 1);
    }

    #[test]
    fn unordered_ignores_word_order() {
        let list = primer(&["Agaricus campestris", "Campestris agaricus"]);
        assert_eq!(compute_matches(&list, "campestris agar", Strategy::Unordered).len(), 2);
        assert!(compute_matches(&list, "campestris xyz", Strategy::Unordered).is_empty());
    }

    #[test]
    fn unordered_words_must_start_a_word() {
        let list = primer(&["Rolf Singer", "Mary Rolfson"]);
        assert_eq!(
            names(&compute_matches(&list, "  rolf   ", Strategy::Unordered)),
            vec!["Rolf Singer", "Mary Rolfson"]
        );
        assert_eq!(names(&compute_matches(&list, "olf", Strategy::Unordered)), Vec::<&str>::new());
        assert!(compute_matches(&list, "   ", Strategy::Unordered).is_empty());
    }

    #[test]
    fn collapsed_keeps_representative_until_drilldown() {
        let list = primer(&["Agaricus", "Agaricus campestris", "Agaricus bisporus"]);
        let strategy = Strategy::Collapsed { level: 1 };
        assert_eq!(names(&compute_matches(&list, "Agaricus", strategy)), vec!["Agaricus"]);

        let drilled = compute_matches(&list, "Agaricus c", strategy);
        assert_eq!(names(&drilled), vec!["Agaricus campestris"]);
    }

    #[test]
    fn collapsed_lists_groups_without_a_representative() {
        let list = primer(&[
            "Amanita muscaria",
            "Amanita phalloides",
            "Agaricus",
            "Agaricus bisporus",
        ]);
        let matches = compute_matches(&list, "a", Strategy::Collapsed { level: 1 });
        assert_eq!(names(&matches), vec!["Amanita muscaria", "Amanita phalloides", "Agaricus"]);
    }

    #[test]
    fn select_returns_primer_unless_names_unchanged() {
        let list = primer(&["B", "A"]);
        assert_eq!(names(&compute_matches(&list, "zzz", Strategy::Select)), vec!["B", "A"]);
        assert_eq!(select_matches(&list, &primer(&["A", "B"])), None);
        assert_eq!(select_matches(&list, &primer(&["A"])), Some(list.clone()));
    }

    #[test]
    fn sorting_dedupes_keeping_first() {
        let list = vec![
            Candidate::new("X", 2),
            Candidate::new("agaricus", 5),
            Candidate::new("X", 3),
            Candidate::new("Boletus", 4),
        ];
        let sorted = sort_and_dedupe(list);
        assert_eq!(names(&sorted), vec!["agaricus", "Boletus", "X"]);
        assert_eq!(sorted[2].id, 2);
    }
}
