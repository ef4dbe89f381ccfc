// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Search token extraction
//!
//! The token is the part of the input value being completed: the whole
//! value for single-value fields, the text after the last separator for
//! multi-value fields.

/// Token under completion. Whole-words fields only yield a token once the
/// value ends in a word separator; trailing periods are dropped.
pub fn search_token(value: &str, separator: Option<&str>, whole_words_only: bool) -> String {
    if whole_words_only && !(value.ends_with(',') || value.ends_with(' ')) {
        return String::new();
    }
    let token = match separator {
        Some(sep) => value.rfind(sep).map_or(value, |i| &value[i + sep.len()..]),
        None => value,
    };
    token.trim_end_matches('.').to_string()
}

/// `value` with its token replaced by `replacement`
pub fn replace_search_token(value: &str, separator: Option<&str>, replacement: &str) -> String {
    match separator.and_then(|sep| value.rfind(sep).map(|i| i + sep.len())) {
        Some(start) => format!("{}{}", &value[..start], replacement),
        None => replacement.to_string(),
    }
}

/// Trimmed separator-delimited entries; empty for an empty value
pub fn input_array(value: &str, separator: Option<&str>) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    match separator {
        Some(sep) => value.split(sep).map(|part| part.trim().to_string()).collect(),
        None => vec![value.trim().to_string()],
    }
}

/// String sent to the search service for `token`
pub fn request_token(token: &str, max_chars: usize, whole_words_only: bool) -> String {
    let lowered = token.to_lowercase();
    let mut capped: String = lowered.trim().chars().take(max_chars).collect();
    if whole_words_only {
        if let Some(comma) = capped.find(',') {
            capped.truncate(comma);
        }
        capped = capped.trim().to_string();
    }
    capped
}

/// Number of word gaps (single spaces) in `s`
pub fn space_count(s: &str) -> usize {
    s.matches(' ').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_token_is_whole_value_without_trailing_periods() {
        assert_eq!(search_token("Amanita muscaria..", None, false), "Amanita muscaria");
        assert_eq!(search_token("agar", None, false), "agar");
    }

    #[test]
    fn multi_value_token_follows_last_separator() {
        assert_eq!(search_token("Agaricus, Boletus, Am", Some(","), false), " Am");
        assert_eq!(search_token("Agaricus", Some("\n"), false), "Agaricus");
    }

    #[test]
    fn whole_words_waits_for_word_end() {
        assert_eq!(search_token("Rolf Sing", None, true), "");
        assert_eq!(search_token("Rolf ", None, true), "Rolf ");
        assert_eq!(search_token("Rolf,", None, true), "Rolf,");
    }

    #[test]
    fn replace_keeps_earlier_entries() {
        assert_eq!(
            replace_search_token("A, B, c", Some(", "), "Cantharellus"),
            "A, B, Cantharellus"
        );
        assert_eq!(replace_search_token("agar", None, "Agaricus"), "Agaricus");
        assert_eq!(replace_search_token("agar", Some(","), "Agaricus"), "Agaricus");
    }

    #[test]
    fn input_array_trims_entries() {
        assert!(input_array("", Some(",")).is_empty());
        assert_eq!(input_array("A, B ,C", Some(",")), vec!["A", "B", "C"]);
        assert_eq!(input_array("A,", Some(",")), vec!["A", ""]);
    }

    #[test]
    fn request_token_is_lowercased_trimmed_and_capped() {
        assert_eq!(request_token("  Agaricus  ", 50, false), "agaricus");
        assert_eq!(request_token("Agaricus campestris", 4, false), "agar");
        assert_eq!(request_token("Rolf Singer, ", 50, true), "rolf singer");
    }
}
