// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Search candidates
//!
//! A candidate is one record offered by the search service (or by a
//! geocoder) for the current prefix. Candidates are immutable once
//! received; the engine only ever replaces whole lists of them.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Names the search service uses to mark a truncated result list.
pub const TRUNCATION_MARKERS: [&str; 2] = ["...", "…"];

/// Identifier carried by candidates that do not correspond to a stored
/// record yet (geocoded places).
pub const UNSAVED_RECORD_ID: i64 = -1;

/// One searchable record as returned by the search service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    /// Record identifier; `null` on the wire (the truncation marker) decodes to 0
    #[serde(default, deserialize_with = "id_or_zero")]
    pub id: i64,
    /// Any further attributes (`north`, `south`, `east`, `west`, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn id_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or_default())
}

impl Candidate {
    pub fn new(name: impl Into<String>, id: i64) -> Self {
        Self {
            name: name.into(),
            id,
            extra: BTreeMap::new(),
        }
    }

    /// Attach an extra attribute
    pub fn with_extra(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Whether this entry is the trailing "more results exist" marker
    pub fn is_truncation_marker(&self) -> bool {
        TRUNCATION_MARKERS.contains(&self.name.as_str())
    }

    /// Whether the candidate refers to a stored record
    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }

    /// Number of space-separated words in the name
    pub fn word_count(&self) -> usize {
        self.name.matches(' ').count() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_extra_attributes_and_null_ids() {
        let json = r#"[
            {"name": "Albion, California, USA", "id": 7, "north": 39.2, "south": 39.1},
            {"name": "...", "id": null}
        ]"#;
        let list: Vec<Candidate> = serde_json::from_str(json).unwrap();

        assert_eq!(list[0].id, 7);
        assert_eq!(list[0].extra.get("north"), Some(&serde_json::json!(39.2)));
        assert!(!list[0].is_truncation_marker());
        assert_eq!(list[1].id, 0);
        assert!(list[1].is_truncation_marker());
    }

    #[test]
    fn missing_id_defaults_to_zero() {
        let candidate: Candidate = serde_json::from_str(r#"{"name": "A"}"#).unwrap();
        assert_eq!(candidate.id, 0);
        assert!(!candidate.is_persisted());
    }

    #[test]
    fn counts_words() {
        assert_eq!(Candidate::new("Agaricus", 1).word_count(), 1);
        assert_eq!(Candidate::new("Agaricus campestris", 2).word_count(), 2);
    }
}
