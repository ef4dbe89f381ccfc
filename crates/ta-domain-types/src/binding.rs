// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Record bindings exposed to the host form

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;

/// Record bound to a single-value field, including the attributes the
/// host mirrors next to the hidden identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundRecord {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl From<&Candidate> for BoundRecord {
    fn from(candidate: &Candidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name.clone(),
            extra: candidate.extra.clone(),
        }
    }
}

/// Name/identifier pair kept for one slot of a multi-value field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeptRecord {
    pub name: String,
    pub id: i64,
}

impl From<&Candidate> for KeptRecord {
    fn from(candidate: &Candidate) -> Self {
        Self {
            name: candidate.name.clone(),
            id: candidate.id,
        }
    }
}

/// What the hidden field(s) carry at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BindingSnapshot {
    Single { record: Option<BoundRecord> },
    Multiple { ids: Vec<Option<i64>> },
}

impl BindingSnapshot {
    /// Value of the hidden input: one id, or comma-joined ids with empty
    /// placeholders for unresolved slots
    pub fn hidden_value(&self) -> String {
        match self {
            BindingSnapshot::Single { record } => {
                record.as_ref().map(|r| r.id.to_string()).unwrap_or_default()
            }
            BindingSnapshot::Multiple { ids } => ids
                .iter()
                .map(|id| id.map(|id| id.to_string()).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Whether any identifier is bound
    pub fn has_binding(&self) -> bool {
        match self {
            BindingSnapshot::Single { record } => record.is_some(),
            BindingSnapshot::Multiple { ids } => ids.iter().any(Option::is_some),
        }
    }
}
