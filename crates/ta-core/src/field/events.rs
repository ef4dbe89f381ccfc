// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Messages exchanged between a field and its host

use std::collections::BTreeMap;

use serde::Serialize;
use ta_domain_types::{BindingSnapshot, Candidate, KeptRecord, RecordType};

use crate::type_switch::SelectionMode;

/// Keys the field reacts to while the list is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    /// Any key that edits the text
    Other,
}

impl Key {
    /// Keys handled by the list rather than the text input
    pub fn is_hot(self) -> bool {
        !matches!(self, Key::Other)
    }

    /// Navigation keys that auto-repeat while held
    pub fn repeats(self) -> bool {
        matches!(self, Key::PageUp | Key::PageDown | Key::Up | Key::Down)
    }
}

/// Events a host forwards to the field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    Focus,
    Blur,
    Click,
    /// The full input value after an edit
    Input(String),
    KeyDown(Key),
    KeyUp,
    /// The list was scrolled externally to this row offset
    ScrollTo(usize),
    /// A visible slot was chosen
    SelectRow(usize),
    Swap {
        record_type: RecordType,
        request_params: Option<BTreeMap<String, String>>,
        keep_binding: bool,
    },
    /// Geocoded places computed by the host
    GeocodedPrimer(Vec<Candidate>),
    /// Keep the binding while the text is ambiguous
    SetIgnoreInput(bool),
}

/// Events the field reports to its host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FieldNotification {
    /// The field rewrote the input value
    InputValue { value: String },
    BindingChanged { binding: BindingSnapshot },
    /// Show or hide the offer to create a new record
    CreateLink { visible: bool },
    TypeSwapped {
        record_type: RecordType,
        hidden_field: String,
        mode: SelectionMode,
    },
}

/// Point-in-time view of a field's state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSnapshot {
    pub value: String,
    pub record_type: RecordType,
    pub mode: SelectionMode,
    pub focused: bool,
    pub primer: Vec<Candidate>,
    pub primer_incomplete: bool,
    pub fetch_in_flight: bool,
    pub last_request: String,
    pub matches: Vec<Candidate>,
    pub current_row: Option<usize>,
    pub scroll_offset: usize,
    pub highlight: Option<usize>,
    pub open: bool,
    pub binding: BindingSnapshot,
    pub kept: Vec<Option<KeptRecord>>,
    pub hidden_field: String,
    pub create_link_visible: bool,
}

impl FieldSnapshot {
    pub fn match_names(&self) -> Vec<&str> {
        self.matches.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn bound_ids(&self) -> Vec<Option<i64>> {
        match &self.binding {
            BindingSnapshot::Single { record } => vec![record.as_ref().map(|r| r.id)],
            BindingSnapshot::Multiple { ids } => ids.clone(),
        }
    }
}
