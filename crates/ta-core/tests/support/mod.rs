// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Shared helpers for field-level tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use ta_config::EngineSettings;
use ta_core::{spawn_field, FieldDeps, FieldNotification, FieldOptions, ListView, SpawnedField};
use ta_domain_types::Candidate;
use ta_mock_search::{MockGeocoder, MockSearchService};

/// What the view currently shows
#[derive(Debug, Default)]
pub struct ViewState {
    pub slots: BTreeMap<usize, Candidate>,
    pub extent: (u32, u32),
    pub highlight: Option<usize>,
    pub open: bool,
    pub min_width: usize,
    pub slot_writes: usize,
    pub measure_calls: usize,
}

/// `ListView` that records what it was told to show
#[derive(Debug, Clone)]
pub struct RecordingView {
    state: Arc<Mutex<ViewState>>,
    row_height: u32,
}

impl RecordingView {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ViewState::default())),
            row_height: 20,
        }
    }

    pub fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap()
    }

    pub fn visible_names(&self) -> Vec<String> {
        self.state().slots.values().map(|c| c.name.clone()).collect()
    }

    pub fn is_open(&self) -> bool {
        self.state().open
    }
}

impl ListView for RecordingView {
    fn measure_row_height(&mut self) -> u32 {
        self.state().measure_calls += 1;
        self.row_height
    }

    fn set_slot(&mut self, index: usize, content: Option<Candidate>) {
        let mut state = self.state();
        state.slot_writes += 1;
        match content {
            Some(candidate) => state.slots.insert(index, candidate),
            None => state.slots.remove(&index),
        };
    }

    fn set_window_extent(&mut self, total: u32, offset: u32) {
        self.state().extent = (total, offset);
    }

    fn set_highlight(&mut self, _old: Option<usize>, new: Option<usize>) {
        self.state().highlight = new;
    }

    fn set_open(&mut self, open: bool) {
        self.state().open = open;
    }

    fn set_min_width(&mut self, columns: usize) {
        self.state().min_width = columns;
    }
}

pub struct Harness {
    pub field: SpawnedField,
    pub view: RecordingView,
    pub search: MockSearchService,
}

impl Harness {
    pub fn start(search: MockSearchService, options: FieldOptions) -> Self {
        Self::start_with(search, None, options)
    }

    pub fn start_with(
        search: MockSearchService,
        geocoder: Option<MockGeocoder>,
        options: FieldOptions,
    ) -> Self {
        let settings = Arc::new(EngineSettings::default());
        let mut deps = FieldDeps::new(settings, Arc::new(search.clone()));
        if let Some(geocoder) = geocoder {
            deps = deps.with_geocoder(Arc::new(geocoder));
        }
        let view = RecordingView::new();
        let field = spawn_field(deps, options, view.clone());
        Self { field, view, search }
    }

    /// Simulate typing: the new value followed by key release
    pub async fn type_value(&self, value: &str) {
        self.field.handle.input(value).unwrap();
        self.field.handle.key_up().unwrap();
        settle().await;
    }

    /// Drain the notifications emitted so far
    pub fn notifications(&mut self) -> Vec<FieldNotification> {
        let mut out = Vec::new();
        while let Ok(notification) = self.field.notifications.try_recv() {
            out.push(notification);
        }
        out
    }
}

/// Let spawned tasks and the field loop run until they block
pub async fn settle() {
    for _ in 0..25 {
        tokio::task::yield_now().await;
    }
}

pub async fn advance_ms(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
    settle().await;
}

pub fn point(lat: &str, lng: &str) -> BTreeMap<String, String> {
    BTreeMap::from([("lat".to_string(), lat.to_string()), ("lng".to_string(), lng.to_string())])
}
