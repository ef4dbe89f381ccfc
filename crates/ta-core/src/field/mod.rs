// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Per-field event loop
//!
//! A field is one tokio task that owns all of its state and consumes a
//! single message channel in arrival order: host events, timer fires and
//! fetch completions. Hosts talk to it through a [`FieldHandle`] and
//! listen on the returned notification channel.

mod events;
mod handle;
mod state;

use std::collections::BTreeMap;
use std::sync::Arc;

use ta_config::EngineSettings;
use ta_domain_types::{Candidate, RecordType};
use ta_search_api::{Geocoder, SearchResult, SearchService};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

pub use events::{FieldInput, FieldNotification, FieldSnapshot, Key};
pub use handle::FieldHandle;

use crate::timers::TimerKind;
use crate::virtual_list::ListView;
use state::FieldState;

/// Collaborators shared by every field of a host
#[derive(Clone)]
pub struct FieldDeps {
    pub settings: Arc<EngineSettings>,
    pub search: Arc<dyn SearchService>,
    pub geocoder: Option<Arc<dyn Geocoder>>,
}

impl FieldDeps {
    pub fn new(settings: Arc<EngineSettings>, search: Arc<dyn SearchService>) -> Self {
        Self {
            settings,
            search,
            geocoder: None,
        }
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }
}

/// How one field is set up by its host
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOptions {
    pub record_type: RecordType,
    /// Makes the field multi-value
    pub separator: Option<String>,
    pub request_params: BTreeMap<String, String>,
    pub offer_create: bool,
    /// Pre-filled input value
    pub value: String,
}

impl FieldOptions {
    pub fn new(record_type: RecordType) -> Self {
        Self {
            record_type,
            separator: None,
            request_params: BTreeMap::new(),
            offer_create: false,
            value: String::new(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn with_request_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.request_params = params;
        self
    }

    pub fn with_offer_create(mut self, offer_create: bool) -> Self {
        self.offer_create = offer_create;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

/// Unified loop message: host input, timer fires and request completions
#[derive(Debug)]
pub(crate) enum LoopMsg {
    Host(FieldInput),
    KeyDown {
        key: Key,
        reply: oneshot::Sender<bool>,
    },
    Snapshot(oneshot::Sender<FieldSnapshot>),
    Timer {
        kind: TimerKind,
        generation: u64,
    },
    Fetched {
        seq: u64,
        result: SearchResult<Vec<Candidate>>,
    },
    Geocoded {
        seq: u64,
        result: SearchResult<Vec<Candidate>>,
    },
    LookedUp {
        generation: u64,
        name: String,
        result: SearchResult<Vec<Candidate>>,
    },
    Shutdown,
}

/// A running field
pub struct SpawnedField {
    pub handle: FieldHandle,
    pub notifications: mpsc::UnboundedReceiver<FieldNotification>,
    pub task: JoinHandle<()>,
}

/// Start a field rendering into `view`
pub fn spawn_field<V>(deps: FieldDeps, options: FieldOptions, view: V) -> SpawnedField
where
    V: ListView + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<LoopMsg>();
    let (notify_tx, notify_rx) = mpsc::unbounded_channel();
    let state = FieldState::new(deps, options, view, tx.downgrade(), notify_tx);
    let task = tokio::spawn(run_field_loop(state, rx));
    SpawnedField {
        handle: FieldHandle::new(tx),
        notifications: notify_rx,
        task,
    }
}

async fn run_field_loop<V: ListView>(
    mut state: FieldState<V>,
    mut rx: mpsc::UnboundedReceiver<LoopMsg>,
) {
    state.prepare();
    while let Some(msg) = rx.recv().await {
        if state.handle(msg).is_break() {
            break;
        }
    }
    state.shutdown();
    debug!("field loop stopped");
}
