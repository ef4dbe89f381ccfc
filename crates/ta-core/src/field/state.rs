// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! State owned by one field task
//!
//! Every method runs on the field task; nothing here is shared. Work that
//! has to wait (timers, fetches, lookups) is spawned and reports back
//! through the loop channel.

use std::collections::{BTreeMap, HashSet};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use ta_config::EngineSettings;
use ta_domain_types::{BindingSnapshot, Candidate, LatLng, RecordType, SearchRequest};
use ta_search_api::{Geocoder, SearchResult, SearchService};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::events::{FieldInput, FieldNotification, FieldSnapshot, Key};
use super::{FieldDeps, FieldOptions, LoopMsg};
use crate::config::{FieldConfig, Strategy};
use crate::cursor::Cursor;
use crate::matching::{compute_matches, select_matches, sort_and_dedupe};
use crate::primer::{strip_truncation, Primer};
use crate::scheduler::{Completion, RefreshDecision, RequestMemo};
use crate::selection::Selection;
use crate::timers::{PendingTask, TimerKind, Timers};
use crate::token::{input_array, replace_search_token, search_token, space_count};
use crate::type_switch::{geocode_fallback_params, plan_swap, SelectionMode};
use crate::virtual_list::{ListView, VirtualList};

pub(crate) struct FieldState<V> {
    settings: Arc<EngineSettings>,
    search: Arc<dyn SearchService>,
    geocoder: Option<Arc<dyn Geocoder>>,
    config: FieldConfig,
    view: V,
    list: VirtualList,
    cursor: Cursor,
    primer: Primer,
    matches: Vec<Candidate>,
    memo: RequestMemo,
    selection: Selection,
    /// Binding last reported to the host
    notified: BindingSnapshot,
    value: String,
    old_value: Option<String>,
    focused: bool,
    ignore_input: bool,
    create_link_visible: bool,
    held_key: Option<Key>,
    fetch_cancel: Option<CancellationToken>,
    geocode_seq: u64,
    lookups: PendingTask,
    /// Bumped whenever the lookup batch is replaced or abandoned
    lookup_generation: u64,
    lookup_pending: Vec<String>,
    lookup_failed: HashSet<String>,
    timers: Timers,
    tx: mpsc::WeakUnboundedSender<LoopMsg>,
    notifications: mpsc::UnboundedSender<FieldNotification>,
}

impl<V: ListView> FieldState<V> {
    pub(crate) fn new(
        deps: FieldDeps,
        options: FieldOptions,
        view: V,
        tx: mpsc::WeakUnboundedSender<LoopMsg>,
        notifications: mpsc::UnboundedSender<FieldNotification>,
    ) -> Self {
        let config = FieldConfig::new(&deps.settings, options.record_type)
            .with_separator(options.separator.unwrap_or_default())
            .with_request_params(options.request_params)
            .with_offer_create(options.offer_create);
        let selection = Selection::new(config.is_multi_value());
        let notified = selection.snapshot();
        FieldState {
            list: VirtualList::new(&config.display),
            settings: deps.settings,
            search: deps.search,
            geocoder: deps.geocoder,
            config,
            view,
            cursor: Cursor::default(),
            primer: Primer::default(),
            matches: Vec::new(),
            memo: RequestMemo::default(),
            selection,
            notified,
            value: options.value,
            old_value: None,
            focused: false,
            ignore_input: false,
            create_link_visible: false,
            held_key: None,
            fetch_cancel: None,
            geocode_seq: 0,
            lookups: PendingTask::default(),
            lookup_generation: 0,
            lookup_pending: Vec::new(),
            lookup_failed: HashSet::new(),
            timers: Timers::default(),
            tx,
            notifications,
        }
    }

    /// Bring the selection in line with a pre-filled value
    pub(crate) fn prepare(&mut self) {
        if !self.value.is_empty() {
            self.update_hidden_id();
        }
    }

    pub(crate) fn handle(&mut self, msg: LoopMsg) -> ControlFlow<()> {
        match msg {
            LoopMsg::Host(input) => self.on_input(input),
            LoopMsg::KeyDown { key, reply } => {
                let consumed = self.key_down(key);
                let _ = reply.send(consumed);
            }
            LoopMsg::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            LoopMsg::Timer { kind, generation } => {
                if self.timers.get_mut(kind).accept(generation) {
                    self.on_timer(kind);
                } else {
                    trace!(?kind, generation, "stale timer fire");
                }
            }
            LoopMsg::Fetched { seq, result } => self.on_fetched(seq, result),
            LoopMsg::Geocoded { seq, result } => self.on_geocoded(seq, result),
            LoopMsg::LookedUp {
                generation,
                name,
                result,
            } => {
                if generation == self.lookup_generation {
                    self.on_looked_up(name, result);
                } else {
                    trace!(name = %name, generation, "dropping stale lookup");
                }
            }
            LoopMsg::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    pub(crate) fn shutdown(&mut self) {
        self.timers.cancel_all();
        self.lookups.cancel();
        if let Some(cancel) = self.fetch_cancel.take() {
            cancel.cancel();
        }
    }

    fn on_input(&mut self, input: FieldInput) {
        match input {
            FieldInput::Focus => {
                self.list.ensure_row_height(&mut self.view);
                self.focused = true;
            }
            FieldInput::Blur => {
                self.schedule_hide();
                self.focused = false;
            }
            FieldInput::Click => self.schedule_refresh(),
            FieldInput::Input(value) => {
                self.value = value;
                self.our_change(true);
            }
            FieldInput::KeyDown(key) => {
                self.key_down(key);
            }
            FieldInput::KeyUp => {
                self.stop_repeat();
                self.our_change(true);
            }
            FieldInput::ScrollTo(offset) => {
                if self.cursor.scroll_to(offset, self.matches.len(), self.list.window()) {
                    self.draw();
                }
            }
            FieldInput::SelectRow(slot) => self.select_row(slot),
            FieldInput::Swap {
                record_type,
                request_params,
                keep_binding,
            } => self.swap(record_type, request_params, keep_binding),
            FieldInput::GeocodedPrimer(places) => {
                self.focused = true;
                let (places, _) = strip_truncation(places);
                self.absorb_primer(places);
            }
            FieldInput::SetIgnoreInput(ignore) => self.ignore_input = ignore,
        }
    }

    fn on_timer(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::Refresh => self.on_refresh_timer(),
            TimerKind::Hide => self.list.close(&mut self.view),
            TimerKind::KeyRepeat => {
                if let Some(key) = self.held_key {
                    self.navigate(key);
                    let interval = self.config.timing.key_repeat_interval();
                    self.schedule_timer(TimerKind::KeyRepeat, interval);
                }
            }
            TimerKind::CreateLink => {
                if !self.create_link_visible {
                    self.create_link_visible = true;
                    self.notify(FieldNotification::CreateLink { visible: true });
                }
            }
            TimerKind::BindingNotify => {
                let binding = self.selection.snapshot();
                if binding != self.notified {
                    debug!(hidden = %binding.hidden_value(), "binding changed");
                    self.notified = binding.clone();
                    self.notify(FieldNotification::BindingChanged { binding });
                }
            }
        }
    }

    // ---- text changes and refresh ----

    fn our_change(&mut self, do_refresh: bool) {
        if self.value.is_empty() {
            self.clear_hidden_id();
        } else if self.old_value.as_deref() != Some(self.value.as_str()) && do_refresh {
            self.schedule_refresh();
        }
    }

    fn schedule_refresh(&mut self) {
        if self.config.record_type.is_geocode_fallback()
            && LatLng::from_params(&self.config.request_params).is_some()
        {
            self.draw();
            return;
        }
        self.schedule_timer(TimerKind::Refresh, self.config.timing.refresh_delay());
    }

    fn on_refresh_timer(&mut self) {
        if self.config.record_type.is_geocode_fallback() {
            self.geolocate();
            return;
        }
        self.old_value = Some(self.value.clone());
        self.refresh_primer();
        self.populate_matches();
        if self.should_paint() {
            self.draw();
        }
    }

    fn search_token(&self) -> String {
        search_token(
            &self.value,
            self.config.separator(),
            self.config.options.whole_words_only,
        )
    }

    fn token_index(&self) -> usize {
        input_array(&self.value, self.config.separator())
            .len()
            .saturating_sub(1)
    }

    fn refresh_primer(&mut self) {
        let token = self.search_token();
        match self.memo.decide(&token, &self.config) {
            RefreshDecision::Skip(reason) => {
                trace!(?reason, token = %token, "refresh needs no fetch")
            }
            RefreshDecision::Defer => {}
            RefreshDecision::Fetch(request) => self.send_fetch(request),
        }
    }

    fn send_fetch(&mut self, request: SearchRequest) {
        let Some(tx) = self.tx.upgrade() else {
            return;
        };
        if let Some(previous) = self.fetch_cancel.take() {
            previous.cancel();
        }
        let seq = self.memo.begin(&request);
        let cancel = CancellationToken::new();
        self.fetch_cancel = Some(cancel.clone());

        let search = Arc::clone(&self.search);
        let record_type = self.config.record_type;
        debug!(%record_type, string = %request.string, seq, "fetching primer");
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                result = search.search(record_type, &request) => {
                    let _ = tx.send(LoopMsg::Fetched { seq, result });
                }
            }
        });
    }

    fn on_fetched(&mut self, seq: u64, result: SearchResult<Vec<Candidate>>) {
        match result {
            Ok(candidates) => {
                let (candidates, incomplete) = strip_truncation(candidates);
                match self.memo.complete(seq, incomplete) {
                    Completion::Stale => trace!(seq, "dropping stale primer"),
                    Completion::Current { rerun_deferred } => {
                        self.fetch_cancel = None;
                        debug!(seq, count = candidates.len(), incomplete, "primer received");
                        self.absorb_primer(candidates);
                        if rerun_deferred {
                            self.schedule_refresh();
                        }
                    }
                }
            }
            Err(err) => {
                if self.memo.fail(seq) {
                    self.fetch_cancel = None;
                    warn!(
                        record_type = %self.config.record_type,
                        error = %err,
                        "primer fetch failed, keeping previous primer"
                    );
                }
            }
        }
    }

    fn absorb_primer(&mut self, candidates: Vec<Candidate>) {
        if candidates.is_empty() {
            if self.config.options.act_like_select {
                let params = geocode_fallback_params(self.memo.last_params());
                info!(
                    record_type = %self.config.record_type,
                    "constrained search found nothing, falling back to geocoding"
                );
                self.swap(RecordType::LocationGoogle, Some(params), false);
            }
            return;
        }
        if !self.focused || self.primer.entries() == candidates.as_slice() {
            return;
        }
        self.primer.replace(candidates);
        self.populate_matches();
        if self.should_paint() {
            self.draw();
        }
    }

    fn should_paint(&self) -> bool {
        !self.config.options.autofill_single_match || self.matches.len() > 1
    }

    // ---- geocoding ----

    fn geolocate(&mut self) {
        let Some(geocoder) = self.geocoder.clone() else {
            debug!("no geocoder configured");
            return;
        };
        let Some(tx) = self.tx.upgrade() else {
            return;
        };
        self.old_value = Some(self.value.clone());
        self.geocode_seq += 1;
        let seq = self.geocode_seq;
        let place = self.value.clone();
        let near = LatLng::from_params(&self.config.request_params);
        debug!(place = %place, seq, "geolocating");
        tokio::spawn(async move {
            let result = geocoder.geolocate(&place, near).await;
            let _ = tx.send(LoopMsg::Geocoded { seq, result });
        });
    }

    fn on_geocoded(&mut self, seq: u64, result: SearchResult<Vec<Candidate>>) {
        if seq != self.geocode_seq {
            return;
        }
        match result {
            Ok(places) => {
                self.focused = true;
                let (places, _) = strip_truncation(places);
                self.absorb_primer(places);
            }
            Err(err) => warn!(error = %err, "geocoding failed"),
        }
    }

    // ---- matches ----

    fn populate_matches(&mut self) {
        let previous = self
            .cursor
            .current_row
            .and_then(|row| self.matches.get(row))
            .map(|c| c.name.clone());

        match self.config.strategy {
            Strategy::Select => self.populate_select(),
            strategy => {
                let token = self.search_token();
                let matches = compute_matches(self.primer.entries(), &token, strategy);
                if strategy == Strategy::Unordered {
                    self.update_create_link(matches.is_empty());
                }
                self.matches = if self.config.options.keeps_server_order() {
                    matches
                } else {
                    sort_and_dedupe(matches)
                };
            }
        }

        self.cursor.reseed(&self.matches, previous.as_deref(), self.list.window());
        self.update_hidden_id();
    }

    fn populate_select(&mut self) {
        let Some(primer) = select_matches(self.primer.entries(), &self.matches) else {
            return;
        };
        self.matches = primer;
        let token = self.search_token();
        let selected = self.matches.iter().any(|m| m.name == token);
        if selected || self.selection.bound_id(self.token_index()).is_some() {
            return;
        }
        if let Some(first) = self.matches.first().cloned() {
            debug!(name = %first.name, "selecting first candidate");
            self.set_search_token(&first.name);
            self.assign_hidden_id(&first);
        }
    }

    fn update_create_link(&mut self, no_matches: bool) {
        if !self.config.offer_create || self.config.record_type.is_geocode_fallback() {
            return;
        }
        if no_matches {
            if !self.create_link_visible {
                self.schedule_timer(TimerKind::CreateLink, self.config.timing.create_link_delay());
            }
        } else {
            self.timers.create_link.cancel();
            if self.create_link_visible {
                self.create_link_visible = false;
                self.notify(FieldNotification::CreateLink { visible: false });
            }
        }
    }

    // ---- bindings ----

    fn update_hidden_id(&mut self) {
        if self.config.is_multi_value() {
            self.sync_selection();
        }
        let token = self.search_token();
        let wanted = token.trim();
        let index = self.token_index();
        let perfect = self.matches.iter().find(|m| m.name == wanted).cloned();
        match perfect {
            Some(perfect) => {
                if self.selection.bound_id(index) != Some(perfect.id) {
                    self.assign_hidden_id(&perfect);
                }
            }
            None if !self.ignore_input && !self.matches.is_empty() => self.clear_hidden_id(),
            None => {}
        }
    }

    fn assign_hidden_id(&mut self, candidate: &Candidate) {
        trace!(id = candidate.id, name = %candidate.name, "binding");
        self.selection.bind(self.token_index(), candidate);
        self.binding_changed();
    }

    fn clear_hidden_id(&mut self) {
        if self.value.is_empty() {
            self.selection.clear_all();
            self.abandon_lookups();
            self.lookup_failed.clear();
        } else {
            self.selection.clear_slot(self.token_index());
        }
        self.binding_changed();
    }

    /// Schedule the debounced notification when the binding differs from
    /// what the host last saw
    fn binding_changed(&mut self) {
        if self.selection.snapshot() != self.notified {
            let delay = self.config.timing.binding_notify_delay();
            self.schedule_timer(TimerKind::BindingNotify, delay);
        } else {
            self.timers.binding_notify.cancel();
        }
    }

    fn sync_selection(&mut self) {
        let inputs = input_array(&self.value, self.config.separator());
        let missing: Vec<String> = self
            .selection
            .sync(&inputs)
            .into_iter()
            .filter(|name| !self.lookup_failed.contains(name))
            .collect();
        self.binding_changed();

        if missing.is_empty() {
            self.abandon_lookups();
        } else if missing != self.lookup_pending {
            self.schedule_lookups(missing);
        }
    }

    /// Look up each missing name on its own, staggered so the service
    /// sees a bounded request rate
    fn schedule_lookups(&mut self, names: Vec<String>) {
        let Some(tx) = self.tx.upgrade() else {
            return;
        };
        self.lookup_generation += 1;
        let generation = self.lookup_generation;
        debug!(?names, generation, "looking up unresolved entries");
        self.lookup_pending = names.clone();
        let search = Arc::clone(&self.search);
        let record_type = self.config.record_type;
        let params = self.config.request_params.clone();
        let stagger = self.config.timing.lookup_stagger();
        self.lookups.spawn(async move {
            for (i, name) in names.into_iter().enumerate() {
                if i > 0 {
                    tokio::time::sleep(stagger).await;
                }
                let mut request = SearchRequest::new(name.clone()).with_params(&params);
                request.whole = true;
                request.all = true;
                request.exact = true;
                let search = Arc::clone(&search);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = search.search(record_type, &request).await;
                    let _ = tx.send(LoopMsg::LookedUp {
                        generation,
                        name,
                        result,
                    });
                });
            }
        });
    }

    /// Stop the current batch; replies already in flight are dropped
    fn abandon_lookups(&mut self) {
        self.lookups.cancel();
        self.lookup_generation += 1;
        self.lookup_pending.clear();
    }

    fn on_looked_up(&mut self, name: String, result: SearchResult<Vec<Candidate>>) {
        self.lookup_pending.retain(|pending| *pending != name);
        match result {
            Ok(found) => {
                let (found, _) = strip_truncation(found);
                let Some(record) = found.into_iter().next() else {
                    debug!(name = %name, "no record for entry");
                    self.lookup_failed.insert(name);
                    return;
                };
                let inputs = input_array(&self.value, self.config.separator());
                if let Some(index) = self.selection.place_lookup(&inputs, &record) {
                    trace!(name = %name, index, id = record.id, "entry resolved");
                    self.binding_changed();
                }
            }
            Err(err) => warn!(name = %name, error = %err, "entry lookup failed"),
        }
    }

    // ---- list and keys ----

    fn draw(&mut self) {
        let token = self.search_token();
        let open = self
            .list
            .repaint(&mut self.view, &self.matches, &self.cursor, &token);
        if open {
            self.timers.hide.cancel();
        }
    }

    fn schedule_hide(&mut self) {
        self.schedule_timer(TimerKind::Hide, self.config.timing.hide_delay());
    }

    fn key_down(&mut self, key: Key) -> bool {
        self.stop_repeat();
        self.focused = true;
        if self.list.is_open() {
            let len = self.matches.len() as isize;
            match key {
                Key::Escape => {
                    self.schedule_hide();
                    self.list.close(&mut self.view);
                }
                Key::Enter | Key::Tab => {
                    if let Some(row) = self.cursor.current_row {
                        self.select_row(row.saturating_sub(self.cursor.scroll_offset));
                    }
                }
                Key::Home => self.move_cursor(-len),
                Key::End => self.move_cursor(len),
                key if key.repeats() => {
                    self.navigate(key);
                    self.held_key = Some(key);
                    self.schedule_timer(
                        TimerKind::KeyRepeat,
                        self.config.timing.key_repeat_initial(),
                    );
                }
                _ => self.cursor.clear_row(),
            }
        }
        self.list.is_open() && key.is_hot() && key != Key::Tab && self.cursor.current_row.is_some()
    }

    fn navigate(&mut self, key: Key) {
        let page = self.config.display.page_size as isize;
        match key {
            Key::PageUp => self.move_cursor(-page),
            Key::PageDown => self.move_cursor(page),
            Key::Up => self.move_cursor(-1),
            Key::Down => self.move_cursor(1),
            _ => {}
        }
    }

    fn stop_repeat(&mut self) {
        self.held_key = None;
        self.timers.key_repeat.cancel();
    }

    fn move_cursor(&mut self, rows: isize) {
        if self
            .cursor
            .move_by(rows, self.matches.len(), self.list.window())
        {
            self.draw();
        }
    }

    fn select_row(&mut self, slot: usize) {
        let Some(chosen) = self.matches.get(self.cursor.scroll_offset + slot).cloned() else {
            return;
        };
        let mut value = chosen.name.clone();
        let level = self.config.options.collapse;
        if level > 0 && space_count(&value) < level {
            value.push(' ');
            self.schedule_refresh();
        } else {
            self.schedule_hide();
        }
        self.assign_hidden_id(&chosen);
        self.set_search_token(&value);
        self.our_change(false);
        self.focused = true;
    }

    fn set_search_token(&mut self, token: &str) {
        let value = replace_search_token(&self.value, self.config.separator(), token);
        if value != self.value {
            self.value = value.clone();
            self.notify(FieldNotification::InputValue { value });
        }
    }

    // ---- record type swaps ----

    fn swap(
        &mut self,
        record_type: RecordType,
        request_params: Option<BTreeMap<String, String>>,
        keep_binding: bool,
    ) {
        let Some(plan) = plan_swap(
            &self.config,
            &self.settings,
            record_type,
            request_params,
            keep_binding,
        ) else {
            debug!(%record_type, "record type unchanged");
            return;
        };
        info!(
            from = %self.config.record_type,
            to = %record_type,
            mode = ?plan.mode,
            "swapping record type"
        );

        if let Some(cancel) = self.fetch_cancel.take() {
            cancel.cancel();
        }
        self.timers.refresh.cancel();
        self.timers.create_link.cancel();
        self.abandon_lookups();
        self.lookup_failed.clear();
        self.geocode_seq += 1;

        self.config = plan.config;
        self.primer.clear();
        self.matches.clear();
        self.cursor = Cursor::default();
        self.memo.reset();
        self.old_value = None;
        self.list.reset_width();
        self.list.close(&mut self.view);
        if plan.clear_binding {
            self.selection.clear_all();
            self.binding_changed();
        }

        self.notify(FieldNotification::TypeSwapped {
            record_type,
            hidden_field: record_type.hidden_field_name(),
            mode: plan.mode,
        });

        if !self.value.is_empty() {
            self.update_hidden_id();
        }
        match plan.mode {
            SelectionMode::Create => {
                if LatLng::from_params(&self.config.request_params).is_some() {
                    self.geolocate();
                }
            }
            SelectionMode::Constrained => {
                self.focused = true;
                self.refresh_primer();
            }
            SelectionMode::Regular => self.schedule_refresh(),
        }
    }

    // ---- plumbing ----

    fn schedule_timer(&mut self, kind: TimerKind, delay: Duration) {
        let Some(tx) = self.tx.upgrade() else {
            return;
        };
        self.timers.get_mut(kind).schedule(delay, move |generation| {
            let _ = tx.send(LoopMsg::Timer { kind, generation });
        });
    }

    fn notify(&self, notification: FieldNotification) {
        if self.notifications.send(notification).is_err() {
            trace!("host stopped listening for notifications");
        }
    }

    fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            value: self.value.clone(),
            record_type: self.config.record_type,
            mode: SelectionMode::for_config(&self.config),
            focused: self.focused,
            primer: self.primer.entries().to_vec(),
            primer_incomplete: self.memo.is_incomplete(),
            fetch_in_flight: self.memo.in_flight().is_some(),
            last_request: self.memo.last_request().to_string(),
            matches: self.matches.clone(),
            current_row: self.cursor.current_row,
            scroll_offset: self.cursor.scroll_offset,
            highlight: self.list.highlight(),
            open: self.list.is_open(),
            binding: self.selection.snapshot(),
            kept: self.selection.kept().to_vec(),
            hidden_field: self.config.record_type.hidden_field_name(),
            create_link_visible: self.create_link_visible,
        }
    }
}
