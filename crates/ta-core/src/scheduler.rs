// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Request scheduling decisions
//!
//! [`RequestMemo`] remembers what was last sent and whether a fetch is in
//! flight, and decides for each debounced refresh whether a new fetch is
//! worth issuing. Debouncing itself lives in the field loop's timers.

use std::collections::BTreeMap;

use ta_domain_types::SearchRequest;
use tracing::debug;

use crate::config::FieldConfig;
use crate::token::request_token;

/// Why a refresh did not fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyToken,
    SameRequest,
    /// The last result was complete and the token only narrows it
    CompleteSuperset,
    /// Select mode with unchanged parameters
    SameParams,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshDecision {
    Skip(SkipReason),
    /// A broader request is in flight; wait for it
    Defer,
    Fetch(SearchRequest),
}

/// Outcome of a primer fetch as seen by the memo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Superseded by a newer fetch; ignore the result
    Stale,
    Current {
        /// A deferred narrower refresh should run now
        rerun_deferred: bool,
    },
}

#[derive(Debug, Clone)]
pub struct RequestMemo {
    last_request: String,
    last_params: Option<BTreeMap<String, String>>,
    incomplete: bool,
    in_flight: Option<u64>,
    deferred: bool,
    next_seq: u64,
}

impl Default for RequestMemo {
    fn default() -> Self {
        RequestMemo {
            last_request: String::new(),
            last_params: None,
            incomplete: true,
            in_flight: None,
            deferred: false,
            next_seq: 0,
        }
    }
}

impl RequestMemo {
    pub fn last_request(&self) -> &str {
        &self.last_request
    }

    pub fn last_params(&self) -> Option<&BTreeMap<String, String>> {
        self.last_params.as_ref()
    }

    pub fn is_incomplete(&self) -> bool {
        self.incomplete
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// Decide what a refresh for `token` should do
    pub fn decide(&mut self, token: &str, config: &FieldConfig) -> RefreshDecision {
        let select = config.options.act_like_select;
        let whole = config.options.whole_words_only;
        let token = request_token(token, config.max_string_length, whole);

        if !select && token.is_empty() {
            return RefreshDecision::Skip(SkipReason::EmptyToken);
        }
        if !select && token == self.last_request {
            return RefreshDecision::Skip(SkipReason::SameRequest);
        }

        let refines = !whole
            && self.last_request.len() < token.len()
            && token.starts_with(&self.last_request);

        if !self.incomplete && !self.last_request.is_empty() && refines {
            debug!(
                token = %token,
                last = %self.last_request,
                "complete results already cover token"
            );
            return RefreshDecision::Skip(SkipReason::CompleteSuperset);
        }
        if self.in_flight.is_some() && refines {
            debug!(token = %token, pending = %self.last_request, "broader request pending");
            self.deferred = true;
            return RefreshDecision::Defer;
        }

        let mut request = SearchRequest::new(token).with_params(&config.request_params);
        request.all = select;
        request.whole = whole;

        if select && self.last_params.as_ref() == Some(&request.non_string_params()) {
            return RefreshDecision::Skip(SkipReason::SameParams);
        }
        RefreshDecision::Fetch(request)
    }

    /// Record `request` as sent; returns its sequence number
    pub fn begin(&mut self, request: &SearchRequest) -> u64 {
        self.next_seq += 1;
        self.last_request = request.string.clone();
        self.last_params = Some(request.non_string_params());
        self.in_flight = Some(self.next_seq);
        self.deferred = false;
        self.next_seq
    }

    /// Record a successful response for fetch `seq`
    pub fn complete(&mut self, seq: u64, incomplete: bool) -> Completion {
        if self.in_flight != Some(seq) {
            return Completion::Stale;
        }
        self.in_flight = None;
        self.incomplete = incomplete;
        let rerun_deferred = std::mem::take(&mut self.deferred) && incomplete;
        Completion::Current { rerun_deferred }
    }

    /// Record a failed fetch. The failed request is forgotten so the next
    /// refresh for the same token tries again.
    pub fn fail(&mut self, seq: u64) -> bool {
        if self.in_flight != Some(seq) {
            return false;
        }
        self.in_flight = None;
        self.deferred = false;
        self.last_request.clear();
        self.last_params = None;
        self.incomplete = true;
        true
    }

    /// Forget everything, e.g. after a type swap
    pub fn reset(&mut self) {
        *self = RequestMemo {
            next_seq: self.next_seq,
            ..RequestMemo::default()
        };
    }
}
