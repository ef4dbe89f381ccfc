// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory search collaborators
//!
//! [`MockSearchService`] answers searches from a fixed catalog the way the
//! remote service does (word-prefix matching, server-side truncation with
//! a trailing `"..."` marker) without touching the network. Every request
//! is logged so tests can assert on what the engine actually sent.
//! [`MockGeocoder`] does the same for geocoded places.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use ta_domain_types::{
    Candidate, LatLng, RecordType, SearchRequest, TRUNCATION_MARKERS, UNSAVED_RECORD_ID,
};
use ta_search_api::{Geocoder, SearchError, SearchResult, SearchService};
use tracing::debug;

/// Lock a mutex, ignoring poisoning from a panicked test thread
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock search service backed by an in-memory catalog
#[derive(Debug, Clone)]
pub struct MockSearchService {
    /// Candidates per record type, in the order the service returns them
    catalog: Arc<Mutex<BTreeMap<RecordType, Vec<Candidate>>>>,
    /// Every request received, in arrival order
    requests: Arc<Mutex<Vec<(RecordType, SearchRequest)>>>,
    /// Configurable delay for each search (in milliseconds)
    delay_ms: u64,
    /// Maximum entries before the list is truncated
    limit: usize,
    /// Whether searches currently fail
    failing: Arc<AtomicBool>,
}

impl Default for MockSearchService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearchService {
    /// Create an empty mock service with no delay
    pub fn new() -> Self {
        Self {
            catalog: Arc::new(Mutex::new(BTreeMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay_ms: 0,
            limit: 1000,
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a mock service whose searches take `delay_ms`
    pub fn with_delay(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::new()
        }
    }

    /// Create a mock service whose searches all fail
    pub fn with_failures(simulate_failures: bool) -> Self {
        let service = Self::new();
        service.set_failing(simulate_failures);
        service
    }

    /// Truncate results longer than `limit`
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Add candidates for a record type
    pub fn records(self, record_type: RecordType, candidates: Vec<Candidate>) -> Self {
        self.insert(record_type, candidates);
        self
    }

    /// Add named records with ids counting up from 1
    pub fn named(self, record_type: RecordType, names: &[&str]) -> Self {
        let candidates = names
            .iter()
            .enumerate()
            .map(|(i, name)| Candidate::new(*name, i as i64 + 1))
            .collect();
        self.records(record_type, candidates)
    }

    /// Load a catalog from JSON: `{ "<record type>": [candidates...] }`
    pub fn from_catalog_json(json: &str) -> SearchResult<Self> {
        let raw: BTreeMap<String, Vec<Candidate>> =
            serde_json::from_str(json).map_err(|e| SearchError::Malformed(e.to_string()))?;
        let service = Self::new();
        for (key, candidates) in raw {
            let record_type = key
                .parse::<RecordType>()
                .map_err(|e| SearchError::Malformed(e.to_string()))?;
            service.insert(record_type, candidates);
        }
        Ok(service)
    }

    /// Append candidates to the catalog of a record type
    pub fn insert(&self, record_type: RecordType, candidates: Vec<Candidate>) {
        lock(&self.catalog).entry(record_type).or_default().extend(candidates);
    }

    /// Toggle failure simulation
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<(RecordType, SearchRequest)> {
        lock(&self.requests).clone()
    }

    /// Query strings of all requests received so far
    pub fn requested_strings(&self) -> Vec<String> {
        lock(&self.requests).iter().map(|(_, r)| r.string.clone()).collect()
    }

    fn answer(&self, record_type: RecordType, request: &SearchRequest) -> Vec<Candidate> {
        let catalog = lock(&self.catalog);
        let Some(records) = catalog.get(&record_type) else {
            return Vec::new();
        };

        if request.exact {
            let wanted = request.string.trim().to_lowercase();
            return records
                .iter()
                .find(|c| c.name.to_lowercase() == wanted)
                .cloned()
                .into_iter()
                .collect();
        }

        let mut matches: Vec<Candidate> = if request.all {
            records.clone()
        } else {
            records
                .iter()
                .filter(|c| words_match(&c.name, &request.string, request.whole))
                .cloned()
                .collect()
        };

        if matches.len() > self.limit {
            matches.truncate(self.limit);
            matches.push(Candidate::new(TRUNCATION_MARKERS[0], 0));
        }
        matches
    }
}

/// Every query word starts (or, with `whole`, equals) some word of `name`
fn words_match(name: &str, query: &str, whole: bool) -> bool {
    let name = name.to_lowercase();
    let words: Vec<&str> = name.split_whitespace().collect();
    query.to_lowercase().split_whitespace().all(|q| {
        words.iter().any(|w| if whole { *w == q } else { w.starts_with(q) })
    })
}

#[async_trait]
impl SearchService for MockSearchService {
    async fn search(
        &self,
        record_type: RecordType,
        request: &SearchRequest,
    ) -> SearchResult<Vec<Candidate>> {
        lock(&self.requests).push((record_type, request.clone()));
        debug!(%record_type, string = %request.string, "mock search");

        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(SearchError::Server {
                status: 500,
                body: "Simulated search failure".to_string(),
            });
        }

        Ok(self.answer(record_type, request))
    }
}

/// Mock geocoder returning configured places as unsaved candidates
#[derive(Debug, Clone, Default)]
pub struct MockGeocoder {
    places: Arc<Mutex<Vec<Candidate>>>,
    requests: Arc<Mutex<Vec<(String, Option<LatLng>)>>>,
    delay_ms: u64,
}

impl MockGeocoder {
    pub fn new(places: Vec<Candidate>) -> Self {
        Self {
            places: Arc::new(Mutex::new(places)),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// All geocoding requests received so far
    pub fn requests(&self) -> Vec<(String, Option<LatLng>)> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geolocate(&self, place: &str, near: Option<LatLng>) -> SearchResult<Vec<Candidate>> {
        lock(&self.requests).push((place.to_string(), near));

        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }

        let wanted = place.trim().to_lowercase();
        Ok(lock(&self.places)
            .iter()
            .filter(|c| near.is_some() || c.name.to_lowercase().contains(&wanted))
            .map(|c| Candidate {
                id: UNSAVED_RECORD_ID,
                ..c.clone()
            })
            .collect())
    }
}
