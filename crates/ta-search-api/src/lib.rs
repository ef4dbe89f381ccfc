// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Collaborators the engine fetches candidates from
//!
//! The engine talks to a [`SearchService`] for record candidates and, for
//! the geocode fallback type, to a [`Geocoder`]. Both return primer-shaped
//! candidate lists; a truncated list ends with a marker entry named `"..."`.

use std::sync::Arc;

use async_trait::async_trait;
use ta_domain_types::{Candidate, LatLng, RecordType, SearchRequest};

/// Errors a search collaborator can report
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server responded with {status}: {body}")]
    Server { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("no geocoder available")]
    Unavailable,
}

pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Remote candidate search
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Fetch candidates of `record_type` for `request`, in service order
    async fn search(
        &self,
        record_type: RecordType,
        request: &SearchRequest,
    ) -> SearchResult<Vec<Candidate>>;
}

/// Source of place candidates that are not stored records yet
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Candidates for a free-text place, optionally near a point; every
    /// entry carries the unsaved record id
    async fn geolocate(&self, place: &str, near: Option<LatLng>) -> SearchResult<Vec<Candidate>>;
}

#[async_trait]
impl<T: SearchService + ?Sized> SearchService for Arc<T> {
    async fn search(
        &self,
        record_type: RecordType,
        request: &SearchRequest,
    ) -> SearchResult<Vec<Candidate>> {
        (**self).search(record_type, request).await
    }
}

#[async_trait]
impl<T: Geocoder + ?Sized> Geocoder for Arc<T> {
    async fn geolocate(&self, place: &str, near: Option<LatLng>) -> SearchResult<Vec<Candidate>> {
        (**self).geolocate(place, near).await
    }
}
