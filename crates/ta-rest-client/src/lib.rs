// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! HTTP client for the remote autocomplete search service
//!
//! The service answers `GET <base>/autocompleters/new/<type>?string=...`
//! with a JSON array of candidates. This crate implements the
//! [`SearchService`] trait on top of it.

pub mod client;
pub mod error;

pub use client::*;
pub use error::*;

use async_trait::async_trait;
use ta_domain_types::{Candidate, RecordType, SearchRequest};
use ta_search_api::{SearchError, SearchResult, SearchService};

impl From<RestClientError> for SearchError {
    fn from(err: RestClientError) -> Self {
        match err {
            RestClientError::Http(e) => SearchError::Transport(e.to_string()),
            RestClientError::Url(e) => SearchError::Transport(e.to_string()),
            RestClientError::Json(e) => SearchError::Malformed(e.to_string()),
            RestClientError::ServerError { status, body } => SearchError::Server {
                status: status.as_u16(),
                body,
            },
        }
    }
}

#[async_trait]
impl SearchService for client::RestSearchClient {
    async fn search(
        &self,
        record_type: RecordType,
        request: &SearchRequest,
    ) -> SearchResult<Vec<Candidate>> {
        self.fetch_candidates(record_type, request).await.map_err(SearchError::from)
    }
}
