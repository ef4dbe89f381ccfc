// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Search client implementation

use reqwest::{Client as HttpClient, Response, header::ACCEPT};
use ta_config::ServiceSettings;
use ta_domain_types::{Candidate, RecordType, SearchRequest};
use tracing::debug;
use url::Url;

use crate::error::{RestClientError, RestClientResult};

/// HTTP client for the autocomplete search endpoint
#[derive(Debug, Clone)]
pub struct RestSearchClient {
    http_client: HttpClient,
    base_url: Url,
    endpoint_path: String,
    leading_echo_row: bool,
}

impl RestSearchClient {
    /// Create a client from service settings
    pub fn from_settings(settings: &ServiceSettings) -> RestClientResult<Self> {
        let http_client = HttpClient::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout())
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(&settings.base_url)?,
            endpoint_path: settings.endpoint_path.clone(),
            leading_echo_row: settings.leading_echo_row,
        })
    }

    /// Create a client for a base URL with default settings
    pub fn from_url(base_url: &str) -> RestClientResult<Self> {
        Self::from_settings(&ServiceSettings {
            base_url: base_url.to_string(),
            ..ServiceSettings::default()
        })
    }

    /// Whether the service's first row echoes the query and must be dropped
    pub fn with_leading_echo_row(mut self, leading_echo_row: bool) -> Self {
        self.leading_echo_row = leading_echo_row;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Endpoint URL for one record type, query included
    pub fn endpoint(
        &self,
        record_type: RecordType,
        request: &SearchRequest,
    ) -> RestClientResult<Url> {
        let mut url = self
            .base_url
            .join(&format!("{}{}", self.endpoint_path, record_type.as_str()))?;
        url.query_pairs_mut().extend_pairs(request.query_pairs());
        Ok(url)
    }

    /// Fetch candidates for `request`
    pub async fn fetch_candidates(
        &self,
        record_type: RecordType,
        request: &SearchRequest,
    ) -> RestClientResult<Vec<Candidate>> {
        let url = self.endpoint(record_type, request)?;
        debug!(%url, "fetching candidates");

        let response = self
            .http_client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let candidates: Vec<Candidate> = self.handle_response(response).await?;
        Ok(self.strip_echo_row(request, candidates))
    }

    async fn handle_response(&self, response: Response) -> RestClientResult<Vec<Candidate>> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(RestClientError::from)
        } else {
            Err(RestClientError::ServerError { status, body: text })
        }
    }

    /// Drop the echo row of a prefix search; exact lookups carry none
    fn strip_echo_row(
        &self,
        request: &SearchRequest,
        mut candidates: Vec<Candidate>,
    ) -> Vec<Candidate> {
        let has_echo = self.leading_echo_row
            && !request.exact
            && candidates.first().is_some_and(|first| !first.is_truncation_marker());
        if has_echo {
            candidates.remove(0);
        }
        candidates
    }
}
