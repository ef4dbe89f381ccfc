// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("server error {status}: {body}")]
    ServerError { status: StatusCode, body: String },
}

pub type RestClientResult<T> = std::result::Result<T, RestClientError>;
