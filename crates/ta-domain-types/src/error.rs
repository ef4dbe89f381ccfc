// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;

/// Errors raised while interpreting domain values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown record type: {0:?}")]
    UnknownRecordType(String),
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;
