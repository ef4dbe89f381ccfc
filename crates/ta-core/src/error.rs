// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Domain(#[from] ta_domain_types::DomainError),

    #[error(transparent)]
    Config(#[from] ta_config::ConfigError),

    #[error("field task has stopped")]
    FieldClosed,
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
