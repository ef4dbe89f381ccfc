// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Configuration for the type-ahead engine
//!
//! Settings are resolved from layers of increasing precedence:
//! built-in defaults < user file < explicit file < `TA_*` environment <
//! command-line `key=value` flags. Layers are merged as JSON values and
//! deserialized into [`EngineSettings`] at the end.

pub mod error;
pub mod loader;
pub mod merge;
pub mod settings;
pub mod types;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigPaths, load_settings};
pub use settings::*;
pub use types::TypeOptions;
