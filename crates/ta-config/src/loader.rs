// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Layer loading: TOML files, environment and flags

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value as J;
use tracing::debug;

use crate::merge::{insert_dotted, merge_layer, scalar_from_flag};
use crate::settings::EngineSettings;

/// Prefix of environment variables read into the configuration
pub const ENV_PREFIX: &str = "TA";

/// Files consulted while resolving configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Per-user file; skipped when missing
    pub user: Option<PathBuf>,
    /// File named on the command line; must exist
    pub explicit: Option<PathBuf>,
}

impl ConfigPaths {
    /// Standard user file plus an optional explicit one
    pub fn discover(explicit: Option<&Path>) -> Self {
        Self {
            user: dirs::config_dir().map(|dir| dir.join("typeahead").join("config.toml")),
            explicit: explicit.map(Path::to_path_buf),
        }
    }
}

/// Parse TOML text into a JSON value for merging
pub fn parse_toml_to_json(toml_str: &str) -> Result<J> {
    let value: toml::Value = toml_str.parse()?;
    Ok(serde_json::to_value(value)?)
}

/// Read one configuration file as a JSON layer
pub fn read_layer_from_file(path: &Path) -> Result<J> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading config file {:?}", path))?;
    parse_toml_to_json(&content).with_context(|| format!("parsing config file {:?}", path))
}

/// Layer built from `TA_*` variables; `__` separates nesting levels,
/// e.g. `TA_TIMING__REFRESH_DELAY_MS=200`
pub fn env_overlay() -> Result<J> {
    env_overlay_from(None)
}

/// Same as [`env_overlay`], reading from `source` instead of the process
/// environment when given
pub fn env_overlay_from(source: Option<config::Map<String, String>>) -> Result<J> {
    let built = config::Config::builder()
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(source),
        )
        .build()?;

    Ok(serde_json::to_value(
        built.try_deserialize::<serde_json::Map<String, J>>()?,
    )?)
}

/// Layer built from `key=value` command-line pairs
pub fn flags_overlay(kv_pairs: &[(&str, &str)]) -> J {
    let mut root = serde_json::json!({});
    for (k, v) in kv_pairs {
        insert_dotted(&mut root, k, scalar_from_flag(v));
    }
    root
}

/// Resolve settings from every layer in precedence order
pub fn load_settings(paths: &ConfigPaths, flags: &[(&str, &str)]) -> Result<EngineSettings> {
    let mut json = serde_json::to_value(EngineSettings::default())?;

    if let Some(user) = paths.user.as_deref().filter(|p| p.exists()) {
        debug!(path = ?user, "loading user config");
        merge_layer(&mut json, read_layer_from_file(user)?);
    }
    if let Some(explicit) = paths.explicit.as_deref() {
        debug!(path = ?explicit, "loading config file");
        merge_layer(&mut json, read_layer_from_file(explicit)?);
    }
    merge_layer(&mut json, env_overlay()?);
    merge_layer(&mut json, flags_overlay(flags));

    resolve(json)
}

/// Deserialize and validate a merged JSON document
pub fn resolve(json: J) -> Result<EngineSettings> {
    let settings: EngineSettings =
        serde_json::from_value(json).context("configuration does not match the expected shape")?;
    settings.validate()?;
    Ok(settings)
}
