// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only
#![allow(clippy::disallowed_methods)] // CLI commands intentionally print to stdout/stderr

//! Configuration inspection commands
use anyhow::{anyhow, Result};
use clap::Subcommand;
use serde_json::Value;
use ta_config::EngineSettings;

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show {
        /// Show only this dotted key, e.g. `timing.refresh_delay_ms`
        key: Option<String>,
        /// Print JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

impl ConfigCommands {
    pub fn run(self, settings: &EngineSettings) -> Result<()> {
        match self {
            ConfigCommands::Show { key, json } => {
                println!("{}", show_config(settings, key.as_deref(), json)?)
            }
        }
        Ok(())
    }
}

/// Render the settings, or the value under `key`
pub fn show_config(settings: &EngineSettings, key: Option<&str>, json: bool) -> Result<String> {
    let resolved = serde_json::to_value(settings)?;
    let value = match key {
        Some(key) => get_nested_value(&resolved, key)
            .ok_or_else(|| anyhow!("no configuration key {key:?}"))?
            .clone(),
        None => resolved,
    };
    match (&value, json) {
        (Value::Object(_), false) => Ok(toml::to_string_pretty(&value)?),
        (Value::String(s), false) => Ok(s.clone()),
        (other, false) => Ok(other.to_string()),
        (other, true) => Ok(serde_json::to_string_pretty(other)?),
    }
}

fn get_nested_value<'a>(root: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted.split('.').try_fold(root, |value, part| value.get(part))
}
