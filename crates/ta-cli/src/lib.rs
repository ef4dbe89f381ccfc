// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::path::Path;

use anyhow::{anyhow, Result};
use clap::Subcommand;
use ta_config::{load_settings, ConfigPaths, EngineSettings};
use ta_logging::CliLoggingArgs;

pub mod config_commands;
pub mod console_view;
pub mod query;
pub mod types_command;

pub use clap::Parser;

#[derive(clap::Parser)]
#[command(
    name = "ta",
    about = "Type-ahead CLI",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file layered over the user configuration
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override a setting, e.g. `--set timing.refresh_delay_ms=200`
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    pub set: Vec<String>,
    #[command(flatten)]
    pub logging: CliLoggingArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Type a value into a field and print what it offers
    Query(query::QueryArgs),
    /// List the record types and their matching options
    Types,
    Config {
        #[command(subcommand)]
        subcommand: config_commands::ConfigCommands,
    },
}

impl Cli {
    /// `--set` flags split into key/value pairs
    pub fn set_pairs(&self) -> Result<Vec<(&str, &str)>> {
        parse_pairs(&self.set)
    }

    /// Settings resolved from every configuration layer
    pub fn settings(&self) -> Result<EngineSettings> {
        let paths = ConfigPaths::discover(self.config.as_deref().map(Path::new));
        load_settings(&paths, &self.set_pairs()?)
    }
}

/// Split `key=value` arguments
pub fn parse_pairs(raw: &[String]) -> Result<Vec<(&str, &str)>> {
    raw.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.trim(), v.trim()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| anyhow!("expected KEY=VALUE, got {pair:?}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_are_split_on_the_first_equals() {
        let raw = vec![
            "service.base_url=http://x/?a=b".to_string(),
            " display.page_size = 5".to_string(),
        ];
        let pairs = parse_pairs(&raw).unwrap();
        assert_eq!(pairs[0], ("service.base_url", "http://x/?a=b"));
        assert_eq!(pairs[1], ("display.page_size", "5"));
    }

    #[test]
    fn malformed_pairs_are_rejected() {
        assert!(parse_pairs(&["no-equals".to_string()]).is_err());
        assert!(parse_pairs(&["=5".to_string()]).is_err());
    }

    #[test]
    fn query_arguments_parse() {
        let cli = Cli::try_parse_from([
            "ta",
            "--set",
            "timing.refresh_delay_ms=10",
            "query",
            "--type",
            "location",
            "--separator",
            ",",
            "Albion, Corv",
        ])
        .unwrap();
        assert_eq!(cli.set, vec!["timing.refresh_delay_ms=10"]);
        match cli.command {
            Commands::Query(args) => {
                assert_eq!(args.record_type, ta_domain_types::RecordType::Location);
                assert_eq!(args.separator.as_deref(), Some(","));
                assert_eq!(args.text, "Albion, Corv");
            }
            _ => panic!("expected query"),
        }
    }
}
