// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only
#![allow(clippy::disallowed_methods)] // CLI commands intentionally print to stdout/stderr

//! `ta types`: the record type table as configured

use strum::IntoEnumIterator;
use ta_config::EngineSettings;
use ta_core::{FieldConfig, Strategy};
use ta_domain_types::RecordType;

/// One row of the record type table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRow {
    pub record_type: RecordType,
    pub hidden_field: String,
    pub strategy: String,
    pub flags: Vec<&'static str>,
}

pub fn type_rows(settings: &EngineSettings) -> Vec<TypeRow> {
    RecordType::iter()
        .map(|record_type| {
            let config = FieldConfig::new(settings, record_type);
            let strategy = match config.strategy {
                Strategy::Normal => "normal".to_string(),
                Strategy::Unordered => "unordered".to_string(),
                Strategy::Collapsed { level } => format!("collapsed({level})"),
                Strategy::Select => "select".to_string(),
            };
            let options = &config.options;
            let flags = [
                (options.whole_words_only, "whole-words"),
                (options.preserve_order, "preserve-order"),
                (options.autofill_single_match, "autofill"),
                (record_type.is_geocode_fallback(), "geocoded"),
            ]
            .into_iter()
            .filter_map(|(on, flag)| on.then_some(flag))
            .collect();
            TypeRow {
                record_type,
                hidden_field: record_type.hidden_field_name(),
                strategy,
                flags,
            }
        })
        .collect()
}

pub fn run(settings: &EngineSettings) {
    println!("{:<20} {:<16} {:<14} flags", "type", "hidden field", "strategy");
    for row in type_rows(settings) {
        println!(
            "{:<20} {:<16} {:<14} {}",
            row.record_type.as_str(),
            row.hidden_field,
            row.strategy,
            row.flags.join(",")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_reflect_overrides() {
        let mut settings = EngineSettings::default();
        settings.types.get_mut("location").unwrap().collapse = 2;

        let rows = type_rows(&settings);
        assert_eq!(rows.len(), RecordType::iter().count());
        let location = rows.iter().find(|r| r.record_type == RecordType::Location).unwrap();
        assert_eq!(location.strategy, "collapsed(2)");

        let google = rows.iter().find(|r| r.record_type == RecordType::LocationGoogle).unwrap();
        assert_eq!(google.strategy, "select");
        assert_eq!(google.flags, vec!["geocoded"]);
        assert_eq!(google.hidden_field, "location_id");
    }
}
