// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Immutable per-field configuration
//!
//! A [`FieldConfig`] is built once when a field is created and replaced as
//! a whole when the record type is swapped. Nothing mutates it in place.

use std::collections::BTreeMap;

use ta_config::{DisplaySettings, EngineSettings, Timing, TypeOptions};
use ta_domain_types::RecordType;

/// How matches are derived from the primer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Substring of the normalized name
    Normal,
    /// Every word of the token starts a word of the name, in any order
    Unordered,
    /// Hierarchical names: one representative per prefix until the token
    /// reaches `level` words
    Collapsed { level: usize },
    /// The primer verbatim, first entry auto-selected
    Select,
}

impl Strategy {
    pub fn for_options(options: &TypeOptions) -> Self {
        if options.act_like_select {
            Strategy::Select
        } else if options.collapse > 0 {
            Strategy::Collapsed {
                level: options.collapse,
            }
        } else if options.unordered {
            Strategy::Unordered
        } else {
            Strategy::Normal
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    pub record_type: RecordType,
    pub options: TypeOptions,
    pub strategy: Strategy,
    /// Set for multi-value fields
    pub separator: Option<String>,
    /// Type-specific parameters sent with every fetch (e.g. lat/lng)
    pub request_params: BTreeMap<String, String>,
    /// Offer to create a record when nothing matches
    pub offer_create: bool,
    pub timing: Timing,
    pub display: DisplaySettings,
    pub max_string_length: usize,
}

impl FieldConfig {
    pub fn new(settings: &EngineSettings, record_type: RecordType) -> Self {
        let options = settings.type_options(record_type);
        FieldConfig {
            record_type,
            strategy: Strategy::for_options(&options),
            options,
            separator: None,
            request_params: BTreeMap::new(),
            offer_create: false,
            timing: settings.timing.clone(),
            display: settings.display.clone(),
            max_string_length: settings.request.max_string_length,
        }
    }

    /// Make the field multi-value; an empty separator keeps it single-value
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        self.separator = (!separator.is_empty()).then_some(separator);
        self
    }

    pub fn with_request_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.request_params = params;
        self
    }

    pub fn with_offer_create(mut self, offer_create: bool) -> Self {
        self.offer_create = offer_create;
        self
    }

    /// Configuration for `record_type`, keeping the field-level settings.
    /// Request params carry over unless new ones are given.
    pub fn swapped(
        &self,
        settings: &EngineSettings,
        record_type: RecordType,
        request_params: Option<BTreeMap<String, String>>,
    ) -> Self {
        let mut next = FieldConfig::new(settings, record_type)
            .with_offer_create(self.offer_create)
            .with_request_params(request_params.unwrap_or_else(|| self.request_params.clone()));
        next.separator = self.separator.clone();
        next
    }

    pub fn is_multi_value(&self) -> bool {
        self.separator.is_some()
    }

    pub fn separator(&self) -> Option<&str> {
        self.separator.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_follows_type_table() {
        let settings = EngineSettings::default();
        let strategy = |t| FieldConfig::new(&settings, t).strategy;
        assert_eq!(strategy(RecordType::Name), Strategy::Collapsed { level: 1 });
        assert_eq!(strategy(RecordType::User), Strategy::Unordered);
        assert_eq!(strategy(RecordType::Clade), Strategy::Normal);
        assert_eq!(strategy(RecordType::LocationContaining), Strategy::Select);
        assert_eq!(strategy(RecordType::LocationGoogle), Strategy::Select);
    }

    #[test]
    fn empty_separator_means_single_value() {
        let settings = EngineSettings::default();
        assert!(!FieldConfig::new(&settings, RecordType::User).with_separator("").is_multi_value());
        assert_eq!(
            FieldConfig::new(&settings, RecordType::User).with_separator("\n").separator(),
            Some("\n")
        );
    }

    #[test]
    fn swap_keeps_field_settings_and_replaces_type_options() {
        let settings = EngineSettings::default();
        let params = BTreeMap::from([("lat".to_string(), "1.5".to_string())]);
        let config = FieldConfig::new(&settings, RecordType::Location)
            .with_separator(",")
            .with_offer_create(true)
            .with_request_params(params.clone());

        let swapped = config.swapped(&settings, RecordType::LocationGoogle, None);
        assert_eq!(swapped.strategy, Strategy::Select);
        assert_eq!(swapped.separator(), Some(","));
        assert!(swapped.offer_create);
        assert_eq!(swapped.request_params, params);

        let replaced = config.swapped(&settings, RecordType::Region, Some(BTreeMap::new()));
        assert!(replaced.request_params.is_empty());
        assert!(replaced.options.preserve_order);
    }
}
