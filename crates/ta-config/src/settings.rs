// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Engine settings and their defaults

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use ta_domain_types::RecordType;

use crate::error::{ConfigError, ConfigResult};
use crate::types::TypeOptions;

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub timing: Timing,
    pub display: DisplaySettings,
    pub request: RequestSettings,
    pub service: ServiceSettings,
    /// Options per record type, keyed by the type's snake_case name
    pub types: BTreeMap<String, TypeOptions>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            timing: Timing::default(),
            display: DisplaySettings::default(),
            request: RequestSettings::default(),
            service: ServiceSettings::default(),
            types: RecordType::iter()
                .map(|t| (t.as_str().to_string(), TypeOptions::defaults_for(t)))
                .collect(),
        }
    }
}

impl EngineSettings {
    /// Options for `record_type`, falling back to the built-in table
    pub fn type_options(&self, record_type: RecordType) -> TypeOptions {
        self.types
            .get(record_type.as_str())
            .cloned()
            .unwrap_or_else(|| TypeOptions::defaults_for(record_type))
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.display.window_size == 0 {
            return Err(invalid("display.window_size", "must be at least 1"));
        }
        if self.display.page_size == 0 {
            return Err(invalid("display.page_size", "must be at least 1"));
        }
        if self.request.max_string_length == 0 {
            return Err(invalid("request.max_string_length", "must be at least 1"));
        }
        if self.timing.key_repeat_interval_ms == 0 {
            return Err(invalid("timing.key_repeat_interval_ms", "must be positive"));
        }
        for key in self.types.keys() {
            key.parse::<RecordType>()?;
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Delays of the per-field timers, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Debounce window between the last keystroke and a refresh
    pub refresh_delay_ms: u64,
    /// Delay before the list closes after blur or escape
    pub hide_delay_ms: u64,
    /// Hold time before a navigation key starts repeating
    pub key_repeat_initial_ms: u64,
    /// Interval between repeats of a held navigation key
    pub key_repeat_interval_ms: u64,
    /// Delay before offering to create a record nothing matched
    pub create_link_delay_ms: u64,
    /// Quiet period before a binding change is reported to the host
    pub binding_notify_delay_ms: u64,
    /// Spacing between lookups of unresolved multi-value tokens
    pub lookup_stagger_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            refresh_delay_ms: 330,
            hide_delay_ms: 500,
            key_repeat_initial_ms: 500,
            key_repeat_interval_ms: 30,
            create_link_delay_ms: 1000,
            binding_notify_delay_ms: 750,
            lookup_stagger_ms: 450,
        }
    }
}

impl Timing {
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    pub fn key_repeat_initial(&self) -> Duration {
        Duration::from_millis(self.key_repeat_initial_ms)
    }

    pub fn key_repeat_interval(&self) -> Duration {
        Duration::from_millis(self.key_repeat_interval_ms)
    }

    pub fn create_link_delay(&self) -> Duration {
        Duration::from_millis(self.create_link_delay_ms)
    }

    pub fn binding_notify_delay(&self) -> Duration {
        Duration::from_millis(self.binding_notify_delay_ms)
    }

    pub fn lookup_stagger(&self) -> Duration {
        Duration::from_millis(self.lookup_stagger_ms)
    }
}

/// Geometry of the pulldown list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Number of materialized slots
    pub window_size: usize,
    /// Rows moved by page up / page down
    pub page_size: usize,
    /// Columns reserved for the scrollbar when matches overflow the window
    pub scrollbar_width: usize,
    /// Row height measurement attempts per repaint
    pub measure_attempts: u32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            window_size: 10,
            page_size: 10,
            scrollbar_width: 1,
            measure_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSettings {
    /// Longest query string sent to the search service, in characters
    pub max_string_length: usize,
}

impl Default for RequestSettings {
    fn default() -> Self {
        RequestSettings {
            max_string_length: 50,
        }
    }
}

/// Remote search service endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub base_url: String,
    /// Path prefix; the record type is appended
    pub endpoint_path: String,
    /// The service echoes the query's first letter as its first row
    pub leading_echo_row: bool,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            base_url: "http://localhost:3000".to_string(),
            endpoint_path: "/autocompleters/new/".to_string(),
            leading_echo_row: true,
            timeout_ms: 10_000,
            user_agent: concat!("typeahead/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ServiceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let settings = EngineSettings::default();
        assert_eq!(settings.timing.refresh_delay(), Duration::from_millis(330));
        assert_eq!(settings.timing.binding_notify_delay(), Duration::from_millis(750));
        assert_eq!(settings.display.window_size, 10);
        assert_eq!(settings.request.max_string_length, 50);
        assert_eq!(settings.types.len(), RecordType::iter().count());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn type_options_fall_back_to_builtin_table() {
        let mut settings = EngineSettings::default();
        settings.types.clear();
        assert_eq!(settings.type_options(RecordType::Name).collapse, 1);
    }

    #[test]
    fn validation_rejects_zero_window_and_unknown_types() {
        let mut settings = EngineSettings::default();
        settings.display.window_size = 0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "display.window_size"
        ));

        let mut settings = EngineSettings::default();
        settings.types.insert("bogus".to_string(), TypeOptions::default());
        assert!(matches!(settings.validate(), Err(ConfigError::Domain(_))));
    }
}
