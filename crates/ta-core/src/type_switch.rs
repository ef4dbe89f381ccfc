// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Runtime record type swaps

use std::collections::BTreeMap;

use serde::Serialize;
use ta_config::EngineSettings;
use ta_domain_types::{LatLng, RecordType};

use crate::config::FieldConfig;

/// How the field behaves after a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Free text refined against fetched candidates
    Regular,
    /// Candidates come from the parameters, not the text
    Constrained,
    /// Proposing places that are not records yet
    Create,
}

impl SelectionMode {
    pub fn for_config(config: &FieldConfig) -> Self {
        if config.record_type.is_geocode_fallback() {
            SelectionMode::Create
        } else if config.options.act_like_select {
            SelectionMode::Constrained
        } else {
            SelectionMode::Regular
        }
    }
}

/// A swap that changes the record type
#[derive(Debug, Clone, PartialEq)]
pub struct SwapPlan {
    pub config: FieldConfig,
    pub mode: SelectionMode,
    pub clear_binding: bool,
}

/// Plan a swap to `record_type`; `None` when the type is unchanged
pub fn plan_swap(
    current: &FieldConfig,
    settings: &EngineSettings,
    record_type: RecordType,
    request_params: Option<BTreeMap<String, String>>,
    keep_binding: bool,
) -> Option<SwapPlan> {
    if record_type == current.record_type {
        return None;
    }
    let config = current.swapped(settings, record_type, request_params);
    Some(SwapPlan {
        mode: SelectionMode::for_config(&config),
        config,
        clear_binding: !keep_binding,
    })
}

/// Parameters carried to the geocode type when a constrained fetch finds
/// nothing: the point it was constrained to, if any
pub fn geocode_fallback_params(
    last_params: Option<&BTreeMap<String, String>>,
) -> BTreeMap<String, String> {
    last_params
        .and_then(LatLng::from_params)
        .map(LatLng::to_params)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_type_is_a_no_op() {
        let settings = EngineSettings::default();
        let config = FieldConfig::new(&settings, RecordType::Location);
        assert!(plan_swap(&config, &settings, RecordType::Location, None, false).is_none());
    }

    #[test]
    fn modes_follow_the_new_type() {
        let settings = EngineSettings::default();
        let config = FieldConfig::new(&settings, RecordType::Location);

        let plan = plan_swap(&config, &settings, RecordType::LocationGoogle, None, false).unwrap();
        assert_eq!(plan.mode, SelectionMode::Create);
        assert!(plan.clear_binding);

        let plan =
            plan_swap(&config, &settings, RecordType::LocationContaining, None, true).unwrap();
        assert_eq!(plan.mode, SelectionMode::Constrained);
        assert!(!plan.clear_binding);

        let plan = plan_swap(&config, &settings, RecordType::Region, None, false).unwrap();
        assert_eq!(plan.mode, SelectionMode::Regular);
    }

    #[test]
    fn fallback_keeps_only_the_point() {
        let last = BTreeMap::from([
            ("lat".to_string(), "45.5".to_string()),
            ("lng".to_string(), "-122.6".to_string()),
            ("all".to_string(), "true".to_string()),
        ]);
        let params = geocode_fallback_params(Some(&last));
        assert_eq!(params.len(), 2);
        assert!(params.contains_key("lat"));
        assert!(geocode_fallback_params(None).is_empty());
    }
}
