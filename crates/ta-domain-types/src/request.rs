// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Search requests sent to the remote search service

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Parameters of one remote search
///
/// `string` is the query token; everything else is compared as a unit
/// when deciding whether a select-style refresh changed anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub string: String,
    /// Type-specific parameters supplied by the host (e.g. `lat`, `lng`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
    /// Return every candidate regardless of the string
    #[serde(default)]
    pub all: bool,
    /// Match whole words only
    #[serde(default)]
    pub whole: bool,
    /// Return only an exact match
    #[serde(default)]
    pub exact: bool,
}

impl SearchRequest {
    pub fn new(string: impl Into<String>) -> Self {
        Self {
            string: string.into(),
            ..Default::default()
        }
    }

    pub fn with_params(mut self, params: &BTreeMap<String, String>) -> Self {
        self.params.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Everything except the query string, flattened the way it goes on the wire
    pub fn non_string_params(&self) -> BTreeMap<String, String> {
        let mut out = self.params.clone();
        if self.all {
            out.insert("all".to_string(), "true".to_string());
        }
        if self.whole {
            out.insert("whole".to_string(), "true".to_string());
        }
        if self.exact {
            out.insert("exact".to_string(), "true".to_string());
        }
        out
    }

    /// Query pairs in wire order: `string` first, then the sorted rest
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("string".to_string(), self.string.clone())];
        pairs.extend(self.non_string_params());
        pairs
    }
}

/// Point carried between record types when the field falls back to geocoding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Extract a point from request parameters, if both halves parse
    pub fn from_params(params: &BTreeMap<String, String>) -> Option<Self> {
        let lat = params.get("lat")?.trim().parse().ok()?;
        let lng = params.get("lng")?.trim().parse().ok()?;
        Some(Self { lat, lng })
    }

    pub fn to_params(self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("lat".to_string(), self.lat.to_string()),
            ("lng".to_string(), self.lng.to_string()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_join_params_but_not_string() {
        let mut request = SearchRequest::new("agar")
            .with_params(&BTreeMap::from([("lat".to_string(), "1.5".to_string())]));
        request.all = true;

        let params = request.non_string_params();
        assert_eq!(params.get("lat").map(String::as_str), Some("1.5"));
        assert_eq!(params.get("all").map(String::as_str), Some("true"));
        assert!(!params.contains_key("string"));
        assert!(!params.contains_key("whole"));

        let pairs = request.query_pairs();
        assert_eq!(pairs[0], ("string".to_string(), "agar".to_string()));
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn lat_lng_requires_both_halves() {
        let mut params = BTreeMap::from([("lat".to_string(), "45.5".to_string())]);
        assert_eq!(LatLng::from_params(&params), None);

        params.insert("lng".to_string(), "-122.6".to_string());
        assert_eq!(
            LatLng::from_params(&params),
            Some(LatLng {
                lat: 45.5,
                lng: -122.6
            })
        );
    }
}
