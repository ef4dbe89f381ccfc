// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! JSON layer merging

use serde_json::{Map, Value as J};

/// Merge `layer` onto `base`: objects merge recursively, anything else
/// replaces, and a null in the layer leaves the base untouched.
pub fn merge_layer(base: &mut J, layer: J) {
    match (base, layer) {
        (J::Object(a), J::Object(b)) => {
            for (k, v) in b {
                merge_layer(a.entry(k).or_insert(J::Null), v);
            }
        }
        (_, J::Null) => {}
        (a, b) => *a = b,
    }
}

/// Set `value` at a dotted key such as `display.window_size`
pub fn insert_dotted(root: &mut J, dotted: &str, value: J) {
    let mut cur = root;
    let mut parts = dotted.split('.').peekable();
    while let Some(part) = parts.next() {
        if !cur.is_object() {
            *cur = J::Object(Map::new());
        }
        let J::Object(map) = cur else { return };
        if parts.peek().is_none() {
            map.insert(part.to_string(), value);
            return;
        }
        cur = map.entry(part.to_string()).or_insert_with(|| J::Object(Map::new()));
    }
}

/// Interpret a flag value: numbers and booleans keep their type,
/// everything else is a string
pub fn scalar_from_flag(raw: &str) -> J {
    match serde_json::from_str::<J>(raw) {
        Ok(v @ (J::Bool(_) | J::Number(_))) => v,
        _ => J::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_merge_and_scalars_replace() {
        let mut base = json!({"timing": {"refresh_delay_ms": 330, "hide_delay_ms": 500}});
        merge_layer(&mut base, json!({"timing": {"refresh_delay_ms": 100}, "x": null}));
        assert_eq!(base["timing"]["refresh_delay_ms"], 100);
        assert_eq!(base["timing"]["hide_delay_ms"], 500);
        assert_eq!(base.get("x"), Some(&J::Null));
    }

    #[test]
    fn dotted_insert_builds_intermediate_objects() {
        let mut root = json!({});
        insert_dotted(&mut root, "types.name.collapse", json!(2));
        insert_dotted(&mut root, "types.name.unordered", json!(true));
        assert_eq!(root, json!({"types": {"name": {"collapse": 2, "unordered": true}}}));
    }

    #[test]
    fn flag_values_keep_scalar_types() {
        assert_eq!(scalar_from_flag("12"), json!(12));
        assert_eq!(scalar_from_flag("false"), json!(false));
        assert_eq!(scalar_from_flag("http://x"), json!("http://x"));
        assert_eq!(scalar_from_flag("[1]"), json!("[1]"));
    }
}
