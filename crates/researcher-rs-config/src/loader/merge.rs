//! Deep merge for layered JSON values.

use serde_json::Value;

/// Merge `overlay` into `base`: objects merge key by key, anything else is replaced.
pub(super) fn merge_json_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_json_values(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::merge_json_values;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn nested_objects_merge_and_scalars_override() {
        let mut base = json!({ "llm": { "model": "a", "timeout_secs": 5 }, "server": { "port": 1 } });
        merge_json_values(&mut base, &json!({ "llm": { "model": "b" }, "server": 2 }));
        assert_eq!(
            base,
            json!({ "llm": { "model": "b", "timeout_secs": 5 }, "server": 2 })
        );
    }
}
