//! Schema validation for researcher JSON5 configuration.
//!
//! Layers are partial documents, so every key is optional here; this only
//! rejects unknown keys and values of the wrong JSON type, reporting the full
//! dotted path of the offending field.

use crate::ConfigError;
use crate::LlmBackend;
use serde_json::{Map, Value};

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(
        map,
        &["$schema", "llm", "sources", "store", "server", "history"],
        layer,
        "",
    )?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("llm") {
        validate_llm(value, layer, "llm")?;
    }
    if let Some(value) = map.get("sources") {
        validate_sources(value, layer, "sources")?;
    }
    if let Some(value) = map.get("store") {
        let store = expect_object(value, layer, "store")?;
        ensure_allowed_keys(store, &["path"], layer, "store")?;
        if let Some(value) = store.get("path") {
            expect_string(value, layer, "store.path")?;
        }
    }
    if let Some(value) = map.get("server") {
        validate_server(value, layer, "server")?;
    }
    if let Some(value) = map.get("history") {
        let history = expect_object(value, layer, "history")?;
        let keys = [
            "default_limit",
            "max_limit",
            "max_query_chars",
            "max_search_chars",
        ];
        ensure_allowed_keys(history, &keys, layer, "history")?;
        for key in keys {
            if let Some(value) = history.get(key) {
                expect_u64(value, layer, &join_path("history", key))?;
            }
        }
    }
    Ok(())
}

/// Validate the "llm" block.
fn validate_llm(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &[
            "provider",
            "model",
            "api_key_env",
            "temperature",
            "max_tokens",
            "timeout_secs",
        ],
        layer,
        path,
    )?;

    if let Some(value) = map.get("provider") {
        let provider_path = join_path(path, "provider");
        let Some(provider) = value.as_str() else {
            return Err(invalid_field(layer, &provider_path, "expected string"));
        };
        if !LlmBackend::NAMES.contains(&provider) {
            return Err(invalid_field(
                layer,
                &provider_path,
                &format!("expected one of {}", LlmBackend::NAMES.join(", ")),
            ));
        }
    }
    for key in ["model", "api_key_env"] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("temperature") {
        expect_f64(value, layer, &join_path(path, "temperature"))?;
    }
    for key in ["max_tokens", "timeout_secs"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

/// Validate the "sources" block and its three children.
fn validate_sources(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["news", "market", "stock"], layer, path)?;

    let children: [(&str, &[&str], &[&str]); 3] = [
        (
            "news",
            &["api_key_env", "endpoint", "language"],
            &["page_size", "timeout_secs"],
        ),
        (
            "market",
            &["api_key_env", "endpoint", "host", "country"],
            &["timeout_secs"],
        ),
        (
            "stock",
            &["endpoint", "summary_endpoint", "default_symbol"],
            &["timeout_secs"],
        ),
    ];

    for (name, strings, integers) in children {
        let Some(value) = map.get(name) else {
            continue;
        };
        let child_path = join_path(path, name);
        let child = expect_object(value, layer, &child_path)?;
        let allowed: Vec<&str> = strings.iter().chain(integers.iter()).copied().collect();
        ensure_allowed_keys(child, &allowed, layer, &child_path)?;
        for key in strings {
            if let Some(value) = child.get(*key) {
                expect_string(value, layer, &join_path(&child_path, key))?;
            }
        }
        for key in integers {
            if let Some(value) = child.get(*key) {
                expect_u64(value, layer, &join_path(&child_path, key))?;
            }
        }
    }
    Ok(())
}

/// Validate the "server" block.
fn validate_server(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["host", "port"], layer, path)?;
    if let Some(value) = map.get("host") {
        expect_string(value, layer, &join_path(path, "host"))?;
    }
    if let Some(value) = map.get("port") {
        let port_path = join_path(path, "port");
        match value.as_u64() {
            Some(port) if port <= u64::from(u16::MAX) => {}
            Some(_) => return Err(invalid_field(layer, &port_path, "port out of range")),
            None => return Err(invalid_field(layer, &port_path, "expected integer")),
        }
    }
    Ok(())
}

fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    match value {
        Value::String(_) => Ok(()),
        _ => Err(invalid_field(layer, path, "expected string")),
    }
}

fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

fn expect_f64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_number() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected number"))
    }
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    match map.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(invalid_field(layer, &join_path(path, key), "unknown key")),
        None => Ok(()),
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{path}"),
        message: message.to_string(),
    }
}
