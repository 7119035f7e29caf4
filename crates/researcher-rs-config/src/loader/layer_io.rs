//! IO helpers for reading config layers from disk.

#[cfg(any(unix, windows))]
use super::SYSTEM_CONFIG_PATH;
use super::{ConfigLayerSource, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE, schema};
use crate::ConfigError;
use directories::UserDirs;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Read, parse and schema-check a single layer.
pub(super) fn load_layer(source: ConfigLayerSource, path: &Path) -> Result<Value, ConfigError> {
    debug!(
        "loading config layer (source={:?}, path={})",
        source,
        path.display()
    );
    let contents = fs::read_to_string(path).map_err(|err| ConfigError::read(path, err))?;
    let value: Value = json5::from_str(&contents)
        .map_err(|err| ConfigError::syntax(path.display().to_string(), err))?;
    schema::validate_layer_schema(&value, &layer_label(source, path))?;
    Ok(value)
}

/// Label used to prefix schema errors, e.g. `user(/home/me/.researcher/researcher.json5)`.
pub(super) fn layer_label(source: ConfigLayerSource, path: &Path) -> String {
    let name = match source {
        ConfigLayerSource::System => "system",
        ConfigLayerSource::User => "user",
        ConfigLayerSource::Project => "project",
        ConfigLayerSource::Cwd => "cwd",
        ConfigLayerSource::Repo => "repo",
        ConfigLayerSource::Runtime => "runtime",
    };
    format!("{name}({})", path.display())
}

#[cfg(any(unix, windows))]
pub(super) fn default_system_config_path() -> Option<PathBuf> {
    Some(PathBuf::from(SYSTEM_CONFIG_PATH))
}

#[cfg(not(any(unix, windows)))]
pub(super) fn default_system_config_path() -> Option<PathBuf> {
    None
}

pub(super) fn default_user_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE)
    })
}
