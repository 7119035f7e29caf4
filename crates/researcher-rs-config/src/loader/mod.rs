//! Layered configuration loader.
//!
//! Discovers configuration layers (system/user/project/cwd/repo), validates
//! each against the schema, deep-merges them in precedence order and produces
//! a final `ResearcherConfig`.

mod layer_io;
mod merge;
mod schema;
mod utils;


use crate::{ConfigError, LlmBackend, ResearcherConfig};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename in local layers.
const DEFAULT_CONFIG_FILE: &str = "researcher.json5";
/// Default config directory under user or repo roots.
const DEFAULT_CONFIG_DIR: &str = ".researcher";
/// Marker files/dirs that identify a project root.
const DEFAULT_PROJECT_ROOT_MARKERS: &[&str] = &[".git"];

#[cfg(unix)]
const SYSTEM_CONFIG_PATH: &str = "/etc/researcher/researcher.json5";
#[cfg(windows)]
const SYSTEM_CONFIG_PATH: &str = "C:\\ProgramData\\researcher\\researcher.json5";

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub config: ResearcherConfig,
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    System,
    User,
    /// Nearest ancestor directory carrying a project marker.
    Project,
    Cwd,
    /// `.researcher/` under the project root.
    Repo,
    /// Explicit paths supplied at runtime (highest precedence).
    Runtime,
}

/// Metadata about a loaded config layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    pub path: PathBuf,
}

/// Options controlling layered config discovery and overrides.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory used to resolve local layers.
    pub cwd: PathBuf,
    /// Optional system config path (defaults to `/etc/researcher/researcher.json5` on Unix).
    pub system_config_path: Option<PathBuf>,
    /// Optional user config path (defaults to `~/.researcher/researcher.json5`).
    pub user_config_path: Option<PathBuf>,
    /// Runtime override config paths applied last.
    pub runtime_paths: Vec<PathBuf>,
    /// Marker files/dirs used to detect the project root.
    pub project_root_markers: Vec<String>,
}

impl LayeredConfigOptions {
    /// Create options with default layer locations for the provided cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            system_config_path: layer_io::default_system_config_path(),
            user_config_path: layer_io::default_user_config_path(),
            runtime_paths: Vec::new(),
            project_root_markers: DEFAULT_PROJECT_ROOT_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
        }
    }

    /// Options that only consider explicit runtime paths.
    pub fn isolated(cwd: impl AsRef<Path>) -> Self {
        Self {
            system_config_path: None,
            user_config_path: None,
            project_root_markers: Vec::new(),
            ..Self::new(cwd)
        }
    }

    /// Add a runtime override config path that is applied last.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl ResearcherConfig {
    /// Load a single config from a path (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading config from path (path={})", path.display());
        let contents = fs::read_to_string(path).map_err(|err| ConfigError::read(path, err))?;
        let value: Value = json5::from_str(&contents)
            .map_err(|err| ConfigError::syntax(path.display().to_string(), err))?;
        config_from_value(value, &path.display().to_string())
    }

    /// Load a single config from JSON5 contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value =
            json5::from_str(contents).map_err(|err| ConfigError::syntax("<inline>", err))?;
        config_from_value(value, "config")
    }

    /// Load a layered config stack using the default layer locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load a layered config stack using explicit layer locations and overrides.
    ///
    /// Layer precedence (low -> high): system, user, project, cwd, repo,
    /// runtime overrides.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let cwd = utils::normalize_path(&options.cwd)?;
        let mut candidates: Vec<(ConfigLayerSource, PathBuf)> = Vec::new();

        if let Some(path) = options.system_config_path {
            candidates.push((ConfigLayerSource::System, path));
        }
        if let Some(path) = options.user_config_path {
            candidates.push((ConfigLayerSource::User, path));
        }

        let project_root = utils::find_project_root(&cwd, &options.project_root_markers);
        match project_root.as_ref() {
            Some(root) => debug!("resolved project root (path={})", root.display()),
            None => debug!("project root not found; skipping project/repo layers"),
        }
        if let Some(root) = project_root.as_ref() {
            candidates.push((ConfigLayerSource::Project, root.join(DEFAULT_CONFIG_FILE)));
        }
        candidates.push((ConfigLayerSource::Cwd, cwd.join(DEFAULT_CONFIG_FILE)));
        if let Some(root) = project_root.as_ref() {
            candidates.push((
                ConfigLayerSource::Repo,
                root.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILE),
            ));
        }

        let mut layers = Vec::new();
        let mut merged = Value::Object(serde_json::Map::new());
        let mut seen_paths = HashSet::new();

        for (source, path) in candidates {
            if !path.exists() {
                debug!(
                    "skipping missing layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            if !seen_paths.insert(utils::unique_path(&path)) {
                debug!(
                    "skipping duplicate layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            let value = layer_io::load_layer(source, &path)?;
            merge::merge_json_values(&mut merged, &value);
            layers.push(ConfigLayer { source, path });
        }

        for path in options.runtime_paths {
            let value = layer_io::load_layer(ConfigLayerSource::Runtime, &path)?;
            merge::merge_json_values(&mut merged, &value);
            layers.push(ConfigLayer {
                source: ConfigLayerSource::Runtime,
                path,
            });
        }

        let config = config_from_value(merged, "effective")?;
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::invalid("llm.model", "must not be empty"));
        }
        if self.llm.api_key_env.trim().is_empty() {
            return Err(ConfigError::invalid("llm.api_key_env", "must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::invalid(
                "llm.temperature",
                "must be between 0.0 and 2.0",
            ));
        }
        for (path, secs) in [
            ("llm.timeout_secs", self.llm.timeout_secs),
            ("sources.news.timeout_secs", self.sources.news.timeout_secs),
            ("sources.market.timeout_secs", self.sources.market.timeout_secs),
            ("sources.stock.timeout_secs", self.sources.stock.timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::invalid(path, "must be greater than zero"));
            }
        }
        if !(1..=100).contains(&self.sources.news.page_size) {
            return Err(ConfigError::invalid(
                "sources.news.page_size",
                "must be between 1 and 100",
            ));
        }
        if self.sources.stock.default_symbol.trim().is_empty() {
            return Err(ConfigError::invalid(
                "sources.stock.default_symbol",
                "must not be empty",
            ));
        }

        let history = &self.history;
        if !(1..=researcher_rs_protocol::MAX_HISTORY_LIMIT).contains(&history.max_limit) {
            return Err(ConfigError::invalid(
                "history.max_limit",
                format!(
                    "must be between 1 and {}",
                    researcher_rs_protocol::MAX_HISTORY_LIMIT
                ),
            ));
        }
        if !(1..=history.max_limit).contains(&history.default_limit) {
            return Err(ConfigError::invalid(
                "history.default_limit",
                "must be between 1 and history.max_limit",
            ));
        }
        if history.max_query_chars == 0 {
            return Err(ConfigError::invalid(
                "history.max_query_chars",
                "must be greater than zero",
            ));
        }

        debug!(
            "config validated (provider={}, model={})",
            match self.llm.provider {
                LlmBackend::Groq => "groq",
                LlmBackend::OpenAI => "openai",
            },
            self.llm.model
        );
        Ok(())
    }
}

fn config_from_value(value: Value, label: &str) -> Result<ResearcherConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: ResearcherConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}
