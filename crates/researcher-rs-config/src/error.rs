//! Config loading and validation errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// JSON5 syntax error; `origin` is a file path or `<inline>`.
    #[error("cannot parse {origin} as JSON5: {source}")]
    Syntax {
        origin: String,
        #[source]
        source: json5::Error,
    },
    /// The merged document does not fit the config model.
    #[error("config does not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// A required secret is not present in the environment.
    #[error("environment variable {0} is not set")]
    MissingEnv(String),
}

impl ConfigError {
    pub(crate) fn invalid(path: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidField {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn read(path: &std::path::Path, source: std::io::Error) -> Self {
        ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn syntax(origin: impl Into<String>, source: json5::Error) -> Self {
        ConfigError::Syntax {
            origin: origin.into(),
            source,
        }
    }
}
