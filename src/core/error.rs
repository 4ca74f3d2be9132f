use std::path::PathBuf;

use thiserror::Error;

/// Failures of the durable key/value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration could not be read or is unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Lifecycle failures reported by the game host. None of them leave the
/// host in a half-initialized state.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("game '{0}' not found in registry")]
    UnknownGame(String),
    #[error("no game selected")]
    NothingSelected,
    #[error("game '{id}' failed to start: {reason}")]
    InitFailed { id: String, reason: String },
}

/// The built-in game table is inconsistent.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate game id '{0}'")]
    DuplicateId(String),
}
