use shade_element::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

pub type DefinitionResult<T> = Result<T, DefinitionError>;

#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("Components directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid definition in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid definition in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error("Failed to serialize HTML data: {0}")]
    Serialize(#[from] serde_json::Error),
}
