use shade_dom::{DomError, NodeId};
use thiserror::Error;

pub type ElementResult<T> = Result<T, ElementError>;

/// Result returned by author-supplied callbacks. Errors are logged by the
/// runtime and never reach the caller of the mutation that triggered them.
pub type CallbackResult = anyhow::Result<()>;

/// Problems with a component type, surfaced while it is built or registered.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("'{name}' is not a valid custom element name")]
    InvalidTagName { name: String },

    #[error("'{name}' has already been defined")]
    AlreadyDefined { name: String },

    #[error("Attribute '{name}' is declared more than once")]
    DuplicateAttribute { name: String },

    #[error("Part key '{key}' is declared more than once")]
    DuplicatePart { key: String },

    #[error("<{tag}> installs a part handler for undeclared key '{key}'")]
    UnknownPartKey { tag: String, key: String },

    #[error("Malformed element definition: {0}")]
    MalformedSchema(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ElementError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Node {0:?} is not a custom element instance")]
    NotAnInstance(NodeId),

    #[error("<{0}> has no shadow capability")]
    NoShadowCapability(String),
}

/// Failure to obtain a component module or deferred component data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Error loading {path}: {message}")]
    Module { path: String, message: String },

    #[error("Component data failed to resolve: {0}")]
    Data(String),

    #[error("No module loader is installed")]
    NoLoader,

    #[error("<{tag}> resolved a part handler for undeclared key '{key}'")]
    UnknownPartKey { tag: String, key: String },
}
