use thiserror::Error;

#[derive(Error, Debug)]
pub enum XdpStatError {
    #[error("Failed to load classifier object {path}: {reason}")]
    ProgramLoadFailed { path: String, reason: String },

    #[error("Network interface not found: {0}")]
    InterfaceNotFound(String),

    #[error("Failed to attach classifier to {iface}: {reason}")]
    AttachFailed { iface: String, reason: String },

    #[error("Counter table `{name}` unavailable: {reason}")]
    MapLookupFailed { name: String, reason: String },

    #[error("Failed to read counter {counter}: {reason}")]
    CounterReadFailed { counter: String, reason: String },

    #[error("Failed to detach classifier: {0}")]
    DetachFailed(String),

    #[error("Metrics error: {0}")]
    MetricsError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unsupported feature on this system: {0}")]
    UnsupportedFeature(String),
}

pub type Result<T> = std::result::Result<T, XdpStatError>;
