use thiserror::Error;

/// Top-level error type for chain-dynamics.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Transform source error: {0}")]
    Source(#[from] SourceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Failures of the host's transform source.
///
/// The solver never recovers from these; they are handed back to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error("No transforms for joint {joint}")]
    MissingJoint { joint: usize },

    #[error("Transforms for joint {joint} unavailable at time {time}: {reason}")]
    Unavailable {
        joint: usize,
        time: f64,
        reason: String,
    },
}

/// Errors loading a chain setup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Joint index {0} is listed more than once")]
    DuplicateJoint(usize),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
