use thiserror::Error;

pub type PulseResult<T> = Result<T, PulseError>;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid credentials for user '{0}'")]
    InvalidCredentials(String),

    #[error("Session is not authenticated")]
    Unauthenticated,

    #[error("Unknown dataset kind: {0}")]
    UnknownDataset(String),

    #[error("Dataset '{kind}' has no numeric field '{field}'")]
    UnknownField { kind: String, field: String },

    #[error("Unknown {category}: {value}")]
    UnknownOption { category: &'static str, value: String },

    #[error("Query error: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for PulseError {
    fn from(err: config::ConfigError) -> Self {
        PulseError::Config(err.to_string())
    }
}
