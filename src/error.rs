//! Error types for Rajmarg

use thiserror::Error;

/// Rajmarg error type
#[derive(Error, Debug)]
pub enum RajmargError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Map load failed: {0}")]
    MapLoad(String),

    #[error("Malformed telemetry frame: {0}")]
    MalformedFrame(String),

    #[error("Degenerate JMT horizon: {0}")]
    DegenerateJmt(f64),
}

impl From<toml::de::Error> for RajmargError {
    fn from(e: toml::de::Error) -> Self {
        RajmargError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for RajmargError {
    fn from(e: serde_json::Error) -> Self {
        RajmargError::MalformedFrame(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RajmargError>;
