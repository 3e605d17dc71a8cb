use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid entity type: {0}")]
    InvalidEntityType(String),

    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Caller-level rejections. These never reach the reconciliation stages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("No text provided")]
    Empty,

    #[error("Text too long: {len} characters (max: {max})")]
    TooLong { len: usize, max: usize },

    #[error("Batch too large: {len} items (max: {max})")]
    BatchTooLarge { len: usize, max: usize },

    #[error("Unreadable input: {0}")]
    Unreadable(String),
}
