//! Error types for Synheart MindScore

use thiserror::Error;

/// Errors that can occur while loading models or assessing requests
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Model file not found: {0}")]
    ModelNotFound(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown adjustment category: {0}")]
    UnknownCategory(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
