use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fortmap operations
#[derive(Error, Debug)]
pub enum FortmapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input path not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Cannot read {}: {reason}", path.display())]
    UnreadableFile { path: PathBuf, reason: String },

    #[error("Malformed matrix: {0}")]
    MatrixFormat(String),

    #[error("Pattern error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("File system error: {0}")]
    FileSystem(String),
}

pub type Result<T> = std::result::Result<T, FortmapError>;
