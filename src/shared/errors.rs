//! Error handling for the analysis pipeline

use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Analysis errors
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Schema violation at line {line}: {message}")]
    SchemaViolation { line: usize, message: String },

    #[error("Invalid columnar data: {0}")]
    InvalidColumn(String),

    #[error("Unknown fee tier: {0}")]
    UnknownFeeTier(String),

    #[error("Invalid bin edges: {0}")]
    InvalidBins(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),
}

impl From<toml::de::Error> for AnalysisError {
    fn from(err: toml::de::Error) -> Self {
        AnalysisError::ConfigError(err.to_string())
    }
}
