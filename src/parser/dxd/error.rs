use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DxdError {
    #[error("File not found: {0:?}")]
    NotFound(PathBuf),

    #[error("Format error: {0}")]
    FormatError(String),

    #[error("Channel '{name}' not found. Available channels: {}", available.join(", "))]
    UnknownChannel { name: String, available: Vec<String> },

    #[error("Decode failure: {0}")]
    DecodeFailure(String),

    #[error("Session already closed")]
    SessionClosed,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, DxdError>;
