//! Storage error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("Invalid image name: {0}")]
    InvalidName(String),

    #[error("Empty upload")]
    Empty,
}
