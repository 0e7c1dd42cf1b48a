use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FoldsortError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Filesystem errors
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    // Conflict resolution
    #[error("Too many conflicts for {0}")]
    ConflictExhausted(PathBuf),
}

/// Result type for foldsort operations.
pub type Result<T> = std::result::Result<T, FoldsortError>;
