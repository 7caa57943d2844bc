use thiserror::Error;

/// Errors that can occur during file storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Nothing is stored at the requested location.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The name cannot be used as a flat file name inside the store.
    #[error("invalid file name: {0}")]
    InvalidName(String),

    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
}
