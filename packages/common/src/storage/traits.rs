use std::io::Cursor;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Named file storage with overwrite semantics.
///
/// Files are addressed by a flat name on write. The returned location is what
/// callers persist and later pass back to the read-side methods.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store bytes under `name`, replacing any previous file, and return its location.
    async fn put(&self, name: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(name, reader).await
    }

    /// Store data from an async reader under `name`, replacing any previous file.
    async fn put_stream(&self, name: &str, reader: BoxReader) -> Result<PathBuf, StorageError>;

    /// Retrieve all bytes stored at a location.
    async fn get(&self, location: &Path) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(location).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Retrieve a stored file as a streaming async reader.
    async fn get_stream(&self, location: &Path) -> Result<BoxReader, StorageError>;

    /// Check whether a file exists at a location.
    async fn exists(&self, location: &Path) -> Result<bool, StorageError>;

    /// Delete the file at a location.
    ///
    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn delete(&self, location: &Path) -> Result<bool, StorageError>;

    /// Get the on-disk size of a stored file in bytes.
    async fn size(&self, location: &Path) -> Result<u64, StorageError>;
}
