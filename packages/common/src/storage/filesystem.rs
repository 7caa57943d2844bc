use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use super::error::StorageError;
use super::traits::{BoxReader, FileStore};
use crate::filename::validate_flat_filename;

/// Filesystem-backed file store.
///
/// Files live directly under `base_path` by name. Writes land in
/// `{base_path}/.tmp` first and are renamed into place, so a reader never
/// observes a partially written file.
pub struct FilesystemFileStore {
    base_path: PathBuf,
}

impl FilesystemFileStore {
    /// Create a new filesystem file store, creating the directories if needed.
    pub async fn new(base_path: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Compute the filesystem path for a stored name.
    fn file_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

/// Stored names must already be flat: the shared filename rules apply, and
/// no surrounding whitespace is trimmed away here.
fn validate_name(name: &str) -> Result<(), StorageError> {
    match validate_flat_filename(name) {
        Ok(flat) if flat == name => Ok(()),
        _ => Err(StorageError::InvalidName(name.to_string())),
    }
}

fn not_found_or_io(err: std::io::Error, location: &Path) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        StorageError::NotFound(location.display().to_string())
    } else {
        err.into()
    }
}

#[async_trait]
impl FileStore for FilesystemFileStore {
    async fn put_stream(&self, name: &str, mut reader: BoxReader) -> Result<PathBuf, StorageError> {
        validate_name(name)?;

        let target = self.file_path(name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::create_dir_all(self.base_path.join(".tmp")).await?;

        let temp_path = self.temp_path();
        let mut temp_file = fs::File::create(&temp_path).await?;
        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer
        let mut total_bytes: u64 = 0;

        let copied: Result<(), std::io::Error> = async {
            loop {
                let n = reader.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                total_bytes += n as u64;
                temp_file.write_all(&buf[..n]).await?;
            }
            temp_file.flush().await
        }
        .await;
        drop(temp_file);

        if let Err(e) = copied {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        // Full overwrite: the previous file is removed before the new one takes its place.
        match fs::remove_file(&target).await {
            Ok(()) => debug!(path = %target.display(), "Removed previous file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                let _ = fs::remove_file(&temp_path).await;
                return Err(e.into());
            }
        }

        if let Err(e) = fs::rename(&temp_path, &target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(path = %target.display(), bytes = total_bytes, "Stored file");
        Ok(target)
    }

    async fn get_stream(&self, location: &Path) -> Result<BoxReader, StorageError> {
        match fs::File::open(location).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) => Err(not_found_or_io(e, location)),
        }
    }

    async fn exists(&self, location: &Path) -> Result<bool, StorageError> {
        Ok(fs::try_exists(location).await?)
    }

    async fn delete(&self, location: &Path) -> Result<bool, StorageError> {
        match fs::remove_file(location).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, location: &Path) -> Result<u64, StorageError> {
        match fs::metadata(location).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) => Err(not_found_or_io(e, location)),
        }
    }
}
