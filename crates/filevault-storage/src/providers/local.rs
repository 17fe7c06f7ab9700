//! Local filesystem storage provider.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::debug;
use uuid::Uuid;

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_core::traits::storage::{ByteStream, StorageProvider};

/// Local filesystem storage provider.
///
/// Writes go to a uniquely named sibling temp file and are renamed into
/// place only once complete, so readers never see a partial object.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Root directory for all stored objects.
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path.
    pub async fn new(root: impl AsRef<Path>) -> AppResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageUnavailable,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a relative path to an absolute path within the root.
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let clean = Path::new(path.trim_start_matches('/'));
        if clean
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::invalid_argument(format!(
                "Storage path escapes the root: {path}"
            )));
        }
        Ok(self.root.join(clean))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageUnavailable,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

/// Removes an unfinished temp file when dropped, including when the
/// writing future is cancelled mid-stream.
struct PartialFile {
    path: PathBuf,
    armed: bool,
}

impl PartialFile {
    fn new(final_path: &Path) -> Self {
        let temp_name = format!(".tmp.{}", Uuid::new_v4());
        let path = final_path.with_file_name(
            final_path
                .file_name()
                .map(|n| format!("{}{}", n.to_string_lossy(), temp_name))
                .unwrap_or(temp_name),
        );
        Self { path, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.armed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

fn read_error(path: &str, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("Object not found: {path}"))
    } else {
        AppError::with_source(
            ErrorKind::StorageUnavailable,
            format!("Failed to read object: {path}"),
            e,
        )
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        let full_path = self.resolve(path)?;
        let file = fs::File::open(&full_path)
            .await
            .map_err(|e| read_error(path, e))?;

        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream))
    }

    async fn write_stream(&self, path: &str, mut stream: ByteStream) -> AppResult<u64> {
        let full_path = self.resolve(path)?;
        self.ensure_parent(&full_path).await?;

        let mut partial = PartialFile::new(&full_path);
        let mut file = fs::File::create(&partial.path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageUnavailable,
                format!("Failed to create object: {path}"),
                e,
            )
        })?;

        let mut total_bytes = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::with_source(ErrorKind::StorageUnavailable, "Upload stream failed", e)
            })?;
            total_bytes += chunk.len() as u64;
            file.write_all(&chunk).await.map_err(|e| {
                AppError::with_source(ErrorKind::StorageUnavailable, "Failed to write chunk", e)
            })?;
        }

        file.sync_all().await.map_err(|e| {
            AppError::with_source(ErrorKind::StorageUnavailable, "Failed to flush object", e)
        })?;
        drop(file);

        fs::rename(&partial.path, &full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageUnavailable,
                format!("Failed to publish object: {path}"),
                e,
            )
        })?;
        partial.disarm();

        debug!(path, bytes = total_bytes, "Wrote object from stream");
        Ok(total_bytes)
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::StorageUnavailable,
                format!("Failed to delete object: {path}"),
                e,
            )),
        }
    }
}
