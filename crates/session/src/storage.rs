//! Durable credential storage collaborators.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StorageError;

/// Where the raw credential survives between runs ("page reloads").
///
/// Holds at most one value. Implementations must make `clear` idempotent.
#[async_trait]
pub trait CredentialStorage: Send + Sync {
    async fn get(&self) -> Result<Option<String>, StorageError>;

    async fn set(&self, raw: &str) -> Result<(), StorageError>;

    async fn clear(&self) -> Result<(), StorageError>;
}

/// Process-lifetime storage; the equivalent of tab-scoped session storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a value, as if left behind by an earlier run.
    pub fn with_value(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }
}

#[async_trait]
impl CredentialStorage for MemoryStorage {
    async fn get(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot.lock().await.clone())
    }

    async fn set(&self, raw: &str) -> Result<(), StorageError> {
        *self.slot.lock().await = Some(raw.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.slot.lock().await = None;
        Ok(())
    }
}

/// Single-file storage used by the console.
///
/// The file is created owner-only on unix and removed on `clear`. Writes go
/// to a sibling `.tmp` file that is renamed into place, so a failed write
/// never leaves a truncated credential behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("session"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

async fn write_owner_only(path: &Path, raw: &str) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    tokio::io::AsyncWriteExt::write_all(&mut file, raw.as_bytes()).await?;
    tokio::io::AsyncWriteExt::flush(&mut file).await?;
    file.sync_all().await
}

#[async_trait]
impl CredentialStorage for FileStorage {
    async fn get(&self) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let raw = contents.trim();
                Ok((!raw.is_empty()).then(|| raw.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, raw: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let staging = self.staging_path();
        let result = match write_owner_only(&staging, raw).await {
            Ok(()) => tokio::fs::rename(&staging, &self.path).await,
            Err(e) => Err(e),
        };
        if result.is_err() {
            let _ = tokio::fs::remove_file(&staging).await;
        }
        Ok(result?)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("eligo-session-{}", uuid::Uuid::now_v7()))
            .join("session")
    }

    #[tokio::test]
    async fn memory_storage_holds_one_value() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get().await.unwrap(), None);

        storage.set("first").await.unwrap();
        storage.set("second").await.unwrap();
        assert_eq!(storage.get().await.unwrap().as_deref(), Some("second"));

        storage.clear().await.unwrap();
        storage.clear().await.unwrap();
        assert_eq!(storage.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_storage_set_get_clear() {
        let path = scratch_path();
        let storage = FileStorage::new(&path);

        assert_eq!(storage.get().await.unwrap(), None);

        storage.set("a.b.c").await.unwrap();
        assert_eq!(storage.get().await.unwrap().as_deref(), Some("a.b.c"));

        storage.set("d.e.f").await.unwrap();
        assert_eq!(storage.get().await.unwrap().as_deref(), Some("d.e.f"));

        storage.clear().await.unwrap();
        assert!(!path.exists());
        storage.clear().await.unwrap();
        assert_eq!(storage.get().await.unwrap(), None);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[tokio::test]
    async fn failed_file_write_keeps_the_previous_credential() {
        let path = scratch_path();
        let storage = FileStorage::new(&path);
        storage.set("a.b.c").await.unwrap();

        // A directory squatting on the staging name makes the next write fail.
        std::fs::create_dir(storage.staging_path()).unwrap();
        assert!(storage.set("d.e.f").await.is_err());
        assert_eq!(storage.get().await.unwrap().as_deref(), Some("a.b.c"));

        std::fs::remove_dir(storage.staging_path()).unwrap();
        storage.set("d.e.f").await.unwrap();
        assert_eq!(storage.get().await.unwrap().as_deref(), Some("d.e.f"));
        assert!(!storage.staging_path().exists());

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_storage_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let path = scratch_path();
        let storage = FileStorage::new(&path);
        storage.set("a.b.c").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
