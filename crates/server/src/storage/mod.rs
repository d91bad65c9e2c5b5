//! Storage for the last reverse conversion
//!
//! Handlers never touch the converted file directly; they go through a
//! [`ConversionStore`] held in application state.

pub mod files;

use std::path::PathBuf;

use async_trait::async_trait;
use covid_fhir_core::CovidRecord;
use thiserror::Error;
use tokio::sync::RwLock;

/// Storage error types
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Holds at most one set of converted records
#[async_trait]
pub trait ConversionStore: Send + Sync {
    /// Raw JSON of the stored records, if any were saved
    async fn load(&self) -> Result<Option<Vec<u8>>, StorageError>;

    /// Drop any previous records and store `records`
    async fn replace(&self, records: &[CovidRecord]) -> Result<(), StorageError>;

    /// Remove the stored records, if any
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Stores the conversion as a JSON file on disk.
///
/// Operations through one `FileStore` are serialized, so a reader never sees
/// a half-written file.
#[derive(Debug)]
pub struct FileStore {
    directory: PathBuf,
    filename: String,
    lock: RwLock<()>,
}

impl FileStore {
    pub fn new(directory: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            filename: filename.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

#[async_trait]
impl ConversionStore for FileStore {
    async fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        let _guard = self.lock.read().await;
        if !files::file_exists(&self.directory, &self.filename).await {
            return Ok(None);
        }
        Ok(Some(tokio::fs::read(self.path()).await?))
    }

    async fn replace(&self, records: &[CovidRecord]) -> Result<(), StorageError> {
        let _guard = self.lock.write().await;
        let path = self.path();
        files::remove_if_exists(&path).await?;
        files::save_records(records, &path).await?;
        tracing::debug!(
            path = %path.display(),
            records = records.len(),
            "Stored converted records"
        );
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock.write().await;
        let path = self.path();
        files::remove_if_exists(&path).await?;
        tracing::debug!(path = %path.display(), "Cleared converted records");
        Ok(())
    }
}

/// In-memory store, used by tests and when nothing should touch the disk
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: RwLock<Option<Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversionStore for MemoryStore {
    async fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.slot.read().await.clone())
    }

    async fn replace(&self, records: &[CovidRecord]) -> Result<(), StorageError> {
        let body = serde_json::to_vec(records)?;
        *self.slot.write().await = Some(body);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.slot.write().await = None;
        Ok(())
    }
}
