//! Image metadata store.
//!
//! The store is an append-only list of [`ImageRecord`]s guarded by a
//! [`tokio::sync::RwLock`]. Records are created on webhook receipt, never
//! mutated, never deleted. Two backends exist, selected by
//! [`StoreConfig`](crate::config::StoreConfig):
//!
//! - **memory**: records live only for the lifetime of the process
//! - **file**: records are additionally appended to a JSON-lines file which is
//!   replayed on startup, so a restart does not lose the gallery
//!
//! Duplicate inserts (same `id`) are rejected, which is the whole
//! deduplication policy against provider-redelivered webhook events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::config::StoreConfig;

/// Stored metadata for one gallery photo.
///
/// `id` is the Telegram `file_unique_id`, which is stable across bot tokens
/// and redeliveries; `file_id` is the token-scoped handle used against the
/// Bot API. The record is the public API contract of `GET /api/images`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImageRecord {
    /// Unique identifier within the store (Telegram file_unique_id)
    pub id: String,
    /// Telegram file handle used to resolve the download URL
    pub file_id: String,
    /// Fetchable URL of the full-resolution image
    pub full_url: String,
    /// Fetchable URL of a smaller rendition, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Caption text attached to the message, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Pixel width, when Telegram reports it (photos, not documents)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Pixel height, when Telegram reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Telegram message id the image arrived in
    pub message_id: i64,
    /// When the message was sent
    pub timestamp: DateTime<Utc>,
}

#[derive(ThisError, Debug)]
pub enum StoreError {
    #[error("store file I/O failed")]
    Io(#[from] std::io::Error),

    #[error("store file line {line} is not a valid record")]
    Corrupt {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize record {id}")]
    Serialize {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Default)]
struct Inner {
    records: Vec<ImageRecord>,
    ids: HashSet<String>,
}

/// Append-only image metadata store.
pub struct ImageStore {
    inner: RwLock<Inner>,
    file: Option<PathBuf>,
}

impl ImageStore {
    /// Open the store for the configured backend.
    ///
    /// For the file backend, existing records are replayed from the
    /// JSON-lines file; a missing file is treated as an empty store.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        match config {
            StoreConfig::Memory => {
                info!("Using in-memory image store (records are lost on restart)");
                Ok(Self {
                    inner: RwLock::new(Inner::default()),
                    file: None,
                })
            }
            StoreConfig::File { path } => {
                let inner = Self::load_file(path).await?;
                info!(records = inner.records.len(), path = %path.display(), "Loaded image store from file");
                Ok(Self {
                    inner: RwLock::new(inner),
                    file: Some(path.clone()),
                })
            }
        }
    }

    async fn load_file(path: &Path) -> Result<Inner, StoreError> {
        let mut inner = Inner::default();

        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(inner),
            Err(e) => return Err(e.into()),
        };

        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: ImageRecord = serde_json::from_str(line).map_err(|source| StoreError::Corrupt { line: idx + 1, source })?;
            // Later duplicates lose, same as at insert time.
            if inner.ids.insert(record.id.clone()) {
                inner.records.push(record);
            } else {
                warn!(id = %record.id, line = idx + 1, "Skipping duplicate record in store file");
            }
        }

        Ok(inner)
    }

    /// Append a record to the store.
    ///
    /// Returns `true` if the record was appended, `false` if a record with
    /// the same `id` already exists (the new record is discarded).
    pub async fn insert(&self, record: ImageRecord) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.ids.contains(&record.id) {
            return Ok(false);
        }

        if let Some(path) = &self.file {
            let mut line = serde_json::to_string(&record).map_err(|source| StoreError::Serialize {
                id: record.id.clone(),
                source,
            })?;
            line.push('\n');

            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await?;
            }

            let mut file = tokio::fs::OpenOptions::new().create(true).append(true).open(path).await?;
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;
        }

        inner.ids.insert(record.id.clone());
        inner.records.push(record);
        Ok(true)
    }

    /// Snapshot of all records, in insertion order.
    ///
    /// Insertion order is not semantically meaningful - the gallery re-sorts
    /// by timestamp.
    pub async fn list(&self) -> Vec<ImageRecord> {
        self.inner.read().await.records.clone()
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_record;

    #[tokio::test]
    async fn test_memory_store_insert_and_list() {
        let store = ImageStore::open(&StoreConfig::Memory).await.unwrap();
        assert!(store.is_empty().await);

        let record = sample_record("a", 1);
        assert!(store.insert(record.clone()).await.unwrap());
        assert_eq!(store.list().await, vec![record]);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let store = ImageStore::open(&StoreConfig::Memory).await.unwrap();

        assert!(store.insert(sample_record("a", 1)).await.unwrap());
        assert!(!store.insert(sample_record("a", 2)).await.unwrap());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_file_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::File {
            path: dir.path().join("images.jsonl"),
        };

        {
            let store = ImageStore::open(&config).await.unwrap();
            store.insert(sample_record("a", 1)).await.unwrap();
            store.insert(sample_record("b", 2)).await.unwrap();
        }

        let reopened = ImageStore::open(&config).await.unwrap();
        assert_eq!(reopened.len().await, 2);
        let ids: Vec<String> = reopened.list().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::File {
            path: dir.path().join("does-not-exist.jsonl"),
        };

        let store = ImageStore::open(&config).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_file_store_corrupt_line_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("images.jsonl");
        tokio::fs::write(&path, "not json\n").await.unwrap();

        let result = ImageStore::open(&StoreConfig::File { path }).await;
        assert!(matches!(result, Err(StoreError::Corrupt { line: 1, .. })));
    }
}
