//! Storage abstractions for service layer
//!
//! `Storage` is the contract shared by the two backing media: a single JSON
//! document (`FileStorage`) and a relational database (`DbStorage`). Writes are
//! staged by `register`/`delete` and become durable on `save`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use configs::{AppConfig, StorageBackend};
use models::{errors::ModelError, Record, RecordKind};

pub mod db_storage;
pub mod file_storage;

pub use db_storage::DbStorage;
pub use file_storage::FileStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
    #[error("storage is closed")]
    Closed,
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Every record keyed by `"<ClassName>.<id>"`, restricted to `kind` when given.
    async fn all(&self, kind: Option<RecordKind>) -> Result<BTreeMap<String, Record>, StorageError>;

    /// The record of `kind` with `id`, or `None`.
    async fn get(&self, kind: RecordKind, id: &str) -> Result<Option<Record>, StorageError>;

    async fn count(&self, kind: Option<RecordKind>) -> Result<usize, StorageError>;

    /// Stage `record` as a new object, or as a change when its key already exists.
    async fn register(&self, record: Record) -> Result<(), StorageError>;

    /// Make every staged addition, change and deletion durable.
    async fn save(&self) -> Result<(), StorageError>;

    /// Stage the removal of `record`; `None` is a no-op.
    async fn delete(&self, record: Option<&Record>) -> Result<(), StorageError>;

    /// Drop in-memory and staged state, then read the backing medium again.
    async fn reload(&self) -> Result<(), StorageError>;

    /// Release the backing medium. Calling it again is a no-op.
    async fn close(&self) -> Result<(), StorageError>;

    /// Records of `kind` whose foreign key to `parent` equals `parent_id`.
    async fn children(
        &self,
        parent: RecordKind,
        parent_id: &str,
        kind: RecordKind,
    ) -> Result<Vec<Record>, StorageError> {
        Ok(self
            .all(Some(kind))
            .await?
            .into_values()
            .filter(|r| r.parent_id(parent) == Some(parent_id))
            .collect())
    }
}

/// Open the backend selected by `cfg.storage.backend`.
pub async fn open(cfg: &AppConfig) -> Result<Arc<dyn Storage>, StorageError> {
    match cfg.storage.backend {
        StorageBackend::File => {
            info!(path = %cfg.storage.file_path, "using file storage");
            let store = FileStorage::open(&cfg.storage.file_path).await?;
            Ok(Arc::new(store))
        }
        StorageBackend::Db => {
            info!(reset = cfg.database.reset_on_start, "using database storage");
            let store = DbStorage::connect(&cfg.database).await?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_picks_backend_from_config() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("storage_open_{}", uuid::Uuid::new_v4()));

        let mut cfg = AppConfig::default();
        cfg.storage.file_path = dir.join("file.json").display().to_string();
        let file = open(&cfg).await?;
        assert_eq!(file.count(None).await?, 0);
        file.close().await?;

        cfg.storage.backend = StorageBackend::Db;
        cfg.database.url = format!("sqlite://{}?mode=rwc", dir.join("hbnb.sqlite").display());
        let db = open(&cfg).await?;
        assert_eq!(db.count(None).await?, 0);
        db.close().await?;

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
