#![cfg(test)]
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use configs::DatabaseConfig;
use serde_json::Value;

use models::{Fields, Record, RecordKind};

use crate::storage::{DbStorage, FileStorage, Storage, StorageError};

/// Scratch location unique to one test.
pub fn scratch_dir(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}_{}", prefix, uuid::Uuid::new_v4()))
}

pub async fn file_store() -> Result<Arc<dyn Storage>, anyhow::Error> {
    let store = FileStorage::open(scratch_dir("svc_file").join("file.json")).await?;
    Ok(Arc::new(store))
}

pub async fn db_store() -> Result<Arc<dyn Storage>, anyhow::Error> {
    let path = scratch_dir("svc_db").with_extension("sqlite");
    let cfg = DatabaseConfig { url: format!("sqlite://{}?mode=rwc", path.display()), ..DatabaseConfig::default() };
    Ok(Arc::new(DbStorage::connect(&cfg).await?))
}

/// Both backends, so behaviour can be asserted once for each.
pub async fn stores() -> Result<Vec<Arc<dyn Storage>>, anyhow::Error> {
    Ok(vec![file_store().await?, db_store().await?])
}

pub fn fields(v: Value) -> Fields {
    v.as_object().cloned().unwrap_or_default()
}

/// Delegates to `inner` and counts single-record lookups.
pub struct CountingStore {
    pub inner: Arc<dyn Storage>,
    pub gets: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<dyn Storage>) -> Self {
        Self { inner, gets: AtomicUsize::new(0) }
    }

    /// Lookups made since the last call.
    pub fn take_gets(&self) -> usize {
        self.gets.swap(0, Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for CountingStore {
    async fn all(&self, kind: Option<RecordKind>) -> Result<BTreeMap<String, Record>, StorageError> {
        self.inner.all(kind).await
    }

    async fn get(&self, kind: RecordKind, id: &str) -> Result<Option<Record>, StorageError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(kind, id).await
    }

    async fn count(&self, kind: Option<RecordKind>) -> Result<usize, StorageError> {
        self.inner.count(kind).await
    }

    async fn register(&self, record: Record) -> Result<(), StorageError> {
        self.inner.register(record).await
    }

    async fn save(&self) -> Result<(), StorageError> {
        self.inner.save().await
    }

    async fn delete(&self, record: Option<&Record>) -> Result<(), StorageError> {
        self.inner.delete(record).await
    }

    async fn reload(&self) -> Result<(), StorageError> {
        self.inner.reload().await
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.inner.close().await
    }
}
