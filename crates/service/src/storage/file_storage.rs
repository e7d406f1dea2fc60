use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::{fs, sync::RwLock};
use tracing::{debug, info};

use models::{record::key_of, Record, RecordKind};

use super::{Storage, StorageError};

/// JSON file-backed record store.
///
/// Holds every record in memory keyed by `"<ClassName>.<id>"` and writes the whole
/// map as one JSON document on `save`. `None` in `objects` marks a closed store.
pub struct FileStorage {
    objects: RwLock<Option<BTreeMap<String, Record>>>,
    file_path: PathBuf,
}

impl FileStorage {
    /// Open the store at `path` and load it. A missing document means an empty store.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, StorageError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let objects = Self::read_document(&file_path).await?;
        info!(path = %file_path.display(), records = objects.len(), "file storage loaded");
        Ok(Self { objects: RwLock::new(Some(objects)), file_path })
    }

    async fn read_document(path: &Path) -> Result<BTreeMap<String, Record>, StorageError> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        let raw: Map<String, Value> = serde_json::from_slice(&bytes)?;
        let mut objects = BTreeMap::new();
        for (key, value) in raw {
            let record = Record::from_storage(&key, value)?;
            objects.insert(key, record);
        }
        Ok(objects)
    }

    /// Temp file next to the document; renamed over it once fully written.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.file_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn all(&self, kind: Option<RecordKind>) -> Result<BTreeMap<String, Record>, StorageError> {
        let guard = self.objects.read().await;
        let objects = guard.as_ref().ok_or(StorageError::Closed)?;
        Ok(objects
            .iter()
            .filter(|(_, r)| kind.map_or(true, |k| r.kind() == k))
            .map(|(key, r)| (key.clone(), r.clone()))
            .collect())
    }

    async fn get(&self, kind: RecordKind, id: &str) -> Result<Option<Record>, StorageError> {
        let guard = self.objects.read().await;
        let objects = guard.as_ref().ok_or(StorageError::Closed)?;
        Ok(objects.get(&key_of(kind, id)).cloned())
    }

    async fn count(&self, kind: Option<RecordKind>) -> Result<usize, StorageError> {
        let guard = self.objects.read().await;
        let objects = guard.as_ref().ok_or(StorageError::Closed)?;
        Ok(match kind {
            Some(k) => objects.values().filter(|r| r.kind() == k).count(),
            None => objects.len(),
        })
    }

    async fn register(&self, record: Record) -> Result<(), StorageError> {
        let mut guard = self.objects.write().await;
        let objects = guard.as_mut().ok_or(StorageError::Closed)?;
        debug!(key = %record.key(), "registered");
        objects.insert(record.key(), record);
        Ok(())
    }

    async fn save(&self) -> Result<(), StorageError> {
        let guard = self.objects.read().await;
        let objects = guard.as_ref().ok_or(StorageError::Closed)?;
        let mut document = Map::new();
        for (key, record) in objects {
            document.insert(key.clone(), Value::Object(record.to_storage_dict()?));
        }
        let data = serde_json::to_vec(&document)?;
        let tmp = self.temp_path();
        fs::write(&tmp, data).await?;
        fs::rename(&tmp, &self.file_path).await?;
        debug!(path = %self.file_path.display(), records = objects.len(), "saved");
        Ok(())
    }

    async fn delete(&self, record: Option<&Record>) -> Result<(), StorageError> {
        let Some(record) = record else { return Ok(()) };
        let mut guard = self.objects.write().await;
        let objects = guard.as_mut().ok_or(StorageError::Closed)?;
        let existed = objects.remove(&record.key()).is_some();
        debug!(key = %record.key(), existed, "deleted");
        Ok(())
    }

    async fn reload(&self) -> Result<(), StorageError> {
        let mut guard = self.objects.write().await;
        if guard.is_none() {
            return Err(StorageError::Closed);
        }
        let fresh = Self::read_document(&self.file_path).await?;
        debug!(records = fresh.len(), "reloaded");
        *guard = Some(fresh);
        Ok(())
    }

    async fn close(&self) -> Result<(), StorageError> {
        let mut guard = self.objects.write().await;
        if guard.take().is_some() {
            info!(path = %self.file_path.display(), "file storage closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::Fields;
    use serde_json::json;

    fn tmp_path() -> PathBuf {
        std::env::temp_dir().join(format!("file_storage_{}", uuid::Uuid::new_v4())).join("file.json")
    }

    fn fields(v: Value) -> Fields {
        v.as_object().cloned().unwrap_or_default()
    }

    async fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir).await;
        }
    }

    #[tokio::test]
    async fn california_survives_save_and_reload() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        let store = FileStorage::open(&path).await?;

        let california = RecordKind::State.build(&fields(json!({"name": "California"})))?;
        store.register(california.clone()).await?;
        store.save().await?;
        store.reload().await?;

        let found = store.get(RecordKind::State, california.id()).await?.unwrap();
        assert_eq!(found, california);
        match found {
            Record::State(s) => assert_eq!(s.name, "California"),
            other => panic!("unexpected record {other:?}"),
        }

        // a second instance sees the same document
        let other = FileStorage::open(&path).await?;
        assert_eq!(other.all(None).await?, store.all(None).await?);

        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn missing_ids_and_empty_store() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        let store = FileStorage::open(&path).await?;
        assert!(store.all(None).await?.is_empty());
        assert_eq!(store.count(None).await?, 0);
        assert!(store.get(RecordKind::City, "non_existing_id").await?.is_none());
        store.delete(None).await?;
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn count_and_all_filter_by_kind() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        let store = FileStorage::open(&path).await?;
        let ny = RecordKind::State.build(&fields(json!({"name": "New York"})))?;
        let tx = RecordKind::State.build(&fields(json!({"name": "Texas"})))?;
        let nyc = RecordKind::City.build(&fields(json!({"name": "New York City", "state_id": ny.id()})))?;
        let houston = RecordKind::City.build(&fields(json!({"name": "Houston", "state_id": tx.id()})))?;
        for r in [&ny, &tx, &nyc, &houston] {
            store.register(r.clone()).await?;
        }
        store.save().await?;

        assert_eq!(store.count(None).await?, 4);
        assert_eq!(store.count(Some(RecordKind::State)).await?, 2);
        assert_eq!(store.count(Some(RecordKind::City)).await?, 2);
        let cities = store.all(Some(RecordKind::City)).await?;
        assert!(cities.keys().all(|k| k.starts_with("City.")));
        assert!(cities.contains_key(&nyc.key()));

        let in_texas = store.children(RecordKind::State, tx.id(), RecordKind::City).await?;
        assert_eq!(in_texas, vec![houston]);
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn delete_then_save_removes_record() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        let store = FileStorage::open(&path).await?;
        let wifi = RecordKind::Amenity.build(&fields(json!({"name": "Wifi"})))?;
        store.register(wifi.clone()).await?;
        store.save().await?;

        store.delete(Some(&wifi)).await?;
        store.save().await?;
        store.reload().await?;
        assert!(store.get(RecordKind::Amenity, wifi.id()).await?.is_none());
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn reload_discards_unsaved_changes() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        let store = FileStorage::open(&path).await?;
        let pending = RecordKind::State.build(&fields(json!({"name": "Oregon"})))?;
        store.register(pending.clone()).await?;
        assert_eq!(store.count(None).await?, 1);
        store.reload().await?;
        assert_eq!(store.count(None).await?, 0);
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn document_is_object_of_objects() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        let store = FileStorage::open(&path).await?;
        let state = RecordKind::State.build(&fields(json!({"name": "Utah"})))?;
        store.register(state.clone()).await?;
        store.save().await?;

        let raw: Value = serde_json::from_slice(&fs::read(&path).await?)?;
        let entry = &raw[state.key()];
        assert_eq!(entry["__class__"], "State");
        assert_eq!(entry["name"], "Utah");
        assert_eq!(entry["id"], state.id());
        assert!(fs::metadata(store.temp_path()).await.is_err());
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn unknown_class_in_document_is_an_error() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        fs::create_dir_all(path.parent().unwrap()).await?;
        fs::write(&path, br#"{"Planet.1": {"id": "1"}}"#).await?;
        let err = FileStorage::open(&path).await.err().unwrap();
        assert!(matches!(err, StorageError::Model(_)));
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn close_is_idempotent_and_final() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        let store = FileStorage::open(&path).await?;
        store.close().await?;
        store.close().await?;
        assert!(matches!(store.count(None).await, Err(StorageError::Closed)));
        assert!(matches!(store.reload().await, Err(StorageError::Closed)));
        cleanup(&path).await;
        Ok(())
    }
}
