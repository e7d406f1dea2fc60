//! CRUD over every record kind.
//!
//! Each write stages its changes in the store and commits them with `save` before
//! returning. When a write fails half way the staged work is dropped with `reload`.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{info, instrument, warn};

use models::{Fields, Record, RecordKind};

use crate::errors::ServiceError;
use crate::storage::Storage;

/// Every record of `kind`, ordered by key.
#[instrument(skip(store))]
pub async fn list(store: &dyn Storage, kind: RecordKind) -> Result<Vec<Record>, ServiceError> {
    Ok(store.all(Some(kind)).await?.into_values().collect())
}

#[instrument(skip(store))]
pub async fn get(store: &dyn Storage, kind: RecordKind, id: &str) -> Result<Record, ServiceError> {
    store.get(kind, id).await?.ok_or_else(|| ServiceError::not_found(kind, id))
}

/// Build a record from `fields`, check that what it points at exists, then persist it.
#[instrument(skip(store, fields))]
pub async fn create(store: &dyn Storage, kind: RecordKind, fields: &Fields) -> Result<Record, ServiceError> {
    insert(store, kind.build(fields)?, None).await
}

/// `create` under an already fetched `parent`; the body cannot redirect the foreign key.
#[instrument(skip(store, parent, fields), fields(parent = %parent.key()))]
pub async fn create_child(
    store: &dyn Storage,
    parent: &Record,
    kind: RecordKind,
    fields: &Fields,
) -> Result<Record, ServiceError> {
    let column = kind
        .foreign_key(parent.kind())
        .ok_or_else(|| ServiceError::Validation(format!("{} does not belong to {}", kind, parent.kind())))?;
    let mut fields = fields.clone();
    fields.insert(column.to_string(), Value::String(parent.id().to_string()));
    insert(store, kind.build(&fields)?, Some(parent)).await
}

#[instrument(skip(store))]
pub async fn list_children(
    store: &dyn Storage,
    parent: RecordKind,
    parent_id: &str,
    kind: RecordKind,
) -> Result<Vec<Record>, ServiceError> {
    get(store, parent, parent_id).await?;
    Ok(store.children(parent, parent_id, kind).await?)
}

/// Apply the mutable attributes in `fields` to an already fetched record and bump `updated_at`.
#[instrument(skip_all, fields(key = %record.key()))]
pub async fn update(store: &dyn Storage, mut record: Record, fields: &Fields) -> Result<Record, ServiceError> {
    record.apply(fields)?;
    record.touch();
    commit(store, |s| async move {
        s.register(record.clone()).await?;
        Ok::<_, ServiceError>(record)
    })
    .await
}

/// Remove the record and, recursively, everything that points at it.
#[instrument(skip(store))]
pub async fn delete(store: &dyn Storage, kind: RecordKind, id: &str) -> Result<(), ServiceError> {
    let record = get(store, kind, id).await?;
    commit(store, |s| async move {
        let removed = remove_tree(s, record).await?;
        info!(removed, "deleted");
        Ok::<_, ServiceError>(())
    })
    .await
}

/// Count per kind, keyed by collection name.
#[instrument(skip(store))]
pub async fn stats(store: &dyn Storage) -> Result<BTreeMap<&'static str, usize>, ServiceError> {
    let mut out = BTreeMap::new();
    for kind in RecordKind::ALL {
        out.insert(kind.plural(), store.count(Some(kind)).await?);
    }
    Ok(out)
}

async fn insert(store: &dyn Storage, record: Record, parent: Option<&Record>) -> Result<Record, ServiceError> {
    for (kind, id) in record.references() {
        if parent.is_some_and(|p| p.kind() == kind && p.id() == id) {
            continue;
        }
        get(store, kind, id).await?;
    }
    commit(store, |s| async move {
        s.register(record.clone()).await?;
        Ok::<_, ServiceError>(record)
    })
    .await
    .inspect(|r| info!(key = %r.key(), "created"))
}

async fn remove_tree(store: &dyn Storage, root: Record) -> Result<usize, ServiceError> {
    // depth-first, children staged for deletion before their parent
    let mut pending = vec![(root, false)];
    let mut removed = 0;
    while let Some((record, expanded)) = pending.pop() {
        if expanded {
            store.delete(Some(&record)).await?;
            removed += 1;
            continue;
        }
        let kind = record.kind();
        let id = record.id().to_string();
        pending.push((record, true));
        for dependent in kind.dependents() {
            for child in store.children(kind, &id, *dependent).await? {
                pending.push((child, false));
            }
        }
    }
    Ok(removed)
}

async fn commit<'a, T, F, Fut>(store: &'a dyn Storage, stage: F) -> Result<T, ServiceError>
where
    F: FnOnce(&'a dyn Storage) -> Fut,
    Fut: std::future::Future<Output = Result<T, ServiceError>> + 'a,
{
    let staged = match stage(store).await {
        Ok(value) => value,
        Err(e) => return Err(rollback(store, e).await),
    };
    match store.save().await {
        Ok(()) => Ok(staged),
        Err(e) => Err(rollback(store, e.into()).await),
    }
}

async fn rollback(store: &dyn Storage, cause: ServiceError) -> ServiceError {
    if let Err(e) = store.reload().await {
        warn!(error = %e, "discarding staged changes failed");
    }
    cause
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fields, stores, CountingStore};
    use serde_json::json;

    #[tokio::test]
    async fn create_get_update_on_both_backends() -> Result<(), anyhow::Error> {
        for store in stores().await? {
            let store = store.as_ref();
            let state = create(store, RecordKind::State, &fields(json!({"name": "California"}))).await?;
            assert_eq!(get(store, RecordKind::State, state.id()).await?, state);

            let updated = update(
                store,
                state.clone(),
                &fields(json!({"name": "Nevada", "id": "other", "created_at": "2001-01-01T00:00:00.000000"})),
            )
            .await?;
            assert_eq!(updated.id(), state.id());
            assert_eq!(updated.created_at(), state.created_at());
            assert!(updated.updated_at() >= state.updated_at());
            assert_eq!(updated.to_dict()?["name"], "Nevada");

            store.reload().await?;
            assert_eq!(get(store, RecordKind::State, state.id()).await?, updated);
            store.close().await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn missing_records_and_fields() -> Result<(), anyhow::Error> {
        for store in stores().await? {
            let store = store.as_ref();
            let err = get(store, RecordKind::Place, "nope").await.unwrap_err();
            assert!(matches!(err, ServiceError::NotFound(_)));

            let err = create(store, RecordKind::State, &fields(json!({}))).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(ref m) if m == "Missing name"));

            let err = create(store, RecordKind::City, &fields(json!({"name": "Ghost", "state_id": "nope"})))
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::NotFound(_)));
            assert_eq!(store.count(None).await?, 0);
            store.close().await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn nested_create_takes_parent_from_path() -> Result<(), anyhow::Error> {
        for store in stores().await? {
            let store = store.as_ref();
            let ca = create(store, RecordKind::State, &fields(json!({"name": "California"}))).await?;
            let ny = create(store, RecordKind::State, &fields(json!({"name": "New York"}))).await?;
            let sf = create_child(
                store,
                &ca,
                RecordKind::City,
                &fields(json!({"name": "San Francisco", "state_id": ny.id()})),
            )
            .await?;
            assert_eq!(sf.parent_id(RecordKind::State), Some(ca.id()));
            assert_eq!(list_children(store, RecordKind::State, ca.id(), RecordKind::City).await?, vec![sf]);
            assert!(list_children(store, RecordKind::State, ny.id(), RecordKind::City).await?.is_empty());

            let err = list_children(store, RecordKind::State, "nope", RecordKind::City).await.unwrap_err();
            assert!(matches!(err, ServiceError::NotFound(_)));
            store.close().await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn place_requires_existing_user() -> Result<(), anyhow::Error> {
        for store in stores().await? {
            let store = store.as_ref();
            let state = create(store, RecordKind::State, &fields(json!({"name": "Texas"}))).await?;
            let city = create_child(store, &state, RecordKind::City, &fields(json!({"name": "Austin"})))
                .await?;

            let err = create_child(store, &city, RecordKind::Place, &fields(json!({"name": "Loft"})))
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Validation(ref m) if m == "Missing user_id"));

            let err = create_child(
                store,
                &city,
                RecordKind::Place,
                &fields(json!({"name": "Loft", "user_id": "ghost"})),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, ServiceError::NotFound(_)));
            store.close().await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn delete_cascades_to_dependents() -> Result<(), anyhow::Error> {
        for store in stores().await? {
            let store = store.as_ref();
            let state = create(store, RecordKind::State, &fields(json!({"name": "Oregon"}))).await?;
            let city = create_child(store, &state, RecordKind::City, &fields(json!({"name": "Portland"})))
                .await?;
            let user = create(store, RecordKind::User, &fields(json!({"email": "a@b.c", "password": "pwd"}))).await?;
            let place = create_child(
                store,
                &city,
                RecordKind::Place,
                &fields(json!({"name": "Cabin", "user_id": user.id()})),
            )
            .await?;
            create_child(
                store,
                &place,
                RecordKind::Review,
                &fields(json!({"text": "Cozy", "user_id": user.id()})),
            )
            .await?;
            let wifi = create(store, RecordKind::Amenity, &fields(json!({"name": "Wifi"}))).await?;

            let counts = stats(store).await?;
            assert_eq!(counts["reviews"], 1);
            assert_eq!(counts["amenities"], 1);

            delete(store, RecordKind::State, state.id()).await?;
            store.reload().await?;
            let counts = stats(store).await?;
            assert_eq!(counts["states"], 0);
            assert_eq!(counts["cities"], 0);
            assert_eq!(counts["places"], 0);
            assert_eq!(counts["reviews"], 0);
            assert_eq!(counts["users"], 1);
            assert_eq!(get(store, RecordKind::Amenity, wifi.id()).await?, wifi);

            let err = delete(store, RecordKind::State, state.id()).await.unwrap_err();
            assert!(matches!(err, ServiceError::NotFound(_)));
            store.close().await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn stats_lists_every_collection() -> Result<(), anyhow::Error> {
        for store in stores().await? {
            let counts = stats(store.as_ref()).await?;
            let names: Vec<_> = counts.keys().copied().collect();
            assert_eq!(names, vec!["amenities", "cities", "places", "reviews", "states", "users"]);
            assert!(counts.values().all(|n| *n == 0));
            store.close().await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn fetched_records_are_not_looked_up_again() -> Result<(), anyhow::Error> {
        for inner in stores().await? {
            let store = CountingStore::new(inner);
            let state = create(&store, RecordKind::State, &fields(json!({"name": "Utah"}))).await?;
            let user = create(&store, RecordKind::User, &fields(json!({"email": "u@t.ah", "password": "pwd"}))).await?;
            store.take_gets();

            let city = create_child(&store, &state, RecordKind::City, &fields(json!({"name": "Moab"}))).await?;
            assert_eq!(store.take_gets(), 0);

            // the owner still has to be checked, the city does not
            create_child(&store, &city, RecordKind::Place, &fields(json!({"name": "Tent", "user_id": user.id()})))
                .await?;
            assert_eq!(store.take_gets(), 1);

            let renamed = update(&store, city, &fields(json!({"name": "Ogden"}))).await?;
            assert_eq!(store.take_gets(), 0);
            assert_eq!(get(&store, RecordKind::City, renamed.id()).await?, renamed);

            let err = create_child(&store, &user, RecordKind::City, &fields(json!({"name": "Nowhere"})))
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
            store.close().await?;
        }
        Ok(())
    }
}
