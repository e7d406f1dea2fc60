use std::collections::BTreeMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, TransactionTrait,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use configs::DatabaseConfig;
use models::{amenity, city, db, place, review, state, user, Record, RecordKind};

use super::{Storage, StorageError};

/// Relational record store.
///
/// Staged writes live in one open transaction (the session). Reads go through that
/// transaction while it is open so they see staged work; `save` commits it and
/// `reload` rolls it back.
pub struct DbStorage {
    session: Mutex<Session>,
}

struct Session {
    db: Option<DatabaseConnection>,
    txn: Option<DatabaseTransaction>,
}

impl Session {
    /// Current transaction, begun on first use.
    async fn begin(&mut self) -> Result<&DatabaseTransaction, StorageError> {
        if self.txn.is_none() {
            let db = self.db.as_ref().ok_or(StorageError::Closed)?;
            self.txn = Some(db.begin().await?);
            debug!("session opened");
        }
        self.txn.as_ref().ok_or(StorageError::Closed)
    }
}

// Runs `$body` against the open transaction, or the pool when nothing is staged.
macro_rules! on_session {
    ($session:expr, $conn:ident => $body:expr) => {
        match ($session.txn.as_ref(), $session.db.as_ref()) {
            (Some($conn), _) => $body,
            (None, Some($conn)) => $body,
            (None, None) => return Err(StorageError::Closed),
        }
    };
}

// Insert the model, or overwrite every column of the existing row.
macro_rules! upsert {
    ($conn:expr, $module:ident, $model:expr) => {{
        let model = $model;
        let exists = $module::Entity::find_by_id(model.id.clone()).one($conn).await?.is_some();
        let active = $module::ActiveModel::from(model).reset_all();
        if exists {
            active.update($conn).await?;
        } else {
            active.insert($conn).await?;
        }
    }};
}

impl DbStorage {
    /// Connect, optionally wipe the schema, and ensure every table exists.
    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self, StorageError> {
        let conn = db::connect_with_config(cfg).await?;
        if cfg.reset_on_start {
            warn!("dropping all tables before start");
            db::drop_schema(&conn).await?;
        }
        db::create_schema(&conn).await?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap a connection whose schema is already in place.
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self { session: Mutex::new(Session { db: Some(conn), txn: None }) }
    }
}

async fn fetch_kind<C: ConnectionTrait>(conn: &C, kind: RecordKind) -> Result<Vec<Record>, DbErr> {
    Ok(match kind {
        RecordKind::State => state::Entity::find().all(conn).await?.into_iter().map(Record::from).collect(),
        RecordKind::City => city::Entity::find().all(conn).await?.into_iter().map(Record::from).collect(),
        RecordKind::Amenity => amenity::Entity::find().all(conn).await?.into_iter().map(Record::from).collect(),
        RecordKind::User => user::Entity::find().all(conn).await?.into_iter().map(Record::from).collect(),
        RecordKind::Place => place::Entity::find().all(conn).await?.into_iter().map(Record::from).collect(),
        RecordKind::Review => review::Entity::find().all(conn).await?.into_iter().map(Record::from).collect(),
    })
}

async fn fetch_one<C: ConnectionTrait>(conn: &C, kind: RecordKind, id: &str) -> Result<Option<Record>, DbErr> {
    let id = id.to_string();
    Ok(match kind {
        RecordKind::State => state::Entity::find_by_id(id).one(conn).await?.map(Record::from),
        RecordKind::City => city::Entity::find_by_id(id).one(conn).await?.map(Record::from),
        RecordKind::Amenity => amenity::Entity::find_by_id(id).one(conn).await?.map(Record::from),
        RecordKind::User => user::Entity::find_by_id(id).one(conn).await?.map(Record::from),
        RecordKind::Place => place::Entity::find_by_id(id).one(conn).await?.map(Record::from),
        RecordKind::Review => review::Entity::find_by_id(id).one(conn).await?.map(Record::from),
    })
}

async fn count_kind<C: ConnectionTrait>(conn: &C, kind: RecordKind) -> Result<u64, DbErr> {
    match kind {
        RecordKind::State => state::Entity::find().count(conn).await,
        RecordKind::City => city::Entity::find().count(conn).await,
        RecordKind::Amenity => amenity::Entity::find().count(conn).await,
        RecordKind::User => user::Entity::find().count(conn).await,
        RecordKind::Place => place::Entity::find().count(conn).await,
        RecordKind::Review => review::Entity::find().count(conn).await,
    }
}

async fn fetch_children<C: ConnectionTrait>(
    conn: &C,
    parent: RecordKind,
    parent_id: &str,
    kind: RecordKind,
) -> Result<Vec<Record>, DbErr> {
    let models: Vec<Record> = match (parent, kind) {
        (RecordKind::State, RecordKind::City) => city::Entity::find()
            .filter(city::Column::StateId.eq(parent_id))
            .all(conn)
            .await?
            .into_iter()
            .map(Record::from)
            .collect(),
        (RecordKind::City, RecordKind::Place) => place::Entity::find()
            .filter(place::Column::CityId.eq(parent_id))
            .all(conn)
            .await?
            .into_iter()
            .map(Record::from)
            .collect(),
        (RecordKind::User, RecordKind::Place) => place::Entity::find()
            .filter(place::Column::UserId.eq(parent_id))
            .all(conn)
            .await?
            .into_iter()
            .map(Record::from)
            .collect(),
        (RecordKind::Place, RecordKind::Review) => review::Entity::find()
            .filter(review::Column::PlaceId.eq(parent_id))
            .all(conn)
            .await?
            .into_iter()
            .map(Record::from)
            .collect(),
        (RecordKind::User, RecordKind::Review) => review::Entity::find()
            .filter(review::Column::UserId.eq(parent_id))
            .all(conn)
            .await?
            .into_iter()
            .map(Record::from)
            .collect(),
        _ => Vec::new(),
    };
    Ok(models)
}

async fn write_record<C: ConnectionTrait>(conn: &C, record: Record) -> Result<(), DbErr> {
    match record {
        Record::State(m) => upsert!(conn, state, m),
        Record::City(m) => upsert!(conn, city, m),
        Record::Amenity(m) => upsert!(conn, amenity, m),
        Record::User(m) => upsert!(conn, user, m),
        Record::Place(m) => upsert!(conn, place, m),
        Record::Review(m) => upsert!(conn, review, m),
    }
    Ok(())
}

async fn delete_record<C: ConnectionTrait>(conn: &C, kind: RecordKind, id: &str) -> Result<u64, DbErr> {
    let id = id.to_string();
    let res = match kind {
        RecordKind::State => state::Entity::delete_by_id(id).exec(conn).await?,
        RecordKind::City => city::Entity::delete_by_id(id).exec(conn).await?,
        RecordKind::Amenity => amenity::Entity::delete_by_id(id).exec(conn).await?,
        RecordKind::User => user::Entity::delete_by_id(id).exec(conn).await?,
        RecordKind::Place => place::Entity::delete_by_id(id).exec(conn).await?,
        RecordKind::Review => review::Entity::delete_by_id(id).exec(conn).await?,
    };
    Ok(res.rows_affected)
}

async fn fetch_all<C: ConnectionTrait>(
    conn: &C,
    kind: Option<RecordKind>,
) -> Result<BTreeMap<String, Record>, DbErr> {
    let kinds: Vec<RecordKind> = match kind {
        Some(k) => vec![k],
        None => RecordKind::ALL.to_vec(),
    };
    let mut out = BTreeMap::new();
    for k in kinds {
        for record in fetch_kind(conn, k).await? {
            out.insert(record.key(), record);
        }
    }
    Ok(out)
}

async fn count_all<C: ConnectionTrait>(conn: &C, kind: Option<RecordKind>) -> Result<u64, DbErr> {
    match kind {
        Some(k) => count_kind(conn, k).await,
        None => {
            let mut total = 0;
            for k in RecordKind::ALL {
                total += count_kind(conn, k).await?;
            }
            Ok(total)
        }
    }
}

#[async_trait]
impl Storage for DbStorage {
    async fn all(&self, kind: Option<RecordKind>) -> Result<BTreeMap<String, Record>, StorageError> {
        let session = self.session.lock().await;
        Ok(on_session!(session, conn => fetch_all(conn, kind).await?))
    }

    async fn get(&self, kind: RecordKind, id: &str) -> Result<Option<Record>, StorageError> {
        let session = self.session.lock().await;
        Ok(on_session!(session, conn => fetch_one(conn, kind, id).await?))
    }

    async fn count(&self, kind: Option<RecordKind>) -> Result<usize, StorageError> {
        let session = self.session.lock().await;
        let n = on_session!(session, conn => count_all(conn, kind).await?);
        Ok(n as usize)
    }

    async fn register(&self, record: Record) -> Result<(), StorageError> {
        let mut session = self.session.lock().await;
        let txn = session.begin().await?;
        let key = record.key();
        write_record(txn, record).await?;
        debug!(%key, "registered");
        Ok(())
    }

    async fn save(&self) -> Result<(), StorageError> {
        let mut session = self.session.lock().await;
        if session.db.is_none() {
            return Err(StorageError::Closed);
        }
        if let Some(txn) = session.txn.take() {
            txn.commit().await?;
            debug!("session committed");
        }
        Ok(())
    }

    async fn delete(&self, record: Option<&Record>) -> Result<(), StorageError> {
        let Some(record) = record else { return Ok(()) };
        let mut session = self.session.lock().await;
        let txn = session.begin().await?;
        let rows = delete_record(txn, record.kind(), record.id()).await?;
        debug!(key = %record.key(), existed = rows > 0, "deleted");
        Ok(())
    }

    async fn reload(&self) -> Result<(), StorageError> {
        let mut session = self.session.lock().await;
        if let Some(txn) = session.txn.take() {
            txn.rollback().await?;
            debug!("session rolled back");
        }
        let db = session.db.as_ref().ok_or(StorageError::Closed)?;
        db.ping().await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), StorageError> {
        let mut session = self.session.lock().await;
        if let Some(txn) = session.txn.take() {
            txn.rollback().await?;
        }
        if let Some(db) = session.db.take() {
            db.close().await?;
            info!("database storage closed");
        }
        Ok(())
    }

    async fn children(
        &self,
        parent: RecordKind,
        parent_id: &str,
        kind: RecordKind,
    ) -> Result<Vec<Record>, StorageError> {
        let session = self.session.lock().await;
        Ok(on_session!(session, conn => fetch_children(conn, parent, parent_id, kind).await?))
    }
}
