//! Database connection and schema bootstrap.
//!
//! Tables are created straight from the entity definitions (foreign keys included),
//! parents before children; there is no migration history.

use std::time::Duration;

use sea_orm::{
    sea_query::{Alias, ColumnDef, Table},
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr, EntityTrait, Schema,
    Statement,
};
use tracing::{debug, info};

use configs::DatabaseConfig;

use crate::{amenity, city, place, review, state, user};

pub async fn connect_with_config(cfg: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opt).await?;
    info!(backend = ?db.get_database_backend(), "database connected");
    Ok(db)
}

const TIMESTAMP_COLUMNS: [&str; 2] = ["created_at", "updated_at"];

/// DDL that ensures the table for `entity` exists.
///
/// MySQL maps `DateTimeUtc` to a bare `timestamp`, which drops the microseconds and
/// ends in 2038, so the timestamp columns are widened to `DATETIME(6)` there.
fn table_statements<E: EntityTrait>(backend: DbBackend, entity: E) -> Vec<Statement> {
    let mut create = Schema::new(backend).create_table_from_entity(entity);
    create.if_not_exists();
    let mut out = vec![backend.build(&create)];
    if backend == DbBackend::MySql {
        let mut alter = Table::alter();
        alter.table(entity);
        for column in TIMESTAMP_COLUMNS {
            alter.modify_column(ColumnDef::new(Alias::new(column)).custom(Alias::new("DATETIME(6)")).not_null());
        }
        out.push(backend.build(&alter));
    }
    out
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    for stmt in table_statements(db.get_database_backend(), entity) {
        db.execute(stmt).await?;
    }
    debug!(table = entity.table_name(), "table ensured");
    Ok(())
}

async fn drop_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let stmt = Table::drop().table(entity).if_exists().to_owned();
    db.execute(backend.build(&stmt)).await?;
    debug!(table = entity.table_name(), "table dropped");
    Ok(())
}

/// Create every table that does not exist yet.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, state::Entity).await?;
    create_table(db, city::Entity).await?;
    create_table(db, amenity::Entity).await?;
    create_table(db, user::Entity).await?;
    create_table(db, place::Entity).await?;
    create_table(db, review::Entity).await?;
    Ok(())
}

/// Drop every table, children first.
pub async fn drop_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    drop_table(db, review::Entity).await?;
    drop_table(db, place::Entity).await?;
    drop_table(db, user::Entity).await?;
    drop_table(db, amenity::Entity).await?;
    drop_table(db, city::Entity).await?;
    drop_table(db, state::Entity).await?;
    Ok(())
}
