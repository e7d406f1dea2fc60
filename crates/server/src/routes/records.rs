//! Kind-generic handler bodies shared by the per-collection route modules.

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

use models::{Fields, Record, RecordKind};
use service::records;

use crate::errors::JsonApiError;
use crate::extract::JsonBody;
use crate::routes::AppState;

pub type Body = Result<JsonBody, JsonApiError>;

fn dicts(found: Vec<Record>) -> Result<Json<Vec<Fields>>, JsonApiError> {
    let out = found.iter().map(Record::to_dict).collect::<Result<Vec<_>, _>>()?;
    Ok(Json(out))
}

fn dict(record: &Record) -> Result<Json<Fields>, JsonApiError> {
    Ok(Json(record.to_dict()?))
}

pub async fn list(app: &AppState, kind: RecordKind) -> Result<Json<Vec<Fields>>, JsonApiError> {
    dicts(records::list(app.storage.as_ref(), kind).await?)
}

pub async fn show(app: &AppState, kind: RecordKind, id: &str) -> Result<Json<Fields>, JsonApiError> {
    dict(&records::get(app.storage.as_ref(), kind, id).await?)
}

pub async fn create(app: &AppState, kind: RecordKind, body: Body) -> Result<(StatusCode, Json<Fields>), JsonApiError> {
    let JsonBody(fields) = body?;
    let created = records::create(app.storage.as_ref(), kind, &fields).await?;
    Ok((StatusCode::CREATED, dict(&created)?))
}

pub async fn list_under(
    app: &AppState,
    parent: RecordKind,
    parent_id: &str,
    kind: RecordKind,
) -> Result<Json<Vec<Fields>>, JsonApiError> {
    dicts(records::list_children(app.storage.as_ref(), parent, parent_id, kind).await?)
}

/// The parent is looked up before the body is inspected, so an unknown parent is a 404
/// even when the body is not JSON.
pub async fn create_under(
    app: &AppState,
    parent: RecordKind,
    parent_id: &str,
    kind: RecordKind,
    body: Body,
) -> Result<(StatusCode, Json<Fields>), JsonApiError> {
    let parent = records::get(app.storage.as_ref(), parent, parent_id).await?;
    let JsonBody(fields) = body?;
    let created = records::create_child(app.storage.as_ref(), &parent, kind, &fields).await?;
    Ok((StatusCode::CREATED, dict(&created)?))
}

pub async fn update(app: &AppState, kind: RecordKind, id: &str, body: Body) -> Result<Json<Fields>, JsonApiError> {
    let record = records::get(app.storage.as_ref(), kind, id).await?;
    let JsonBody(fields) = body?;
    dict(&records::update(app.storage.as_ref(), record, &fields).await?)
}

/// Responds with `{}`.
pub async fn remove(app: &AppState, kind: RecordKind, id: &str) -> Result<Json<Value>, JsonApiError> {
    records::delete(app.storage.as_ref(), kind, id).await?;
    Ok(Json(json!({})))
}
