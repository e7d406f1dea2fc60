use std::collections::BTreeMap;

use axum::{extract::State, Json};
use common::types::Status;
use service::records;

use crate::errors::JsonApiError;
use crate::routes::AppState;

#[utoipa::path(
    get, path = "/api/v1/status", tag = "index",
    responses((status = 200, description = "API is up", body = crate::openapi::StatusDoc))
)]
pub async fn status() -> Json<Status> {
    Json(Status::ok())
}

#[utoipa::path(
    get, path = "/api/v1/stats", tag = "index",
    responses(
        (status = 200, description = "Number of records per collection", body = crate::openapi::StatsDoc),
        (status = 500, description = "Storage failure", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn stats(State(app): State<AppState>) -> Result<Json<BTreeMap<&'static str, usize>>, JsonApiError> {
    Ok(Json(records::stats(app.storage.as_ref()).await?))
}
