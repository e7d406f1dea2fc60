use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use models::{Fields, RecordKind};

use crate::errors::JsonApiError;
use crate::routes::{records, records::Body, AppState};

const KIND: RecordKind = RecordKind::State;

#[utoipa::path(
    get, path = "/api/v1/states", tag = "states",
    responses((status = 200, description = "Every state", body = [crate::openapi::StateDoc]))
)]
pub async fn list(State(app): State<AppState>) -> Result<Json<Vec<Fields>>, JsonApiError> {
    records::list(&app, KIND).await
}

#[utoipa::path(
    get, path = "/api/v1/states/{state_id}", tag = "states",
    params(("state_id" = String, Path, description = "State id")),
    responses(
        (status = 200, description = "The state", body = crate::openapi::StateDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn show(State(app): State<AppState>, Path(state_id): Path<String>) -> Result<Json<Fields>, JsonApiError> {
    records::show(&app, KIND, &state_id).await
}

#[utoipa::path(
    post, path = "/api/v1/states", tag = "states",
    request_body = crate::openapi::NameInput,
    responses(
        (status = 201, description = "Created", body = crate::openapi::StateDoc),
        (status = 400, description = "Not a JSON / Missing name", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(State(app): State<AppState>, body: Body) -> Result<(StatusCode, Json<Fields>), JsonApiError> {
    records::create(&app, KIND, body).await
}

#[utoipa::path(
    put, path = "/api/v1/states/{state_id}", tag = "states",
    params(("state_id" = String, Path, description = "State id")),
    request_body = crate::openapi::NameInput,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::StateDoc),
        (status = 400, description = "Not a JSON", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(app): State<AppState>,
    Path(state_id): Path<String>,
    body: Body,
) -> Result<Json<Fields>, JsonApiError> {
    records::update(&app, KIND, &state_id, body).await
}

/// Deleting a state deletes its cities, and their places and reviews.
#[utoipa::path(
    delete, path = "/api/v1/states/{state_id}", tag = "states",
    params(("state_id" = String, Path, description = "State id")),
    responses(
        (status = 200, description = "Deleted, empty object"),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn remove(State(app): State<AppState>, Path(state_id): Path<String>) -> Result<Json<Value>, JsonApiError> {
    records::remove(&app, KIND, &state_id).await
}
