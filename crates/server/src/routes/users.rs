//! User routes. Responses never carry the password hash.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use models::{Fields, RecordKind};

use crate::errors::JsonApiError;
use crate::routes::{records, records::Body, AppState};

const KIND: RecordKind = RecordKind::User;

#[utoipa::path(
    get, path = "/api/v1/users", tag = "users",
    responses((status = 200, description = "Every user", body = [crate::openapi::UserDoc]))
)]
pub async fn list(State(app): State<AppState>) -> Result<Json<Vec<Fields>>, JsonApiError> {
    records::list(&app, KIND).await
}

#[utoipa::path(
    get, path = "/api/v1/users/{user_id}", tag = "users",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = crate::openapi::UserDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn show(State(app): State<AppState>, Path(user_id): Path<String>) -> Result<Json<Fields>, JsonApiError> {
    records::show(&app, KIND, &user_id).await
}

#[utoipa::path(
    post, path = "/api/v1/users", tag = "users",
    request_body = crate::openapi::UserInput,
    responses(
        (status = 201, description = "Created", body = crate::openapi::UserDoc),
        (status = 400, description = "Not a JSON / Missing email / Missing password", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(State(app): State<AppState>, body: Body) -> Result<(StatusCode, Json<Fields>), JsonApiError> {
    records::create(&app, KIND, body).await
}

/// `email` cannot be changed; a new `password` is hashed again.
#[utoipa::path(
    put, path = "/api/v1/users/{user_id}", tag = "users",
    params(("user_id" = String, Path, description = "User id")),
    request_body = crate::openapi::UserInput,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::UserDoc),
        (status = 400, description = "Not a JSON", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(app): State<AppState>,
    Path(user_id): Path<String>,
    body: Body,
) -> Result<Json<Fields>, JsonApiError> {
    records::update(&app, KIND, &user_id, body).await
}

#[utoipa::path(
    delete, path = "/api/v1/users/{user_id}", tag = "users",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Deleted, empty object"),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn remove(State(app): State<AppState>, Path(user_id): Path<String>) -> Result<Json<Value>, JsonApiError> {
    records::remove(&app, KIND, &user_id).await
}
