use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use models::{Fields, RecordKind};

use crate::errors::JsonApiError;
use crate::routes::{records, records::Body, AppState};

const KIND: RecordKind = RecordKind::Amenity;

#[utoipa::path(
    get, path = "/api/v1/amenities", tag = "amenities",
    responses((status = 200, description = "Every amenity", body = [crate::openapi::AmenityDoc]))
)]
pub async fn list(State(app): State<AppState>) -> Result<Json<Vec<Fields>>, JsonApiError> {
    records::list(&app, KIND).await
}

#[utoipa::path(
    get, path = "/api/v1/amenities/{amenity_id}", tag = "amenities",
    params(("amenity_id" = String, Path, description = "Amenity id")),
    responses(
        (status = 200, description = "The amenity", body = crate::openapi::AmenityDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn show(State(app): State<AppState>, Path(amenity_id): Path<String>) -> Result<Json<Fields>, JsonApiError> {
    records::show(&app, KIND, &amenity_id).await
}

#[utoipa::path(
    post, path = "/api/v1/amenities", tag = "amenities",
    request_body = crate::openapi::NameInput,
    responses(
        (status = 201, description = "Created", body = crate::openapi::AmenityDoc),
        (status = 400, description = "Not a JSON / Missing name", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(State(app): State<AppState>, body: Body) -> Result<(StatusCode, Json<Fields>), JsonApiError> {
    records::create(&app, KIND, body).await
}

#[utoipa::path(
    put, path = "/api/v1/amenities/{amenity_id}", tag = "amenities",
    params(("amenity_id" = String, Path, description = "Amenity id")),
    request_body = crate::openapi::NameInput,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::AmenityDoc),
        (status = 400, description = "Not a JSON", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(app): State<AppState>,
    Path(amenity_id): Path<String>,
    body: Body,
) -> Result<Json<Fields>, JsonApiError> {
    records::update(&app, KIND, &amenity_id, body).await
}

#[utoipa::path(
    delete, path = "/api/v1/amenities/{amenity_id}", tag = "amenities",
    params(("amenity_id" = String, Path, description = "Amenity id")),
    responses(
        (status = 200, description = "Deleted, empty object"),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn remove(State(app): State<AppState>, Path(amenity_id): Path<String>) -> Result<Json<Value>, JsonApiError> {
    records::remove(&app, KIND, &amenity_id).await
}
