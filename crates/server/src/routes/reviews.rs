use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use models::{Fields, RecordKind};

use crate::errors::JsonApiError;
use crate::routes::{records, records::Body, AppState};

const KIND: RecordKind = RecordKind::Review;

#[utoipa::path(
    get, path = "/api/v1/reviews", tag = "reviews",
    responses((status = 200, description = "Every review", body = [crate::openapi::ReviewDoc]))
)]
pub async fn list(State(app): State<AppState>) -> Result<Json<Vec<Fields>>, JsonApiError> {
    records::list(&app, KIND).await
}

#[utoipa::path(
    get, path = "/api/v1/places/{place_id}/reviews", tag = "reviews",
    params(("place_id" = String, Path, description = "Place id")),
    responses(
        (status = 200, description = "Reviews of the place", body = [crate::openapi::ReviewDoc]),
        (status = 404, description = "Unknown place", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list_for_place(
    State(app): State<AppState>,
    Path(place_id): Path<String>,
) -> Result<Json<Vec<Fields>>, JsonApiError> {
    records::list_under(&app, RecordKind::Place, &place_id, KIND).await
}

#[utoipa::path(
    get, path = "/api/v1/reviews/{review_id}", tag = "reviews",
    params(("review_id" = String, Path, description = "Review id")),
    responses(
        (status = 200, description = "The review", body = crate::openapi::ReviewDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn show(State(app): State<AppState>, Path(review_id): Path<String>) -> Result<Json<Fields>, JsonApiError> {
    records::show(&app, KIND, &review_id).await
}

#[utoipa::path(
    post, path = "/api/v1/places/{place_id}/reviews", tag = "reviews",
    params(("place_id" = String, Path, description = "Place id")),
    request_body = crate::openapi::ReviewInput,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ReviewDoc),
        (status = 400, description = "Not a JSON / Missing user_id / Missing text", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Unknown place or user", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create_for_place(
    State(app): State<AppState>,
    Path(place_id): Path<String>,
    body: Body,
) -> Result<(StatusCode, Json<Fields>), JsonApiError> {
    records::create_under(&app, RecordKind::Place, &place_id, KIND, body).await
}

#[utoipa::path(
    put, path = "/api/v1/reviews/{review_id}", tag = "reviews",
    params(("review_id" = String, Path, description = "Review id")),
    request_body = crate::openapi::ReviewInput,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::ReviewDoc),
        (status = 400, description = "Not a JSON", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(app): State<AppState>,
    Path(review_id): Path<String>,
    body: Body,
) -> Result<Json<Fields>, JsonApiError> {
    records::update(&app, KIND, &review_id, body).await
}

#[utoipa::path(
    delete, path = "/api/v1/reviews/{review_id}", tag = "reviews",
    params(("review_id" = String, Path, description = "Review id")),
    responses(
        (status = 200, description = "Deleted, empty object"),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn remove(State(app): State<AppState>, Path(review_id): Path<String>) -> Result<Json<Value>, JsonApiError> {
    records::remove(&app, KIND, &review_id).await
}
