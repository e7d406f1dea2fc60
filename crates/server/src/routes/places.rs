use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use models::{Fields, RecordKind};

use crate::errors::JsonApiError;
use crate::routes::{records, records::Body, AppState};

const KIND: RecordKind = RecordKind::Place;

#[utoipa::path(
    get, path = "/api/v1/places", tag = "places",
    responses((status = 200, description = "Every place", body = [crate::openapi::PlaceDoc]))
)]
pub async fn list(State(app): State<AppState>) -> Result<Json<Vec<Fields>>, JsonApiError> {
    records::list(&app, KIND).await
}

#[utoipa::path(
    get, path = "/api/v1/cities/{city_id}/places", tag = "places",
    params(("city_id" = String, Path, description = "City id")),
    responses(
        (status = 200, description = "Places in the city", body = [crate::openapi::PlaceDoc]),
        (status = 404, description = "Unknown city", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list_in_city(
    State(app): State<AppState>,
    Path(city_id): Path<String>,
) -> Result<Json<Vec<Fields>>, JsonApiError> {
    records::list_under(&app, RecordKind::City, &city_id, KIND).await
}

#[utoipa::path(
    get, path = "/api/v1/places/{place_id}", tag = "places",
    params(("place_id" = String, Path, description = "Place id")),
    responses(
        (status = 200, description = "The place", body = crate::openapi::PlaceDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn show(State(app): State<AppState>, Path(place_id): Path<String>) -> Result<Json<Fields>, JsonApiError> {
    records::show(&app, KIND, &place_id).await
}

/// `user_id` must name an existing user.
#[utoipa::path(
    post, path = "/api/v1/cities/{city_id}/places", tag = "places",
    params(("city_id" = String, Path, description = "City id")),
    request_body = crate::openapi::PlaceInput,
    responses(
        (status = 201, description = "Created", body = crate::openapi::PlaceDoc),
        (status = 400, description = "Not a JSON / Missing user_id / Missing name", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Unknown city or user", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create_in_city(
    State(app): State<AppState>,
    Path(city_id): Path<String>,
    body: Body,
) -> Result<(StatusCode, Json<Fields>), JsonApiError> {
    records::create_under(&app, RecordKind::City, &city_id, KIND, body).await
}

#[utoipa::path(
    put, path = "/api/v1/places/{place_id}", tag = "places",
    params(("place_id" = String, Path, description = "Place id")),
    request_body = crate::openapi::PlaceInput,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::PlaceDoc),
        (status = 400, description = "Not a JSON / Invalid field", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(app): State<AppState>,
    Path(place_id): Path<String>,
    body: Body,
) -> Result<Json<Fields>, JsonApiError> {
    records::update(&app, KIND, &place_id, body).await
}

#[utoipa::path(
    delete, path = "/api/v1/places/{place_id}", tag = "places",
    params(("place_id" = String, Path, description = "Place id")),
    responses(
        (status = 200, description = "Deleted, empty object"),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn remove(State(app): State<AppState>, Path(place_id): Path<String>) -> Result<Json<Value>, JsonApiError> {
    records::remove(&app, KIND, &place_id).await
}
