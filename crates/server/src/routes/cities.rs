use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use models::{Fields, RecordKind};

use crate::errors::JsonApiError;
use crate::routes::{records, records::Body, AppState};

const KIND: RecordKind = RecordKind::City;

#[utoipa::path(
    get, path = "/api/v1/cities", tag = "cities",
    responses((status = 200, description = "Every city", body = [crate::openapi::CityDoc]))
)]
pub async fn list(State(app): State<AppState>) -> Result<Json<Vec<Fields>>, JsonApiError> {
    records::list(&app, KIND).await
}

#[utoipa::path(
    get, path = "/api/v1/states/{state_id}/cities", tag = "cities",
    params(("state_id" = String, Path, description = "State id")),
    responses(
        (status = 200, description = "Cities of the state", body = [crate::openapi::CityDoc]),
        (status = 404, description = "Unknown state", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list_in_state(
    State(app): State<AppState>,
    Path(state_id): Path<String>,
) -> Result<Json<Vec<Fields>>, JsonApiError> {
    records::list_under(&app, RecordKind::State, &state_id, KIND).await
}

#[utoipa::path(
    get, path = "/api/v1/cities/{city_id}", tag = "cities",
    params(("city_id" = String, Path, description = "City id")),
    responses(
        (status = 200, description = "The city", body = crate::openapi::CityDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn show(State(app): State<AppState>, Path(city_id): Path<String>) -> Result<Json<Fields>, JsonApiError> {
    records::show(&app, KIND, &city_id).await
}

#[utoipa::path(
    post, path = "/api/v1/states/{state_id}/cities", tag = "cities",
    params(("state_id" = String, Path, description = "State id")),
    request_body = crate::openapi::NameInput,
    responses(
        (status = 201, description = "Created", body = crate::openapi::CityDoc),
        (status = 400, description = "Not a JSON / Missing name", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Unknown state", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create_in_state(
    State(app): State<AppState>,
    Path(state_id): Path<String>,
    body: Body,
) -> Result<(StatusCode, Json<Fields>), JsonApiError> {
    records::create_under(&app, RecordKind::State, &state_id, KIND, body).await
}

#[utoipa::path(
    put, path = "/api/v1/cities/{city_id}", tag = "cities",
    params(("city_id" = String, Path, description = "City id")),
    request_body = crate::openapi::NameInput,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::CityDoc),
        (status = 400, description = "Not a JSON", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(app): State<AppState>,
    Path(city_id): Path<String>,
    body: Body,
) -> Result<Json<Fields>, JsonApiError> {
    records::update(&app, KIND, &city_id, body).await
}

#[utoipa::path(
    delete, path = "/api/v1/cities/{city_id}", tag = "cities",
    params(("city_id" = String, Path, description = "City id")),
    responses(
        (status = 200, description = "Deleted, empty object"),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn remove(State(app): State<AppState>, Path(city_id): Path<String>) -> Result<Json<Value>, JsonApiError> {
    records::remove(&app, KIND, &city_id).await
}
