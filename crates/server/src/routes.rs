use std::sync::Arc;

use axum::{routing::get, Router};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use service::storage::Storage;

use crate::errors::JsonApiError;

pub mod amenities;
pub mod cities;
pub mod index;
pub mod places;
pub mod records;
pub mod reviews;
pub mod states;
pub mod users;

/// Shared handler state: the one store opened at start-up.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

async fn not_found() -> JsonApiError {
    JsonApiError::not_found()
}

/// `/api/v1` routes: status, stats and CRUD for every collection.
fn api_v1() -> Router<AppState> {
    Router::new()
        .route("/status", get(index::status))
        .route("/stats", get(index::stats))
        .route("/states", get(states::list).post(states::create))
        .route("/states/:state_id", get(states::show).put(states::update).delete(states::remove))
        .route("/states/:state_id/cities", get(cities::list_in_state).post(cities::create_in_state))
        .route("/cities", get(cities::list))
        .route("/cities/:city_id", get(cities::show).put(cities::update).delete(cities::remove))
        .route("/cities/:city_id/places", get(places::list_in_city).post(places::create_in_city))
        .route("/places", get(places::list))
        .route("/places/:place_id", get(places::show).put(places::update).delete(places::remove))
        .route("/places/:place_id/reviews", get(reviews::list_for_place).post(reviews::create_for_place))
        .route("/reviews", get(reviews::list))
        .route("/reviews/:review_id", get(reviews::show).put(reviews::update).delete(reviews::remove))
        .route("/users", get(users::list).post(users::create))
        .route("/users/:user_id", get(users::show).put(users::update).delete(users::remove))
        .route("/amenities", get(amenities::list).post(amenities::create))
        .route("/amenities/:amenity_id", get(amenities::show).put(amenities::update).delete(amenities::remove))
}

/// Build the full application router.
///
/// At most `max_concurrent` requests are in flight at once; with 1 each request,
/// storage I/O included, finishes before the next one starts.
pub fn build_router(state: AppState, cors: CorsLayer, max_concurrent: usize) -> Router {
    Router::new()
        .nest("/api/v1", api_v1())
        .route("/apispec_1.json", get(crate::openapi::apispec))
        .fallback(not_found)
        .with_state(state)
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent.max(1)))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status code and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
