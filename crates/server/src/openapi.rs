use axum::Json;
use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct StatusDoc { pub status: String }

#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String }

#[derive(ToSchema)]
pub struct StatsDoc {
    pub amenities: usize,
    pub cities: usize,
    pub places: usize,
    pub reviews: usize,
    pub states: usize,
    pub users: usize,
}

#[derive(ToSchema)]
pub struct NameInput { pub name: String }

#[derive(ToSchema)]
pub struct UserInput {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(ToSchema)]
pub struct PlaceInput {
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub number_rooms: Option<i32>,
    pub number_bathrooms: Option<i32>,
    pub max_guest: Option<i32>,
    pub price_by_night: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(ToSchema)]
pub struct ReviewInput { pub user_id: String, pub text: String }

#[derive(Serialize, ToSchema)]
pub struct StateDoc {
    pub id: String,
    #[serde(rename = "__class__")]
    pub class: String,
    pub created_at: String,
    pub updated_at: String,
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct CityDoc {
    pub id: String,
    #[serde(rename = "__class__")]
    pub class: String,
    pub created_at: String,
    pub updated_at: String,
    pub state_id: String,
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct AmenityDoc {
    pub id: String,
    #[serde(rename = "__class__")]
    pub class: String,
    pub created_at: String,
    pub updated_at: String,
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserDoc {
    pub id: String,
    #[serde(rename = "__class__")]
    pub class: String,
    pub created_at: String,
    pub updated_at: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PlaceDoc {
    pub id: String,
    #[serde(rename = "__class__")]
    pub class: String,
    pub created_at: String,
    pub updated_at: String,
    pub city_id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub number_rooms: i32,
    pub number_bathrooms: i32,
    pub max_guest: i32,
    pub price_by_night: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Serialize, ToSchema)]
pub struct ReviewDoc {
    pub id: String,
    #[serde(rename = "__class__")]
    pub class: String,
    pub created_at: String,
    pub updated_at: String,
    pub place_id: String,
    pub user_id: String,
    pub text: String,
}

#[derive(OpenApi)]
#[openapi(
    info(title = "HBnB API", description = "CRUD over states, cities, places, reviews, users and amenities"),
    paths(
        crate::routes::index::status,
        crate::routes::index::stats,
        crate::routes::states::list,
        crate::routes::states::show,
        crate::routes::states::create,
        crate::routes::states::update,
        crate::routes::states::remove,
        crate::routes::cities::list,
        crate::routes::cities::list_in_state,
        crate::routes::cities::show,
        crate::routes::cities::create_in_state,
        crate::routes::cities::update,
        crate::routes::cities::remove,
        crate::routes::places::list,
        crate::routes::places::list_in_city,
        crate::routes::places::show,
        crate::routes::places::create_in_city,
        crate::routes::places::update,
        crate::routes::places::remove,
        crate::routes::reviews::list,
        crate::routes::reviews::list_for_place,
        crate::routes::reviews::show,
        crate::routes::reviews::create_for_place,
        crate::routes::reviews::update,
        crate::routes::reviews::remove,
        crate::routes::users::list,
        crate::routes::users::show,
        crate::routes::users::create,
        crate::routes::users::update,
        crate::routes::users::remove,
        crate::routes::amenities::list,
        crate::routes::amenities::show,
        crate::routes::amenities::create,
        crate::routes::amenities::update,
        crate::routes::amenities::remove,
    ),
    components(
        schemas(
            StatusDoc,
            ErrorDoc,
            StatsDoc,
            NameInput,
            UserInput,
            PlaceInput,
            ReviewInput,
            StateDoc,
            CityDoc,
            AmenityDoc,
            UserDoc,
            PlaceDoc,
            ReviewDoc,
        )
    ),
    tags(
        (name = "index"),
        (name = "states"),
        (name = "cities"),
        (name = "places"),
        (name = "reviews"),
        (name = "users"),
        (name = "amenities")
    )
)]
pub struct ApiDoc;

/// `GET /apispec_1.json`
pub async fn apispec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
