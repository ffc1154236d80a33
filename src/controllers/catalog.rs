use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::models::{Movie, Theater};
use crate::AppState;

/// The cities the service operates in. City is an explicit request
/// parameter on every catalog route, never server-side session state.
pub const CITIES: [&str; 12] = [
    "Mumbai", "Delhi", "Bangalore", "Hyderabad", "Chennai", "Kolkata",
    "Pune", "Ahmedabad", "Jaipur", "Lucknow", "Kochi", "Indore",
];

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cities", get(get_cities))
        .route("/theaters", get(get_theaters))
        .route("/movies", get(get_movies))
}

pub fn validate_city(city: &str) -> Result<(), (StatusCode, String)> {
    if CITIES.contains(&city) {
        Ok(())
    } else {
        Err((StatusCode::BAD_REQUEST, "Please select a valid city".to_string()))
    }
}

// GET /api/cities
async fn get_cities() -> impl IntoResponse {
    Json(CITIES)
}

#[derive(Debug, Deserialize)]
struct CityQuery {
    city: String,
}

// GET /api/theaters?city=
async fn get_theaters(
    State(state): State<Arc<AppState>>,
    _user: crate::middleware::AuthUser,
    Query(params): Query<CityQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    validate_city(&params.city)?;

    let theaters = Theater::list_by_city(&params.city, &state.db)
        .await
        .map_err(|e| {
            tracing::error!("get_theaters sql error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch theaters".to_string())
        })?;

    Ok((StatusCode::OK, Json(theaters)))
}

// GET /api/movies?city=
async fn get_movies(
    State(state): State<Arc<AppState>>,
    _user: crate::middleware::AuthUser,
    Query(params): Query<CityQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    validate_city(&params.city)?;

    let movies = Movie::list_by_city(&params.city, &state.db)
        .await
        .map_err(|e| {
            tracing::error!("get_movies sql error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch movies".to_string())
        })?;

    Ok((StatusCode::OK, Json(movies)))
}
