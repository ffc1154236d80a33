use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::middleware::AdminUser;
use crate::models::{Movie, RecommendationSearch, Theater};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/movies", post(add_movie))
        .route("/admin/movies/{id}", delete(remove_movie))
        .route("/admin/movies/search", post(search_movies))
        .route("/admin/recommendations", get(customer_recommendations))
        .route("/admin/theaters/prices", get(get_seat_prices))
        .route("/admin/theaters/prices", patch(update_seat_prices))
}

fn db_error(e: sqlx::Error) -> (StatusCode, String) {
    tracing::error!("admin sql error: {:?}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
}

/* ---------- MOVIES ---------- */

#[derive(Debug, Deserialize, Validate)]
struct AddMovieRequest {
    #[validate(length(min = 1, max = 100))]
    title: String,
    #[validate(length(min = 1, max = 50))]
    genre: String,
    /// Comma-joined showtime labels, e.g. "4:00 PM,7:00 PM,10:00 PM".
    #[validate(length(min = 1, max = 200))]
    showtimes: String,
    theater_id: i64,
    #[validate(length(min = 1, max = 200))]
    poster_url: String,
}

// POST /api/admin/movies
async fn add_movie(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(req): Json<AddMovieRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let theater_exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM theaters WHERE id = $1)",
    )
    .bind(req.theater_id)
    .fetch_one(&state.db.pool)
    .await
    .map_err(db_error)?;

    if !theater_exists {
        return Err((StatusCode::BAD_REQUEST, "Theater not found".to_string()));
    }

    let movie: Movie = sqlx::query_as(
        "INSERT INTO movies (title, genre, showtimes, theater_id, poster_url)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(&req.title)
    .bind(&req.genre)
    .bind(&req.showtimes)
    .bind(req.theater_id)
    .bind(&req.poster_url)
    .fetch_one(&state.db.pool)
    .await
    .map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(movie)))
}

// DELETE /api/admin/movies/{id}
//
// Bookings of the movie go with it (ON DELETE CASCADE).
async fn remove_movie(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let removed = sqlx::query("DELETE FROM movies WHERE id = $1")
        .bind(id)
        .execute(&state.db.pool)
        .await
        .map_err(db_error)?
        .rows_affected();

    if removed == 0 {
        return Err((StatusCode::NOT_FOUND, "Movie not found".to_string()));
    }

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({"message": "Movie removed successfully"})),
    ))
}

#[derive(Debug, Deserialize, Validate)]
struct SearchMoviesRequest {
    #[validate(length(min = 1, max = 50))]
    genre: String,
}

// POST /api/admin/movies/search - genre search across all cities
async fn search_movies(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(req): Json<SearchMoviesRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let movies = Movie::search_by_genre(&req.genre, &state.db)
        .await
        .map_err(db_error)?;
    Ok((StatusCode::OK, Json(movies)))
}

/* ---------- RECOMMENDATION LOG ---------- */

// GET /api/admin/recommendations - logged customer searches, newest first
async fn customer_recommendations(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let searches = RecommendationSearch::list_recent(&state.db)
        .await
        .map_err(db_error)?;
    Ok((StatusCode::OK, Json(searches)))
}

/* ---------- SEAT PRICES ---------- */

// GET /api/admin/theaters/prices
async fn get_seat_prices(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let theaters = Theater::list_all(&state.db).await.map_err(db_error)?;
    Ok((StatusCode::OK, Json(theaters)))
}

#[derive(Debug, Deserialize)]
struct TheaterPriceUpdate {
    theater_id: i64,
    classic_price: f64,
    premium_price: f64,
}

#[derive(Debug, Deserialize)]
struct UpdateSeatPricesRequest {
    prices: Vec<TheaterPriceUpdate>,
}

// PATCH /api/admin/theaters/prices - all updates in one transaction
async fn update_seat_prices(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(req): Json<UpdateSeatPricesRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    for update in &req.prices {
        if update.classic_price < 0.0 || update.premium_price < 0.0 {
            return Err((
                StatusCode::BAD_REQUEST,
                "Prices must be non-negative".to_string(),
            ));
        }
    }

    let mut tx = state.db.pool.begin().await.map_err(db_error)?;

    for update in &req.prices {
        let updated = sqlx::query(
            "UPDATE theaters SET classic_price = $1, premium_price = $2 WHERE id = $3",
        )
        .bind(update.classic_price)
        .bind(update.premium_price)
        .bind(update.theater_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?
        .rows_affected();

        if updated == 0 {
            let _ = tx.rollback().await;
            return Err((
                StatusCode::NOT_FOUND,
                format!("Theater {} not found", update.theater_id),
            ));
        }
    }

    tx.commit().await.map_err(db_error)?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({"message": "Seat prices updated successfully"})),
    ))
}
