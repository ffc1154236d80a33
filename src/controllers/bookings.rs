use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{Booking, Movie};
use crate::services::availability::{
    self, AvailabilityError, AvailabilityResult, PgBookingStore,
};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/seats/booked", get(get_booked_seats))
        .route("/bookings", post(create_booking))
        .route("/bookings", get(get_user_bookings))
        .route("/bookings/{id}", get(get_booking))
}

/* ---------- helpers ---------- */

fn availability_error_response(e: AvailabilityError) -> (StatusCode, String) {
    match e {
        AvailabilityError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        AvailabilityError::Unavailable(e) => {
            tracing::error!("availability check failed: {:?}", e);
            // Fail closed: a fetch failure is never treated as available.
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Seat availability could not be determined".to_string(),
            )
        }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn conflict_response(conflicts: impl IntoIterator<Item = String>) -> Response {
    let conflicts: Vec<String> = conflicts.into_iter().collect();
    (
        StatusCode::CONFLICT,
        Json(serde_json::json!({
            "error": "One or more selected seats are already booked",
            "conflicts": conflicts,
        })),
    )
        .into_response()
}

/* ---------- SEATS ---------- */

#[derive(Debug, Deserialize)]
struct BookedSeatsQuery {
    movie_id: i64,
    showtime: String,
}

// GET /api/seats/booked - occupied seats of a show, for seat-map rendering
async fn get_booked_seats(
    State(state): State<Arc<AppState>>,
    _user: crate::middleware::AuthUser,
    Query(params): Query<BookedSeatsQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if params.movie_id <= 0 {
        return Err((StatusCode::BAD_REQUEST, "movie_id must be > 0".to_string()));
    }

    let seats = state
        .cache
        .get_booked_seats(params.movie_id, &params.showtime)
        .await
        .map_err(availability_error_response)?;

    Ok((StatusCode::OK, Json(seats)))
}

/* ---------- BOOKINGS ---------- */

#[derive(Debug, Deserialize)]
struct CreateBookingRequest {
    movie_id: i64,
    showtime: String,
    seats: Vec<String>,
    total_price: f64,
}

#[derive(Debug, Serialize)]
struct BookingResponse {
    #[serde(flatten)]
    booking: Booking,
    seats: Vec<String>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        let seats = booking.seat_list().iter().map(|s| s.to_string()).collect();
        BookingResponse { booking, seats }
    }
}

// POST /api/bookings
//
// Availability pre-check first, then insert inside a transaction. The unique
// index on booking_seats(movie_id, showtime, seat_label) is what actually
// prevents two racing requests from committing the same seat; a 23505 from
// the insert is reported the same way as a pre-check conflict.
async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: crate::middleware::AuthUser,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Response, (StatusCode, String)> {
    if req.movie_id <= 0 {
        return Err((StatusCode::BAD_REQUEST, "movie_id must be > 0".to_string()));
    }
    if req.total_price < 0.0 || !req.total_price.is_finite() {
        return Err((
            StatusCode::BAD_REQUEST,
            "total_price must be non-negative".to_string(),
        ));
    }

    let movie = Movie::find_by_id(req.movie_id, &state.db)
        .await
        .map_err(|e| {
            tracing::error!("create_booking movie lookup error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
        })?
        .ok_or((StatusCode::NOT_FOUND, "Movie not found".to_string()))?;

    if !movie.showtime_labels().contains(&req.showtime.as_str()) {
        return Err((
            StatusCode::BAD_REQUEST,
            "showtime is not offered for this movie".to_string(),
        ));
    }

    let store = PgBookingStore::new(state.db.pool.clone());
    let outcome = availability::check_availability(&store, req.movie_id, &req.showtime, &req.seats)
        .await
        .map_err(availability_error_response)?;

    let seats = match outcome {
        AvailabilityResult::Conflict(conflicts) => {
            return Ok(conflict_response(conflicts));
        }
        AvailabilityResult::Available => availability::normalize_seat_labels(&req.seats),
    };

    let mut tx = state.db.pool.begin().await.map_err(|e| {
        tracing::error!("create_booking begin tx error: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
    })?;

    let seat_labels: Vec<String> = seats.iter().cloned().collect();
    let booking: Booking = sqlx::query_as(
        "INSERT INTO bookings (movie_id, user_id, seat_labels, showtime, total_price)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(req.movie_id)
    .bind(user.user_id)
    .bind(seat_labels.join(","))
    .bind(&req.showtime)
    .bind(req.total_price)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("create_booking insert error: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create booking".to_string())
    })?;

    for seat in &seat_labels {
        let inserted = sqlx::query(
            "INSERT INTO booking_seats (booking_id, movie_id, showtime, seat_label)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(booking.id)
        .bind(req.movie_id)
        .bind(&req.showtime)
        .bind(seat)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            let _ = tx.rollback().await;
            if is_unique_violation(&e) {
                // Lost the race since the pre-check: another booking committed
                // this seat. Re-read so the response carries every collision.
                return match availability::check_availability(
                    &store,
                    req.movie_id,
                    &req.showtime,
                    &seat_labels,
                )
                .await
                {
                    Ok(AvailabilityResult::Conflict(conflicts)) => {
                        Ok(conflict_response(conflicts))
                    }
                    _ => Ok(conflict_response([seat.clone()])),
                };
            }
            tracing::error!("create_booking seat insert error: {:?}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create booking".to_string(),
            ));
        }
    }

    tx.commit().await.map_err(|e| {
        tracing::error!("create_booking commit error: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create booking".to_string())
    })?;

    state
        .cache
        .invalidate_booked_seats(req.movie_id, &req.showtime)
        .await;

    Ok((StatusCode::CREATED, Json(BookingResponse::from(booking))).into_response())
}

// GET /api/bookings - the caller's bookings, newest first
async fn get_user_bookings(
    State(state): State<Arc<AppState>>,
    user: crate::middleware::AuthUser,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let bookings = Booking::list_by_user(user.user_id, &state.db)
        .await
        .map_err(|e| {
            tracing::error!("get_user_bookings sql error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch bookings".to_string())
        })?;

    let payload: Vec<BookingResponse> = bookings.into_iter().map(BookingResponse::from).collect();
    Ok((StatusCode::OK, Json(payload)))
}

// GET /api/bookings/{id} - confirmation view, owner only
async fn get_booking(
    State(state): State<Arc<AppState>>,
    user: crate::middleware::AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let booking = Booking::find_by_id(id, &state.db)
        .await
        .map_err(|e| {
            tracing::error!("get_booking sql error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch booking".to_string())
        })?
        .ok_or((StatusCode::NOT_FOUND, "Booking not found".to_string()))?;

    if booking.user_id != user.user_id {
        return Err((
            StatusCode::FORBIDDEN,
            "You are not authorized to view this booking".to_string(),
        ));
    }

    let movie = Movie::find_by_id(booking.movie_id, &state.db)
        .await
        .map_err(|e| {
            tracing::error!("get_booking movie lookup error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch booking".to_string())
        })?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "booking": BookingResponse::from(booking),
            "movie": movie,
        })),
    ))
}
