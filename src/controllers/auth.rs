use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::models::User;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", get(login))
}

#[derive(Debug, Deserialize, Validate)]
struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    username: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 6, max = 128))]
    password: String,
}

// POST /api/auth/register
async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let db_error = |e: sqlx::Error| {
        tracing::error!("register sql error: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
    };

    if User::find_by_username(&req.username, &state.db)
        .await
        .map_err(db_error)?
        .is_some()
    {
        return Err((StatusCode::CONFLICT, "Username already exists".to_string()));
    }
    if User::find_by_email(&req.email, &state.db)
        .await
        .map_err(db_error)?
        .is_some()
    {
        return Err((StatusCode::CONFLICT, "Email already exists".to_string()));
    }

    let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
        .map_err(|e| {
            tracing::error!("register hash error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to register".to_string())
        })?;

    let user: User = sqlx::query_as(
        "INSERT INTO users (username, email, password_hash)
         VALUES ($1, $2, $3)
         RETURNING *",
    )
    .bind(&req.username)
    .bind(&req.email)
    .bind(&password_hash)
    .fetch_one(&state.db.pool)
    .await
    .map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(user)))
}

// GET /api/auth/login - Basic-auth round trip, returns the profile.
// Auth is stateless: every request carries credentials, there is no session.
async fn login(user: crate::middleware::AuthUser) -> impl IntoResponse {
    Json(serde_json::json!({
        "id": user.user_id,
        "username": user.username,
        "email": user.email,
    }))
}
