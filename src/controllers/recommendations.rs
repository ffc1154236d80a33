use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::controllers::catalog;
use crate::models::{Movie, RecommendationSearch};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/recommendations", post(recommend))
}

#[derive(Debug, Deserialize, Validate)]
struct RecommendRequest {
    city: String,
    #[validate(length(min = 1, max = 50))]
    genre: String,
}

// POST /api/recommendations
//
// Genre substring match scoped to the city. Non-empty results are logged to
// recommendation_searches for the admin view.
async fn recommend(
    State(state): State<Arc<AppState>>,
    _user: crate::middleware::AuthUser,
    Json(req): Json<RecommendRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    catalog::validate_city(&req.city)?;

    let movies = Movie::search_by_genre_in_city(&req.genre, &req.city, &state.db)
        .await
        .map_err(|e| {
            tracing::error!("recommend sql error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch recommendations".to_string())
        })?;

    if !movies.is_empty() {
        let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
        if let Err(e) = RecommendationSearch::log(&req.genre, &titles.join(","), &state.db).await {
            // The search result still stands; only the log write failed.
            tracing::error!("failed to log recommendation search: {:?}", e);
        }
    }

    Ok((StatusCode::OK, Json(movies)))
}
