use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

/// One logged genre search with the comma-joined titles it returned.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecommendationSearch {
    pub id: i64,
    pub genre: String,
    pub recommended_movies: String,
    pub searched_at: NaiveDateTime,
}

impl RecommendationSearch {
    pub async fn log(
        genre: &str,
        recommended_movies: &str,
        db: &crate::database::Database,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO recommendation_searches (genre, recommended_movies) VALUES ($1, $2)",
        )
        .bind(genre)
        .bind(recommended_movies)
        .execute(&db.pool)
        .await?;
        Ok(())
    }

    pub async fn list_recent(
        db: &crate::database::Database,
    ) -> Result<Vec<RecommendationSearch>, sqlx::Error> {
        sqlx::query_as::<_, RecommendationSearch>(
            "SELECT * FROM recommendation_searches ORDER BY searched_at DESC",
        )
        .fetch_all(&db.pool)
        .await
    }
}
