use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub genre: String,
    /// Comma-joined showtime labels, e.g. "4:00 PM,7:00 PM,10:00 PM".
    pub showtimes: String,
    pub theater_id: i64,
    pub poster_url: String,
}

impl Movie {
    pub async fn find_by_id(
        id: i64,
        db: &crate::database::Database,
    ) -> Result<Option<Movie>, sqlx::Error> {
        sqlx::query_as::<_, Movie>("SELECT * FROM movies WHERE id = $1")
            .bind(id)
            .fetch_optional(&db.pool)
            .await
    }

    pub async fn list_by_city(
        city: &str,
        db: &crate::database::Database,
    ) -> Result<Vec<Movie>, sqlx::Error> {
        sqlx::query_as::<_, Movie>(
            "SELECT m.* FROM movies m
             JOIN theaters t ON t.id = m.theater_id
             WHERE t.location = $1
             ORDER BY m.id",
        )
        .bind(city)
        .fetch_all(&db.pool)
        .await
    }

    /// Genre is a comma-joined tag list; match is a case-insensitive substring,
    /// scoped to theaters in the given city.
    pub async fn search_by_genre_in_city(
        genre: &str,
        city: &str,
        db: &crate::database::Database,
    ) -> Result<Vec<Movie>, sqlx::Error> {
        sqlx::query_as::<_, Movie>(
            "SELECT m.* FROM movies m
             JOIN theaters t ON t.id = m.theater_id
             WHERE m.genre ILIKE '%' || $1 || '%' AND t.location = $2
             ORDER BY m.id",
        )
        .bind(genre)
        .bind(city)
        .fetch_all(&db.pool)
        .await
    }

    pub async fn search_by_genre(
        genre: &str,
        db: &crate::database::Database,
    ) -> Result<Vec<Movie>, sqlx::Error> {
        sqlx::query_as::<_, Movie>(
            "SELECT * FROM movies WHERE genre ILIKE '%' || $1 || '%' ORDER BY id",
        )
        .bind(genre)
        .fetch_all(&db.pool)
        .await
    }

    /// The individual showtime labels of this movie.
    pub fn showtime_labels(&self) -> Vec<&str> {
        self.showtimes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie_with_showtimes(showtimes: &str) -> Movie {
        Movie {
            id: 1,
            title: "Inception".to_string(),
            genre: "Sci-Fi, Thriller".to_string(),
            showtimes: showtimes.to_string(),
            theater_id: 1,
            poster_url: "images/inception.jpg".to_string(),
        }
    }

    #[test]
    fn showtime_labels_split_and_trim() {
        let movie = movie_with_showtimes("4:00 PM, 7:00 PM ,10:00 PM");
        assert_eq!(movie.showtime_labels(), vec!["4:00 PM", "7:00 PM", "10:00 PM"]);
    }

    #[test]
    fn showtime_labels_skip_empty_segments() {
        let movie = movie_with_showtimes("4:00 PM,,7:00 PM,");
        assert_eq!(movie.showtime_labels(), vec!["4:00 PM", "7:00 PM"]);
    }
}
