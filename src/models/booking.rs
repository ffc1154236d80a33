use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

/// A committed booking. Immutable once written: there is no update or
/// cancel path.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: i64,
    pub movie_id: i64,
    pub user_id: i64,
    /// Comma-joined seat labels, kept for display; booking_seats holds the
    /// normalized rows the uniqueness constraint lives on.
    pub seat_labels: String,
    pub showtime: String,
    pub total_price: f64,
    pub created_at: NaiveDateTime,
}

impl Booking {
    pub async fn find_by_id(
        id: i64,
        db: &crate::database::Database,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&db.pool)
            .await
    }

    pub async fn list_by_user(
        user_id: i64,
        db: &crate::database::Database,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&db.pool)
        .await
    }

    pub fn seat_list(&self) -> Vec<&str> {
        self.seat_labels
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}
