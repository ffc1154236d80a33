use std::collections::BTreeSet;

use redis::AsyncCommands;
use tracing::debug;

use crate::cache::CacheService;
use crate::services::availability::{self, AvailabilityError, PgBookingStore};

fn show_key(movie_id: i64, showtime: &str) -> String {
    format!("booked_seats:{}:{}", movie_id, showtime)
}

impl CacheService {
    /// The occupied seat set for a show, cache-first with DB fallback.
    ///
    /// A cache failure falls through to the database; a database failure
    /// propagates. Never degrades to an empty set on error.
    pub async fn get_booked_seats(
        &self,
        movie_id: i64,
        showtime: &str,
    ) -> Result<BTreeSet<String>, AvailabilityError> {
        if let Ok(Some(seats)) = self.get_seats_from_cache(movie_id, showtime).await {
            return Ok(seats);
        }

        let store = PgBookingStore::new(self.db.pool.clone());
        let seats = availability::list_booked_seats(&store, movie_id, showtime).await?;
        let _ = self.save_seats_to_cache(movie_id, showtime, &seats).await;
        Ok(seats)
    }

    /// Drops the cached set for a show. Called after every booking insert.
    pub async fn invalidate_booked_seats(&self, movie_id: i64, showtime: &str) {
        let mut conn = self.redis.conn.clone();
        let result: Result<(), _> = conn.del(show_key(movie_id, showtime)).await;
        if let Err(e) = result {
            debug!("failed to invalidate booked seats cache: {:?}", e);
        }
    }

    async fn get_seats_from_cache(
        &self,
        movie_id: i64,
        showtime: &str,
    ) -> Result<Option<BTreeSet<String>>, redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        let data: Option<String> = conn.get(show_key(movie_id, showtime)).await?;
        match data {
            Some(json) => {
                let seats: BTreeSet<String> = serde_json::from_str(&json).map_err(|_| {
                    redis::RedisError::from((redis::ErrorKind::TypeError, "Parse error"))
                })?;
                Ok(Some(seats))
            }
            None => Ok(None),
        }
    }

    async fn save_seats_to_cache(
        &self,
        movie_id: i64,
        showtime: &str,
        seats: &BTreeSet<String>,
    ) -> Result<(), redis::RedisError> {
        let data = serde_json::to_string(seats).map_err(|_| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "Serialize error"))
        })?;
        let mut conn = self.redis.conn.clone();
        conn.set_ex(show_key(movie_id, showtime), data, self.seats_ttl)
            .await
    }
}
