use crate::{database::Database, redis_client::RedisClient};
use tracing::info;

pub mod seats;

#[derive(Clone)]
pub struct CacheService {
    redis: RedisClient,
    db: Database,
    seats_ttl: u64,
}

impl CacheService {
    pub fn new(redis: RedisClient, db: Database, seats_ttl: u64) -> Self {
        Self {
            redis,
            db,
            seats_ttl,
        }
    }

    // Cache warmup at startup: preload the booked-seat set of every show
    // that already has bookings.
    pub async fn warmup_cache(&self) {
        info!("Starting cache warmup...");

        let shows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT DISTINCT movie_id, showtime FROM booking_seats",
        )
        .fetch_all(&self.db.pool)
        .await
        .unwrap_or_default();

        for (movie_id, showtime) in &shows {
            let _ = self.get_booked_seats(*movie_id, showtime).await;
        }

        info!("Cache warmup done ({} shows)", shows.len());
    }
}
