use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Theater {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub classic_price: f64,
    pub premium_price: f64,
}

impl Theater {
    pub async fn list_all(db: &crate::database::Database) -> Result<Vec<Theater>, sqlx::Error> {
        sqlx::query_as::<_, Theater>("SELECT * FROM theaters ORDER BY id")
            .fetch_all(&db.pool)
            .await
    }

    pub async fn list_by_city(
        city: &str,
        db: &crate::database::Database,
    ) -> Result<Vec<Theater>, sqlx::Error> {
        sqlx::query_as::<_, Theater>("SELECT * FROM theaters WHERE location = $1 ORDER BY id")
            .bind(city)
            .fetch_all(&db.pool)
            .await
    }
}
