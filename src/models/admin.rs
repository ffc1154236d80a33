use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl Admin {
    pub async fn find_by_username(
        username: &str,
        db: &crate::database::Database,
    ) -> Result<Option<Admin>, sqlx::Error> {
        sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE username = $1")
            .bind(username)
            .fetch_optional(&db.pool)
            .await
    }

    pub fn verify_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}
