use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;

use crate::models::{Admin, User};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

/// An authenticated admin. Backed by the admins table, not users.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub admin_id: i64,
    pub username: String,
}

fn decode_basic_credentials(parts: &Parts) -> Result<(String, String), StatusCode> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let encoded = auth_header
        .strip_prefix("Basic ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let decoded = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let credentials = String::from_utf8(decoded).map_err(|_| StatusCode::UNAUTHORIZED)?;

    // username:password
    let mut split = credentials.splitn(2, ':');
    let username = split.next().ok_or(StatusCode::UNAUTHORIZED)?;
    let password = split.next().ok_or(StatusCode::UNAUTHORIZED)?;
    Ok((username.to_string(), password.to_string()))
}

// Basic Auth extractor for customers
impl FromRequestParts<Arc<crate::AppState>> for AuthUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let (username, password) = decode_basic_credentials(parts)?;

        let user = User::find_by_username(&username, &state.db)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        if !user.verify_password(&password) {
            return Err(StatusCode::UNAUTHORIZED);
        }

        Ok(AuthUser {
            user_id: user.id,
            username: user.username,
            email: user.email,
        })
    }
}

// Basic Auth extractor for admins
impl FromRequestParts<Arc<crate::AppState>> for AdminUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let (username, password) = decode_basic_credentials(parts)?;

        let admin = Admin::find_by_username(&username, &state.db)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        if !admin.verify_password(&password) {
            return Err(StatusCode::UNAUTHORIZED);
        }

        Ok(AdminUser {
            admin_id: admin.id,
            username: admin.username,
        })
    }
}
