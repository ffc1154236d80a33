pub mod admin;
pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod recommendations;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(auth::routes())
        .merge(catalog::routes())
        .merge(bookings::routes())
        .merge(recommendations::routes())
        .merge(admin::routes())
}
