pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod middleware;
pub mod models;
pub mod redis_client;
pub mod services;

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub redis: redis_client::RedisClient,
    pub cache: cache::CacheService,
    pub config: config::Config,
}
