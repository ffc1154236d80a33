use anyhow::Context;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinema_booking::{
    cache, config::Config, controllers, database::Database, redis_client::RedisClient, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cinema Booking API");

    // Connect to the database
    let db = Database::new(&config.database.url, config.database.pool_size)
        .await
        .context("Failed to connect to database")?;
    info!("Database connected");

    // Run migrations
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;

    // Seed the default admin account if the table is empty
    ensure_default_admin(&db).await?;

    // Connect to Redis
    let redis = RedisClient::new(&config.redis.url)
        .await
        .context("Failed to connect to Redis")?;
    info!("Redis connected");

    // Initialize the cache
    let cache = cache::CacheService::new(redis.clone(), db.clone(), config.redis.seats_cache_ttl);
    cache.warmup_cache().await;

    // Create the shared application state
    let app_state = Arc::new(AppState {
        db,
        redis,
        cache,
        config: config.clone(),
    });

    // Create the main router
    let app = Router::new()
        .route("/", get(|| async { "Cinema Booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        // Mount the routes from the controllers module
        .nest("/api", controllers::routes())
        // Pass the application state to the router
        .with_state(app_state.clone())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.app.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind listener")?;
    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}

async fn ensure_default_admin(db: &Database) -> anyhow::Result<()> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM admins)")
        .fetch_one(&db.pool)
        .await
        .context("Failed to check admins table")?;
    if exists {
        return Ok(());
    }

    let password_hash =
        bcrypt::hash("admin123", bcrypt::DEFAULT_COST).context("Failed to hash admin password")?;
    sqlx::query("INSERT INTO admins (username, password_hash) VALUES ($1, $2)")
        .bind("admin")
        .bind(&password_hash)
        .execute(&db.pool)
        .await
        .context("Failed to seed default admin")?;

    info!("Seeded default admin account");
    Ok(())
}
