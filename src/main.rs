use axum::{http::StatusCode, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod ident;
mod listing;
mod middleware;
mod ownership;
mod title;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = crate::config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting Scribe API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("SCRIBE_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Scribe API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected API
        .merge(api_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router {
    use axum::middleware::from_fn;
    use axum::routing::patch;
    use handlers::{blogs, categories, users};

    Router::new()
        .route(
            "/api/users",
            get(users::get)
                .post(users::post)
                .patch(users::patch)
                .delete(users::delete),
        )
        .route(
            "/api/categories",
            get(categories::get).post(categories::post),
        )
        .route(
            "/api/categories/:category",
            patch(categories::patch).delete(categories::delete),
        )
        .route("/api/blogs", get(blogs::get).post(blogs::post))
        .route(
            "/api/blogs/:blog",
            get(blogs::show).patch(blogs::patch).delete(blogs::delete),
        )
        // Auth gate runs first, then the blog request log
        .layer(from_fn(middleware::auth::require_auth))
        .layer(from_fn(middleware::log::log_blog_requests))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Scribe API",
        "version": version,
        "description": "Multi-tenant blogging backend built with Rust (Axum)",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "users": "/api/users (protected)",
            "categories": "/api/categories[/:category] (protected)",
            "blogs": "/api/blogs[/:blog] (protected)",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::Database::health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
