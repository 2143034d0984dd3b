use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use mongodb::Database;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::handlers;
use crate::middleware::{jwt_guard, recover, AuthSecret};

/// Assemble the application router.
///
/// The recover layer is installed last so it is outermost and catches panics
/// from everything below it, middleware included.
pub fn app(database: Database) -> Router {
    let secret = AuthSecret::new(config::config().security.jwt_secret.clone());

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/login", post(handlers::auth::login_post))
        // Protected API
        .merge(user_routes(secret))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(recover))
        .with_state(database)
}

fn user_routes(secret: AuthSecret) -> Router<Database> {
    use handlers::users;

    Router::new()
        .route("/api/users", get(users::user_list).post(users::user_post))
        .route(
            "/api/users/:id",
            get(users::user_get)
                .put(users::user_put)
                .delete(users::user_delete),
        )
        .layer(middleware::from_fn_with_state(secret, jwt_guard))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Manta API (Rust)",
            "version": version,
            "description": "Generic MongoDB repository adapter and JWT request guard built with Axum",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "login": "/auth/login (public - token acquisition)",
                "users": "/api/users[/:id] (protected)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(database): axum::extract::State<Database>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::ping(&database).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
