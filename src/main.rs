use std::time::Duration;

use manta_api_rust::{config, database, router};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up MONGODB_URI, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Manta API in {:?} mode", config.environment);

    let database = database::manager::connect(
        &config.database.name,
        &config.database.uri,
        Duration::from_secs(config.database.connect_timeout_secs),
    )
    .await
    .unwrap_or_else(|e| panic!("failed to connect to {}: {}", config.database.name, e));

    let app = router::app(database);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Manta API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
