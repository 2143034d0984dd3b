use std::time::Duration;

use mongodb::bson::doc;
use mongodb::{Client, Database};
use thiserror::Error;
use tracing::info;

/// Errors from connection establishment
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(#[source] mongodb::error::Error),

    #[error("database unreachable: {0}")]
    Unreachable(String),
}

/// Open a client for `uri` and verify liveness with a ping bounded by
/// `timeout` before handing back the database handle.
///
/// One-shot startup operation; pooling and reconnection stay inside the
/// driver.
pub async fn connect(
    db_name: &str,
    uri: &str,
    timeout: Duration,
) -> Result<Database, DatabaseError> {
    let client = Client::with_uri_str(uri)
        .await
        .map_err(DatabaseError::InvalidConnectionString)?;

    let database = client.database(db_name);

    tokio::time::timeout(timeout, ping(&database))
        .await
        .map_err(|_| DatabaseError::Unreachable(format!("no ping response within {:?}", timeout)))??;

    info!("Connected to database: {}", db_name);
    Ok(database)
}

/// Round-trip liveness check, also used by the health endpoint.
pub async fn ping(database: &Database) -> Result<(), DatabaseError> {
    database
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| DatabaseError::Unreachable(e.to_string()))?;
    Ok(())
}
