use anyhow::Result;
use chrono::Utc;
use mongodb::bson::{doc, Document};
use mongodb::{Client, Database};

use manta_api_rust::database::models::User;
use manta_api_rust::database::{MongoRepository, Repository, RepositoryError};

/// Client construction is lazy; no server is contacted until an operation
/// actually runs. Good enough for the no-database-call assertions below.
async fn lazy_database() -> Result<Database> {
    let client = Client::with_uri_str(
        "mongodb://127.0.0.1:27017/?serverSelectionTimeoutMS=200&connectTimeoutMS=200",
    )
    .await?;
    Ok(client.database("manta_test"))
}

/// Live database for the ignored round-trip tests.
async fn live_database() -> Result<Database> {
    let uri = std::env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://127.0.0.1:27017".to_string());
    let client = Client::with_uri_str(&uri).await?;
    Ok(client.database("manta_test"))
}

fn sample_user(name: &str) -> User {
    User {
        id: None,
        name: name.to_string(),
        email: format!("{}@example.com", name),
        created_at: Utc::now(),
    }
}

async fn scratch_repo(database: &Database, collection: &str) -> Result<MongoRepository<User>> {
    database
        .collection::<Document>(collection)
        .drop()
        .await
        .ok();
    Ok(MongoRepository::new(database, collection))
}

#[tokio::test]
async fn malformed_ids_fail_without_a_database_call() -> Result<()> {
    let database = lazy_database().await?;
    let repo: MongoRepository<User> = MongoRepository::new(&database, "users");

    let err = repo.get_by_id("invalid-id").await.unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidId(_)), "{:?}", err);

    let err = repo
        .update("invalid-id", &sample_user("alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidId(_)), "{:?}", err);

    let err = repo.delete("invalid-id").await.unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidId(_)), "{:?}", err);

    Ok(())
}

// The tests below need a running MongoDB instance; point MONGODB_URI at one
// and run with `cargo test -- --ignored`.

#[tokio::test]
#[ignore]
async fn created_entities_round_trip_by_id() -> Result<()> {
    let database = live_database().await?;
    let repo = scratch_repo(&database, "users_roundtrip").await?;

    let user = sample_user("alice");
    let id = repo.create(&user).await?;
    assert_eq!(id.len(), 24, "expected a hex ObjectId, got {}", id);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));

    let fetched = repo.get_by_id(&id).await?;
    assert_eq!(fetched.name, user.name);
    assert_eq!(fetched.email, user.email);
    assert_eq!(fetched.created_at, user.created_at);
    assert_eq!(fetched.id.map(|oid| oid.to_hex()), Some(id));

    Ok(())
}

#[tokio::test]
#[ignore]
async fn get_honors_filter_and_pagination_window() -> Result<()> {
    let database = live_database().await?;
    let repo = scratch_repo(&database, "users_pagination").await?;

    for name in ["alice", "bob", "carol"] {
        repo.create(&sample_user(name)).await?;
    }

    let all = repo.get(Document::new(), None, None).await?;
    assert_eq!(all.len(), 3);

    let window = repo.get(Document::new(), Some(1), Some(1)).await?;
    assert_eq!(window.len(), 1);

    let filtered = repo.get(doc! { "name": "bob" }, None, None).await?;
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name, "bob");

    assert_eq!(repo.count(Document::new()).await?, 3);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn update_of_unchanged_entity_is_success_not_not_found() -> Result<()> {
    let database = live_database().await?;
    let repo = scratch_repo(&database, "users_unchanged").await?;

    let user = sample_user("alice");
    let id = repo.create(&user).await?;

    // Matched one document, modified zero fields: still a success
    repo.update(&id, &user).await?;

    let mut renamed = user.clone();
    renamed.name = "alice2".to_string();
    repo.update(&id, &renamed).await?;
    assert_eq!(repo.get_by_id(&id).await?.name, "alice2");

    Ok(())
}

#[tokio::test]
#[ignore]
async fn absent_ids_report_not_found() -> Result<()> {
    let database = live_database().await?;
    let repo = scratch_repo(&database, "users_absent").await?;

    let id = mongodb::bson::oid::ObjectId::new().to_hex();

    let err = repo.get_by_id(&id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound), "{:?}", err);

    let err = repo.update(&id, &sample_user("alice")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound), "{:?}", err);

    let err = repo.delete(&id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound), "{:?}", err);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn delete_is_not_idempotent() -> Result<()> {
    let database = live_database().await?;
    let repo = scratch_repo(&database, "users_delete").await?;

    let id = repo.create(&sample_user("alice")).await?;
    repo.delete(&id).await?;

    let err = repo.delete(&id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound), "{:?}", err);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn mismatched_document_shape_surfaces_as_decode_error() -> Result<()> {
    let database = live_database().await?;
    let repo = scratch_repo(&database, "users_decode").await?;

    database
        .collection::<Document>("users_decode")
        .insert_one(doc! { "name": 42, "email": false })
        .await?;

    let err = repo.get(Document::new(), None, None).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Decode(_)), "{:?}", err);

    Ok(())
}
